use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use gridracer::config::AppConfig;
use gridracer::headless::{load_policy, replay, ReplaySettings, TrainingEnv};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (default: gridracer.ron if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Track layout JSON file
    #[arg(long)]
    track: Option<PathBuf>,

    /// Number of generations to train
    #[arg(long)]
    generations: Option<usize>,

    /// Population size per generation
    #[arg(long)]
    population: Option<usize>,

    /// Output directory for models and stats
    #[arg(long)]
    output: Option<PathBuf>,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Use the three-ray rally car instead of the five-ray car
    #[arg(long)]
    three_ray: bool,

    /// Replay a saved model instead of training
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Ticks to drive when replaying
    #[arg(long)]
    ticks: Option<u64>,

    /// Hide the progress bar
    #[arg(long)]
    quiet: bool,
}

impl Args {
    /// Apply command-line overrides on top of the loaded configuration
    fn apply(&self, config: &mut AppConfig) {
        if let Some(track) = &self.track {
            config.track.path = track.clone();
        }
        if let Some(generations) = self.generations {
            config.training.generations = generations;
        }
        if let Some(population) = self.population {
            config.evolution.size = population;
        }
        if let Some(output) = &self.output {
            config.training.output_dir = output.clone();
        }
        if let Some(seed) = self.seed {
            config.evolution.seed = seed;
        }
        if self.three_ray {
            config.evolution.profile = gridracer::car::CarProfile::three_ray();
        }
        if let Some(ticks) = self.ticks {
            config.replay.ticks = ticks;
        }
        if self.quiet {
            config.training.show_progress = false;
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    args.apply(&mut config);

    let track = gridracer::load_track(&config.track)?;

    if let Some(model) = &args.replay {
        return run_replay(&config, &track, model);
    }

    log::info!("Starting headless evolution training");
    log::info!("  Track: {}", config.track.path.display());
    log::info!("  Generations: {}", config.training.generations);
    log::info!("  Population: {}", config.evolution.size);
    log::info!("  Output: {}", config.training.output_dir.display());

    let mut env = TrainingEnv::new(config, track)?;
    let stats = env.run()?;
    log::info!(
        "Finished after {} generations ({} ticks), best {:.2}",
        stats.generation,
        stats.ticks,
        stats.best_fitness
    );
    Ok(())
}

fn run_replay(config: &AppConfig, track: &gridracer::track::Track, model: &Path) -> anyhow::Result<()> {
    let mut policy = load_policy(model)?;
    let settings = ReplaySettings {
        profile: config.evolution.profile.clone(),
        sensitivity: config.evolution.sensitivity,
        ticks: config.replay.ticks,
        seed: config.evolution.seed,
        spawn_attempts: config.evolution.spawn_attempts,
    };

    log::info!("Replaying {} for {} ticks", model.display(), settings.ticks);
    let runs = replay(track, &mut policy, &settings).context("Replay failed")?;

    let best = runs.iter().map(|run| run.distance).fold(0.0_f32, f32::max);
    log::info!("{} runs, longest {:.0} units", runs.len(), best);
    Ok(())
}
