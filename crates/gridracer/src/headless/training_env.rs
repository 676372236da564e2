//! Training environment for car evolution
//!
//! Drives a population tick by tick until the requested number of
//! generations has completed, checkpointing along the way.

use anyhow::{Context, Result};
use gridracer_core::car::MlpPolicy;
use gridracer_core::track::Track;
use gridracer_core::{GenerationSummary, Population, TickOutcome};
use indicatif::{ProgressBar, ProgressStyle};

use super::persistence::{RunMetadata, RunStore};
use crate::config::AppConfig;

/// Ticks between progress bar message refreshes
const STATUS_INTERVAL: u64 = 500;

/// Statistics from a training run
#[derive(Debug, Clone)]
pub struct TrainingStats {
    /// Generations completed
    pub generation: usize,
    /// Best fitness of the last generation
    pub best_fitness: f32,
    /// Average fitness of the last generation
    pub avg_fitness: f32,
    /// Ticks simulated during this run
    pub ticks: u64,
    /// Checkpoints written during this run
    pub checkpoints: usize,
}

/// Main training environment
pub struct TrainingEnv {
    /// Training configuration
    pub config: AppConfig,
    population: Population<MlpPolicy>,
    store: RunStore,
    /// Per-generation summaries of this run
    pub stats_history: Vec<GenerationSummary>,
    ticks: u64,
    checkpoints: usize,
}

impl TrainingEnv {
    pub fn new(config: AppConfig, track: Track) -> Result<Self> {
        let prototype = MlpPolicy::new(config.evolution.profile.ray_count(), &config.network.hidden);
        let population = Population::new(config.evolution.clone(), track, prototype)
            .context("Failed to create population")?;
        let store = RunStore::create(config.training.output_dir.clone())?;
        store.save_track(population.track())?;

        Ok(Self {
            config,
            population,
            store,
            stats_history: Vec::new(),
            ticks: 0,
            checkpoints: 0,
        })
    }

    pub fn population(&self) -> &Population<MlpPolicy> {
        &self.population
    }

    pub fn store(&self) -> &RunStore {
        &self.store
    }

    /// Create a progress bar style
    fn progress_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} gen ({eta}) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-")
    }

    /// Run the full training loop
    pub fn run(&mut self) -> Result<TrainingStats> {
        let generations = self.config.training.generations;
        let pb = if self.config.training.show_progress {
            let pb = ProgressBar::new(generations as u64);
            pb.set_style(Self::progress_style());
            pb.enable_steady_tick(std::time::Duration::from_millis(100));
            pb
        } else {
            ProgressBar::hidden()
        };

        log::info!(
            "Starting training: {} generations, {} cars, {} test positions",
            generations,
            self.config.evolution.size,
            self.config.evolution.test_positions
        );

        let mut completed = 0;
        while completed < generations {
            let outcome = self.population.step_tick().context("Simulation tick failed")?;
            self.ticks += 1;

            match outcome {
                TickOutcome::Running => {
                    if self.ticks % STATUS_INTERVAL == 0 {
                        pb.set_message(format!(
                            "alive {}/{}, position {}",
                            self.population.alive_count(),
                            self.config.evolution.size,
                            self.population.test_position_index() + 1
                        ));
                    }
                }
                TickOutcome::TestPositionAdvanced { index } => {
                    log::debug!("Test position {} of generation {}", index + 1, self.population.generation());
                }
                TickOutcome::GenerationCompleted(summary) => {
                    completed += 1;
                    pb.inc(1);
                    log::info!(
                        "Gen {:4} | best {:8.2} | avg {:8.2} | alive {}",
                        summary.generation,
                        summary.best_fitness,
                        summary.average_fitness,
                        self.population.alive_count()
                    );
                    self.stats_history.push(summary);

                    if summary.checkpoint_due {
                        self.save_checkpoint(&pb)?;
                    }
                }
            }
        }

        // Final save unless the last generation was just checkpointed
        if self.stats_history.last().is_some_and(|summary| !summary.checkpoint_due) {
            self.save_checkpoint(&pb)?;
        }

        pb.finish_with_message("Training complete!");
        Ok(self.stats())
    }

    pub fn stats(&self) -> TrainingStats {
        let last = self.stats_history.last();
        TrainingStats {
            generation: self.population.generation(),
            best_fitness: last.map_or(0.0, |summary| summary.best_fitness),
            avg_fitness: last.map_or(0.0, |summary| summary.average_fitness),
            ticks: self.ticks,
            checkpoints: self.checkpoints,
        }
    }

    /// Save the elite, the fitness history and run metadata
    fn save_checkpoint(&mut self, pb: &ProgressBar) -> Result<()> {
        let generation = self.population.generation();
        let Some(elite) = self.population.elite_policy() else {
            log::warn!("No completed generation yet, skipping checkpoint");
            return Ok(());
        };

        let path = self.store.save_policy(generation, elite)?;
        self.store.write_stats(self.population.history())?;
        self.store.write_metadata(&RunMetadata {
            generation,
            best_fitness: self.population.history().last().copied(),
            population_size: self.config.evolution.size,
            seed: self.config.evolution.seed,
            track: self.config.track.path.clone(),
            saved_at: chrono::Local::now().to_rfc3339(),
        })?;
        self.checkpoints += 1;

        pb.println(format!("Saved checkpoint at generation {} to {}", generation, path.display()));
        Ok(())
    }
}
