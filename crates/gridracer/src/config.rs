//! Trainer configuration with layered loading
//!
//! Configuration is loaded from multiple sources (lowest to highest priority):
//! 1. Compiled defaults
//! 2. `gridracer.ron` file (if exists)
//! 3. Environment variables prefixed with `GRIDRACER_`
//!
//! Example environment variable: `GRIDRACER_EVOLUTION__SIZE=100`

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use gridracer_core::track::TrackGeometry;
use gridracer_core::PopulationConfig;
use serde::{Deserialize, Serialize};

/// Main trainer configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub track: TrackConfig,

    #[serde(default)]
    pub evolution: PopulationConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub training: TrainingConfig,

    #[serde(default)]
    pub replay: ReplayConfig,
}

/// Which track to drive on and how big its cells are
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    /// JSON layout file
    pub path: PathBuf,
    pub geometry: TrackGeometry,
    /// Scale cells to fill this `[width, height]` instead of using `geometry`
    pub viewport: Option<[u32; 2]>,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("assets/tracks/loop.json"),
            geometry: TrackGeometry::default(),
            viewport: None,
        }
    }
}

/// Steering network shape
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Hidden layer widths
    pub hidden: Vec<usize>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self { hidden: vec![5] }
    }
}

/// Headless training run settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Generations to run before stopping
    pub generations: usize,
    /// Directory for models, stats and run metadata
    pub output_dir: PathBuf,
    /// Draw a progress bar on stderr
    pub show_progress: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            generations: 1000,
            output_dir: PathBuf::from("training_output"),
            show_progress: true,
        }
    }
}

/// Replay of a saved model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// Total ticks to drive, across respawns
    pub ticks: u64,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self { ticks: 10_000 }
    }
}

impl AppConfig {
    /// Load configuration with layered priority:
    /// 1. Compiled defaults (lowest priority)
    /// 2. `gridracer.ron` file (if exists)
    /// 3. Environment variables prefixed with `GRIDRACER_` (highest priority)
    pub fn load() -> Result<Self> {
        Self::load_layers(
            File::with_name("gridracer")
                .format(config::FileFormat::Ron)
                .required(false),
        )
    }

    /// Same layering, but with an explicit config file that must exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!("Config file {} does not exist", path.display());
        }
        Self::load_layers(File::from(path).required(true))
    }

    fn load_layers<S>(file: S) -> Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let builder = Config::builder()
            // Layer 1: Compiled defaults
            .set_default("track.path", "assets/tracks/loop.json")?
            .set_default("evolution.size", 50_i64)?
            .set_default("evolution.test_positions", 3_i64)?
            .set_default("evolution.mutation_rate", 0.01)?
            .set_default("evolution.sensitivity", 0.35)?
            .set_default("evolution.checkpoint_interval", 100_i64)?
            .set_default("evolution.seed", 42_i64)?
            .set_default("training.generations", 1000_i64)?
            .set_default("training.output_dir", "training_output")?
            .set_default("training.show_progress", true)?
            .set_default("replay.ticks", 10_000_i64)?
            // Layer 2: Config file
            .add_source(file)
            // Layer 3: Environment variables (GRIDRACER_EVOLUTION__SIZE, etc.)
            .add_source(
                Environment::with_prefix("GRIDRACER")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.track.path, PathBuf::from("assets/tracks/loop.json"));
        assert_eq!(config.evolution.size, 50);
        assert_eq!(config.evolution.test_positions, 3);
        assert_eq!(config.network.hidden, vec![5]);
        assert_eq!(config.training.generations, 1000);
        assert!(config.track.viewport.is_none());
    }

    #[test]
    fn test_load_config_with_defaults() {
        // Should load defaults when no config file exists
        let config = AppConfig::load().expect("Failed to load config");
        assert_eq!(config.evolution.mutation_rate, 0.01);
        assert_eq!(config.evolution.profile.ray_count(), 5);
        assert_eq!(config.track.geometry, TrackGeometry::default());
    }

    #[test]
    fn test_load_from_ron_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.ron");
        std::fs::write(
            &path,
            r#"(
                evolution: (size: 12, test_positions: 1, seed: 9),
                network: (hidden: [8, 4]),
                training: (generations: 7, show_progress: false),
            )"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.evolution.size, 12);
        assert_eq!(config.evolution.test_positions, 1);
        assert_eq!(config.evolution.seed, 9);
        // Untouched keys keep their defaults
        assert_eq!(config.evolution.mutation_rate, 0.01);
        assert_eq!(config.network.hidden, vec![8, 4]);
        assert_eq!(config.training.generations, 7);
        assert!(!config.training.show_progress);
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(AppConfig::load_from(&dir.path().join("missing.ron")).is_err());
    }

    #[test]
    fn test_environment_overrides() {
        // Keys no other test asserts on, since tests share the process environment
        std::env::set_var("GRIDRACER_REPLAY__TICKS", "1234");
        std::env::set_var("GRIDRACER_EVOLUTION__CHECKPOINT_INTERVAL", "25");
        let config = AppConfig::load();
        std::env::remove_var("GRIDRACER_REPLAY__TICKS");
        std::env::remove_var("GRIDRACER_EVOLUTION__CHECKPOINT_INTERVAL");

        let config = config.unwrap();
        assert_eq!(config.replay.ticks, 1234);
        assert_eq!(config.evolution.checkpoint_interval, 25);
    }
}
