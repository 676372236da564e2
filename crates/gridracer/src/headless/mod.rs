//! Headless training and replay
//!
//! This module provides the offline side of the trainer:
//! - The tick-driven training loop with progress reporting
//! - Model, fitness history and run metadata persistence
//! - Replay of a saved model on a track

mod persistence;
mod replay;
mod training_env;

pub use persistence::{format_stats, load_metadata, load_policy, parse_stats, RunMetadata, RunStore};
pub use replay::{replay, ReplayRun, ReplaySettings};
pub use training_env::{TrainingEnv, TrainingStats};
