//! Error types for population setup and the tick loop

use gridracer_car::{PolicyError, ProfileError};
use gridracer_track::NoValidSpawnError;
use thiserror::Error;

/// Rejected population configuration, raised before anything is spawned
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidPopulationConfig {
    #[error("population size must be at least 1")]
    ZeroPopulation,
    #[error("at least one test position is required")]
    ZeroTestPositions,
    #[error("invalid car profile: {0}")]
    Profile(#[from] ProfileError),
    #[error("policy expects {expected} observations but the profile has {rays} rays")]
    ObservationMismatch { expected: usize, rays: usize },
}

/// Failures while building or advancing a population
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvolutionError {
    #[error(transparent)]
    Config(#[from] InvalidPopulationConfig),
    #[error(transparent)]
    Spawn(#[from] NoValidSpawnError),
    #[error("policy of car {index} failed: {source}")]
    Policy {
        index: usize,
        #[source]
        source: PolicyError,
    },
}
