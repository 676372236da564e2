//! Evolution engine for gridracer
//!
//! This crate ties tracks and cars together:
//! - `Population`: per-tick driving, multi-position scoring, elitist breeding
//! - `SimulationSnapshot`: what a renderer gets each tick
//! - `DriveCommand`: steering mapped onto a physical car's command set
//!
//! Everything here is single-threaded and deterministic for a given seed.
//! No file I/O happens in this crate.

pub mod command;
pub mod error;
pub mod population;
pub mod snapshot;

pub use command::{parse_sensor_line, CommandError, DriveCommand, HARDWARE_THRESHOLD, SIMULATION_THRESHOLD};
pub use error::{EvolutionError, InvalidPopulationConfig};
pub use population::{GenerationSummary, Population, PopulationConfig, Record, TickOutcome};
pub use snapshot::{CarSnapshot, SimulationSnapshot};

// Re-export the lower layers for convenience
pub use gridracer_car as car;
pub use gridracer_track as track;
