//! Cars for gridracer
//!
//! This crate implements:
//! - Car kinematics with explicit steering modes (turn-in-place, rally)
//! - Ray-marching distance sensors against the track grid
//! - The car lifecycle (collision, stuck, course completion, lap limit)
//! - The `Policy` contract and a small evolvable neural policy

pub mod car;
pub mod neural;
pub mod policy;
pub mod profile;
pub mod sensors;

// Re-export main types for convenience
pub use car::{Car, CarState, DeathCause, Turn};
pub use neural::MlpPolicy;
pub use policy::{Policy, PolicyError};
pub use profile::{BodySize, CarProfile, LifecycleRules, ProfileError, SteeringMode};
pub use sensors::SensorRig;

/// Car color as RGB
pub type Color = [u8; 3];

/// Color of the elite car carried over from the previous generation
pub const ELITE_COLOR: Color = [0, 0, 255];

/// Color of every other car
pub const DEFAULT_COLOR: Color = [255, 0, 0];
