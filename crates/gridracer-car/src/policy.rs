//! Steering policy contract
//!
//! A policy maps sensor readings to one steering value in [-1, 1]. The
//! population only ever asks a policy to think, to produce a mutated child,
//! or to produce a freshly initialized sibling of the same shape, so any
//! implementation works, including fixed test stubs.

use rand::Rng;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolicyError {
    #[error("observation has {actual} values, policy expects {expected}")]
    ObservationSize { expected: usize, actual: usize },
    #[error("policy backend failed: {0}")]
    Backend(String),
}

pub trait Policy: Clone {
    /// Steering for one observation, in [-1, 1]
    fn think(&mut self, observation: &[f32]) -> Result<f32, PolicyError>;

    /// Child of `self` with every parameter perturbed at `rate`
    fn mutate<R: Rng + ?Sized>(&self, rate: f32, rng: &mut R) -> Result<Self, PolicyError>;

    /// Fresh random parameters, same shape as `self`
    fn randomize<R: Rng + ?Sized>(&self, rng: &mut R) -> Self;

    /// Observation length this policy accepts, if it is fixed
    fn observation_size(&self) -> Option<usize> {
        None
    }
}
