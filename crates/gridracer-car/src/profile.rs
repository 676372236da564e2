//! Car configuration profiles
//!
//! Two car variants are in use: a 3-ray rally car that never stops and is
//! only ended by walls or the distance cap, and a 5-ray car that turns in
//! place and is additionally ended when stuck or after enough laps. Both
//! are plain values of [`CarProfile`] chosen at construction time.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sensors::SensorRig;

/// Physical footprint used for collision checks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodySize {
    /// Extent along the heading
    pub length: f32,
    /// Extent across the heading
    pub width: f32,
}

impl Default for BodySize {
    fn default() -> Self {
        Self {
            length: 30.0,
            width: 20.0,
        }
    }
}

/// What a turning tick does to forward motion
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum SteeringMode {
    /// Turning stops the car for that tick; driving straight restores speed
    #[default]
    TurnInPlace,
    /// Speed never changes; every turning tick accrues `turn_penalty`
    RallyDriving { turn_penalty: f32 },
}

/// Termination rules checked every tick after collision.
///
/// `None` disables a rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LifecycleRules {
    /// Dies after more than this many consecutive zero-speed ticks
    pub stuck_limit: Option<u32>,
    /// Course counts as completed once total distance exceeds this
    pub distance_cap: Option<f32>,
    /// Dies once the lap count exceeds this
    pub lap_cap: Option<u32>,
}

impl Default for LifecycleRules {
    fn default() -> Self {
        Self {
            stuck_limit: Some(60),
            distance_cap: Some(4000.0),
            lap_cap: Some(2),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProfileError {
    #[error("sensor rig has no rays")]
    NoSensors,
    #[error("ray step size must be positive, got {0}")]
    NonPositiveStep(f32),
    #[error("ray length must be positive, got {0}")]
    NonPositiveRange(f32),
    #[error("body size must be positive, got {length}x{width}")]
    InvalidBody { length: f32, width: f32 },
}

/// Complete per-car configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarProfile {
    pub body: BodySize,
    /// Forward distance per tick while driving
    pub speed: f32,
    /// Degrees turned per turning tick
    pub rotation_speed: f32,
    pub steering: SteeringMode,
    pub sensors: SensorRig,
    pub lifecycle: LifecycleRules,
}

impl Default for CarProfile {
    fn default() -> Self {
        Self::five_ray()
    }
}

impl CarProfile {
    /// Three forward rays, rally steering, ended only by walls or distance
    pub fn three_ray() -> Self {
        Self {
            body: BodySize::default(),
            speed: 1.0,
            rotation_speed: 2.0,
            steering: SteeringMode::RallyDriving { turn_penalty: 0.25 },
            sensors: SensorRig::three_ray(),
            lifecycle: LifecycleRules {
                stuck_limit: None,
                distance_cap: Some(4000.0),
                lap_cap: None,
            },
        }
    }

    /// Five rays, turn-in-place steering, stuck and lap rules enabled
    pub fn five_ray() -> Self {
        Self {
            body: BodySize::default(),
            speed: 1.0,
            rotation_speed: 2.0,
            steering: SteeringMode::TurnInPlace,
            sensors: SensorRig::five_ray(),
            lifecycle: LifecycleRules::default(),
        }
    }

    /// Number of sensor readings a policy receives
    pub fn ray_count(&self) -> usize {
        self.sensors.angles.len()
    }

    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.sensors.angles.is_empty() {
            return Err(ProfileError::NoSensors);
        }
        if self.sensors.step_size <= 0.0 {
            return Err(ProfileError::NonPositiveStep(self.sensors.step_size));
        }
        if self.sensors.max_length <= 0.0 {
            return Err(ProfileError::NonPositiveRange(self.sensors.max_length));
        }
        if self.body.length <= 0.0 || self.body.width <= 0.0 {
            return Err(ProfileError::InvalidBody {
                length: self.body.length,
                width: self.body.width,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles_are_valid() {
        assert!(CarProfile::three_ray().validate().is_ok());
        assert!(CarProfile::five_ray().validate().is_ok());
    }

    #[test]
    fn test_three_ray_profile() {
        let profile = CarProfile::three_ray();
        assert_eq!(profile.ray_count(), 3);
        assert_eq!(profile.lifecycle.stuck_limit, None);
        assert_eq!(profile.lifecycle.lap_cap, None);
        assert!(matches!(profile.steering, SteeringMode::RallyDriving { .. }));
    }

    #[test]
    fn test_five_ray_profile() {
        let profile = CarProfile::five_ray();
        assert_eq!(profile.ray_count(), 5);
        assert_eq!(profile.lifecycle.stuck_limit, Some(60));
        assert_eq!(profile.lifecycle.distance_cap, Some(4000.0));
        assert_eq!(profile.lifecycle.lap_cap, Some(2));
        assert_eq!(profile.steering, SteeringMode::TurnInPlace);
        assert_eq!(profile.steering, SteeringMode::default());
        assert_eq!(CarProfile::default(), profile);
    }

    #[test]
    fn test_validate_rejects_bad_sensors() {
        let mut profile = CarProfile::five_ray();
        profile.sensors.step_size = 0.0;
        assert_eq!(profile.validate(), Err(ProfileError::NonPositiveStep(0.0)));

        let mut profile = CarProfile::five_ray();
        profile.sensors.angles.clear();
        assert_eq!(profile.validate(), Err(ProfileError::NoSensors));
    }
}
