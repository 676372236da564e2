//! Distance sensors
//!
//! Rays are marched from the car center in fixed steps and stop the first
//! time the tip lands in a wall or off the grid. This is a discrete
//! approximation of the true wall distance; the step size trades accuracy
//! for cost.

use glam::Vec2;
use gridracer_track::Track;
use serde::{Deserialize, Serialize};

/// Sensor layout: ray angles relative to the heading plus march parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorRig {
    /// Degrees relative to the heading, in reading order
    pub angles: Vec<f32>,
    /// March step in world units
    pub step_size: f32,
    /// Readings are normalized by this length
    pub max_length: f32,
}

impl Default for SensorRig {
    fn default() -> Self {
        Self::five_ray()
    }
}

impl SensorRig {
    pub fn three_ray() -> Self {
        Self {
            angles: vec![-45.0, 0.0, 45.0],
            step_size: 5.0,
            max_length: 200.0,
        }
    }

    pub fn five_ray() -> Self {
        Self {
            angles: vec![-90.0, -45.0, 0.0, 45.0, 90.0],
            step_size: 5.0,
            max_length: 200.0,
        }
    }

    /// Cast every ray from `origin` for a car facing `heading` degrees.
    ///
    /// Writes one normalized reading per ray into `out`.
    pub fn cast_into(&self, track: &Track, origin: Vec2, heading: f32, out: &mut Vec<f32>) {
        out.clear();
        out.extend(
            self.angles
                .iter()
                .map(|relative| self.march(track, origin, heading + relative)),
        );
    }

    pub fn cast(&self, track: &Track, origin: Vec2, heading: f32) -> Vec<f32> {
        let mut readings = Vec::with_capacity(self.angles.len());
        self.cast_into(track, origin, heading, &mut readings);
        readings
    }

    /// March a single ray at an absolute angle, returning travelled / max_length
    pub fn march(&self, track: &Track, origin: Vec2, angle_degrees: f32) -> f32 {
        if self.step_size <= 0.0 || self.max_length <= 0.0 {
            return 0.0;
        }

        let step = ray_direction(angle_degrees) * self.step_size;
        let mut tip = origin;
        let mut travelled = 0.0;

        while travelled < self.max_length {
            tip += step;
            travelled += self.step_size;
            if track.is_wall_at(tip) {
                break;
            }
        }

        (travelled / self.max_length).min(1.0)
    }
}

/// Unit vector for an angle in degrees, y pointing down the screen
pub fn ray_direction(angle_degrees: f32) -> Vec2 {
    let radians = angle_degrees.to_radians();
    Vec2::new(radians.cos(), -radians.sin())
}
