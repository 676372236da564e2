//! Read-only render view of a simulation tick

use glam::Vec2;
use gridracer_car::{sensors::ray_direction, Car, Color};
use gridracer_track::{Track, TrackGeometry, TrackLayout};
use serde::{Deserialize, Serialize};

/// One live car as a renderer needs it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarSnapshot {
    pub position: Vec2,
    /// Heading in degrees
    pub angle: f32,
    pub color: Color,
    pub corners: [Vec2; 4],
    /// Normalized readings, one per ray
    pub rays: Vec<f32>,
    /// Absolute ray angles in degrees, same order as `rays`
    pub ray_angles: Vec<f32>,
    /// World-space tips of the rays
    pub ray_endpoints: Vec<Vec2>,
}

impl CarSnapshot {
    pub fn from_car(car: &Car) -> Self {
        let sensors = &car.profile().sensors;
        let ray_angles: Vec<f32> = sensors
            .angles
            .iter()
            .map(|relative| car.angle() + relative)
            .collect();
        let ray_endpoints = ray_angles
            .iter()
            .zip(car.ray_lengths())
            .map(|(&angle, &reading)| car.position() + ray_direction(angle) * reading * sensors.max_length)
            .collect();

        Self {
            position: car.position(),
            angle: car.angle(),
            color: car.color(),
            corners: car.corners(),
            rays: car.ray_lengths().to_vec(),
            ray_angles,
            ray_endpoints,
        }
    }
}

/// Track plus live cars, produced by value every tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSnapshot {
    pub generation: usize,
    pub test_position: usize,
    /// Grid and start cell
    pub track: TrackLayout,
    pub geometry: TrackGeometry,
    pub cars: Vec<CarSnapshot>,
}

impl SimulationSnapshot {
    /// Capture the track and every car in `cars` that is still alive
    pub fn capture<'a>(
        track: &Track,
        cars: impl IntoIterator<Item = &'a Car>,
        generation: usize,
        test_position: usize,
    ) -> Self {
        Self {
            generation,
            test_position,
            track: track.to_layout(),
            geometry: *track.geometry(),
            cars: cars
                .into_iter()
                .filter(|car| car.is_alive())
                .map(CarSnapshot::from_car)
                .collect(),
        }
    }

    /// World-space size of the whole grid
    pub fn extent(&self) -> Vec2 {
        let rows = self.track.layout.len();
        let cols = self.track.layout.first().map_or(0, Vec::len);
        self.geometry.extent(rows, cols)
    }
}
