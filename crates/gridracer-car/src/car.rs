//! Car body, kinematics and lifecycle
//!
//! A car is Alive until one of its termination rules fires, then Dead for
//! good: its pose and sensor readings stay frozen until it is respawned or
//! repositioned from outside.

use glam::Vec2;
use gridracer_track::{Spawn, Track};
use serde::{Deserialize, Serialize};

use crate::profile::{CarProfile, SteeringMode};
use crate::{Color, DEFAULT_COLOR};

/// Why a car stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeathCause {
    /// A bounding-box corner entered a wall or left the grid
    Collision,
    /// Stood still for too many consecutive ticks
    Stuck,
    /// Drove past the distance cap; a success, not a failure
    CourseCompleted,
    /// Exceeded the lap cap
    LapLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CarState {
    Alive,
    Dead(DeathCause),
}

/// Steering decision taken by [`Car::control`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    /// Towards increasing angle (counter-clockwise on screen)
    Left,
    /// Towards decreasing angle
    Right,
    Straight,
}

/// Simulated car
#[derive(Debug, Clone)]
pub struct Car {
    position: Vec2,
    /// Degrees in [0, 360), 0 = +x, counter-clockwise on screen
    angle: f32,
    speed: f32,
    ray_lengths: Vec<f32>,
    state: CarState,

    distance_traveled: f32,
    turn_penalty: f32,
    stuck_frames: u32,
    frames_alive: u32,
    half_laps: u32,
    last_col: Option<i64>,

    color: Color,
    profile: CarProfile,
}

impl Car {
    /// Place a new car on a spawn cell and take a first sensor reading
    pub fn spawn(track: &Track, spawn: Spawn, profile: CarProfile) -> Self {
        let mut car = Self {
            position: Vec2::ZERO,
            angle: 0.0,
            speed: profile.speed,
            ray_lengths: Vec::with_capacity(profile.ray_count()),
            state: CarState::Alive,
            distance_traveled: 0.0,
            turn_penalty: 0.0,
            stuck_frames: 0,
            frames_alive: 0,
            half_laps: 0,
            last_col: None,
            color: DEFAULT_COLOR,
            profile,
        };
        car.place(track, spawn);
        car
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Fresh start at a new pose: every accumulator is cleared
    pub fn respawn(&mut self, track: &Track, spawn: Spawn) {
        self.distance_traveled = 0.0;
        self.turn_penalty = 0.0;
        self.frames_alive = 0;
        self.place(track, spawn);
    }

    /// Move to the next test position of the same evaluation.
    ///
    /// Distance and turn penalty keep accumulating across positions.
    pub fn reposition(&mut self, track: &Track, spawn: Spawn) {
        self.place(track, spawn);
    }

    fn place(&mut self, track: &Track, spawn: Spawn) {
        self.position = track.grid_to_world(spawn.row, spawn.col);
        self.angle = spawn.heading.degrees();
        self.speed = self.profile.speed;
        self.state = CarState::Alive;
        self.stuck_frames = 0;
        self.half_laps = 0;
        self.last_col = None;
        self.sense(track);
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Latest normalized sensor readings, one per ray
    pub fn ray_lengths(&self) -> &[f32] {
        &self.ray_lengths
    }

    pub fn state(&self) -> CarState {
        self.state
    }

    pub fn is_alive(&self) -> bool {
        self.state == CarState::Alive
    }

    pub fn death_cause(&self) -> Option<DeathCause> {
        match self.state {
            CarState::Alive => None,
            CarState::Dead(cause) => Some(cause),
        }
    }

    pub fn distance_traveled(&self) -> f32 {
        self.distance_traveled
    }

    /// Accumulated rally turning penalty
    pub fn turn_penalty(&self) -> f32 {
        self.turn_penalty
    }

    pub fn stuck_frames(&self) -> u32 {
        self.stuck_frames
    }

    pub fn frames_alive(&self) -> u32 {
        self.frames_alive
    }

    pub fn laps(&self) -> u32 {
        self.half_laps / 2
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn profile(&self) -> &CarProfile {
        &self.profile
    }

    /// Apply a steering value in [-1, 1].
    ///
    /// Values at or beyond `sensitivity` turn by the profile's rotation
    /// speed; anything in between drives straight. Dead cars ignore input.
    pub fn control(&mut self, steering: f32, sensitivity: f32) -> Turn {
        if !self.is_alive() {
            return Turn::Straight;
        }

        let turn = if steering >= sensitivity {
            Turn::Left
        } else if steering <= -sensitivity {
            Turn::Right
        } else {
            Turn::Straight
        };

        match turn {
            Turn::Left => self.angle += self.profile.rotation_speed,
            Turn::Right => self.angle -= self.profile.rotation_speed,
            Turn::Straight => {}
        }
        self.angle = self.angle.rem_euclid(360.0);

        match self.profile.steering {
            SteeringMode::TurnInPlace => {
                self.speed = if turn == Turn::Straight {
                    self.profile.speed
                } else {
                    0.0
                };
            }
            SteeringMode::RallyDriving { turn_penalty } => {
                if turn != Turn::Straight {
                    self.turn_penalty += turn_penalty;
                }
            }
        }

        turn
    }

    /// Advance one tick: move, check collision, sense, then the remaining rules
    pub fn update(&mut self, track: &Track) {
        if !self.is_alive() {
            return;
        }

        let radians = self.angle.to_radians();
        let step = Vec2::new(radians.cos(), -radians.sin()) * self.speed;
        self.position += step;
        self.distance_traveled += step.length();
        self.frames_alive += 1;

        if self.collides(track) {
            self.die(DeathCause::Collision);
            return;
        }

        self.sense(track);
        self.check_rules(track);
    }

    /// Recompute the sensor readings at the current pose
    pub fn sense(&mut self, track: &Track) {
        self.profile
            .sensors
            .cast_into(track, self.position, self.angle, &mut self.ray_lengths);
    }

    /// World-space corners of the oriented bounding box
    pub fn corners(&self) -> [Vec2; 4] {
        let radians = self.angle.to_radians();
        let (sin, cos) = radians.sin_cos();
        let half_length = self.profile.body.length / 2.0;
        let half_width = self.profile.body.width / 2.0;

        [
            (-half_length, -half_width),
            (half_length, -half_width),
            (-half_length, half_width),
            (half_length, half_width),
        ]
        .map(|(lx, ly)| {
            let rotated_x = lx * cos - ly * sin;
            let rotated_y = lx * sin + ly * cos;
            Vec2::new(self.position.x + rotated_x, self.position.y - rotated_y)
        })
    }

    /// Whether any corner lies in a wall or off the grid
    pub fn collides(&self, track: &Track) -> bool {
        self.corners().iter().any(|&corner| track.is_wall_at(corner))
    }

    fn check_rules(&mut self, track: &Track) {
        let rules = self.profile.lifecycle;

        if let Some(limit) = rules.stuck_limit {
            if self.speed == 0.0 {
                self.stuck_frames += 1;
            } else {
                self.stuck_frames = 0;
            }
            if self.stuck_frames > limit {
                self.die(DeathCause::Stuck);
                return;
            }
        }

        if let Some(cap) = rules.distance_cap {
            if self.distance_traveled > cap {
                log::debug!("Course completed after {:.0} units", self.distance_traveled);
                self.die(DeathCause::CourseCompleted);
                return;
            }
        }

        if let Some(cap) = rules.lap_cap {
            self.track_laps(track);
            if self.laps() > cap {
                self.die(DeathCause::LapLimit);
            }
        }
    }

    /// Count a half lap whenever the car moves onto the start column.
    ///
    /// Direction and row are not checked, so revisiting the start column
    /// elsewhere on the track also counts.
    fn track_laps(&mut self, track: &Track) {
        let Some((_, start_col)) = track.start_cell() else {
            return;
        };

        let (_, col) = track.world_to_grid(self.position);
        if let Some(last_col) = self.last_col {
            if col != last_col && col == start_col as i64 {
                self.half_laps += 1;
            }
        }
        self.last_col = Some(col);
    }

    fn die(&mut self, cause: DeathCause) {
        log::debug!(
            "Car died ({:?}) at ({:.1}, {:.1}) after {:.0} units",
            cause,
            self.position.x,
            self.position.y,
            self.distance_traveled
        );
        self.state = CarState::Dead(cause);
    }
}
