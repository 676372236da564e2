//! Replay of a trained policy
//!
//! One car drives the track with a saved policy. Whenever it dies it is
//! respawned at a random pose, so a long replay covers many starts.

use anyhow::{Context, Result};
use gridracer_core::car::{Car, CarProfile, DeathCause, MlpPolicy, Policy};
use gridracer_core::track::Track;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;

/// Outcome of one life of the replayed car
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayRun {
    pub distance: f32,
    pub laps: u32,
    pub ticks: u32,
    /// `None` when the replay ended while the car was still driving
    pub death: Option<DeathCause>,
}

/// Replay settings taken from the trainer configuration
#[derive(Debug, Clone)]
pub struct ReplaySettings {
    pub profile: CarProfile,
    pub sensitivity: f32,
    pub ticks: u64,
    pub seed: u64,
    pub spawn_attempts: usize,
}

pub fn replay(track: &Track, policy: &mut MlpPolicy, settings: &ReplaySettings) -> Result<Vec<ReplayRun>> {
    if let Some(expected) = policy.observation_size() {
        let rays = settings.profile.ray_count();
        if expected != rays {
            anyhow::bail!("Model expects {} sensor readings but the car has {} rays", expected, rays);
        }
    }

    let mut rng = Xoshiro256StarStar::seed_from_u64(settings.seed);
    let spawn = track
        .pick_random_spawn(&mut rng, settings.spawn_attempts)
        .context("Failed to place replay car")?;
    let mut car = Car::spawn(track, spawn, settings.profile.clone());
    let mut runs = Vec::new();

    for _ in 0..settings.ticks {
        let steering = policy.think(car.ray_lengths())?;
        car.control(steering, settings.sensitivity);
        car.update(track);

        if let Some(cause) = car.death_cause() {
            let run = finish_run(&car, Some(cause));
            log::info!(
                "Run {}: {:.0} units, {} laps, {:?}",
                runs.len() + 1,
                run.distance,
                run.laps,
                cause
            );
            runs.push(run);

            let spawn = track
                .pick_random_spawn(&mut rng, settings.spawn_attempts)
                .context("Failed to respawn replay car")?;
            car.respawn(track, spawn);
        }
    }

    if car.frames_alive() > 0 {
        runs.push(finish_run(&car, None));
    }
    Ok(runs)
}

fn finish_run(car: &Car, death: Option<DeathCause>) -> ReplayRun {
    ReplayRun {
        distance: car.distance_traveled(),
        laps: car.laps(),
        ticks: car.frames_alive(),
        death,
    }
}
