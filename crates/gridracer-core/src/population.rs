//! Population of cars and the generational evolution loop
//!
//! Every record pairs a car with the policy steering it. A generation is
//! scored over several spawn poses ("test positions"); fitness keeps adding
//! up across them. Once the last pose has been driven out, the best policy
//! is kept unmodified and the rest of the next generation is bred from it
//! by mutation.

use gridracer_car::{Car, CarProfile, Policy, DEFAULT_COLOR, ELITE_COLOR};
use gridracer_track::{Spawn, Track, DEFAULT_SPAWN_ATTEMPTS};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use serde::{Deserialize, Serialize};

use crate::error::{EvolutionError, InvalidPopulationConfig};
use crate::snapshot::SimulationSnapshot;

/// Evolution parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationConfig {
    /// Number of cars per generation
    pub size: usize,
    /// Extra spawn poses after the first one before breeding
    pub test_positions: usize,
    /// Standard deviation of the mutation noise
    pub mutation_rate: f32,
    /// Steering magnitude needed to turn
    pub sensitivity: f32,
    /// A checkpoint is due every this many generations (0 = never)
    pub checkpoint_interval: usize,
    pub seed: u64,
    /// Rejected samples before spawn selection gives up
    pub spawn_attempts: usize,
    pub profile: CarProfile,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            size: 50,
            test_positions: 3,
            mutation_rate: 0.01,
            sensitivity: 0.35,
            checkpoint_interval: 100,
            seed: 42,
            spawn_attempts: DEFAULT_SPAWN_ATTEMPTS,
            profile: CarProfile::default(),
        }
    }
}

impl PopulationConfig {
    pub fn validate(&self) -> Result<(), InvalidPopulationConfig> {
        if self.size == 0 {
            return Err(InvalidPopulationConfig::ZeroPopulation);
        }
        if self.test_positions == 0 {
            return Err(InvalidPopulationConfig::ZeroTestPositions);
        }
        self.profile.validate()?;
        Ok(())
    }

    /// Whether a checkpoint should be written after `generation` completed
    pub fn checkpoint_due(&self, generation: usize) -> bool {
        self.checkpoint_interval > 0 && generation % self.checkpoint_interval == 0
    }
}

/// One car and the policy driving it
#[derive(Debug, Clone)]
pub struct Record<P> {
    pub car: Car,
    pub policy: P,
    /// Accumulated over every test position of the current generation
    pub fitness: f32,
}

/// Result of a completed generation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSummary {
    /// Generations completed so far, this one included
    pub generation: usize,
    pub best_fitness: f32,
    pub average_fitness: f32,
    pub checkpoint_due: bool,
}

/// What a call to [`Population::step_tick`] led to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// At least one car is still driving
    Running,
    /// All cars died; they were moved to test position `index`
    TestPositionAdvanced { index: usize },
    /// All cars died on the last test position and a new generation was bred
    GenerationCompleted(GenerationSummary),
}

pub struct Population<P: Policy> {
    config: PopulationConfig,
    track: Track,
    rng: Xoshiro256StarStar,
    prototype: P,
    records: Vec<Record<P>>,
    elite: Option<P>,
    generation: usize,
    test_position_index: usize,
    history: Vec<f32>,
}

impl<P: Policy> Population<P> {
    /// Build generation zero: `size` randomized policies on one shared spawn.
    ///
    /// `prototype` only provides the policy shape; it never drives itself.
    pub fn new(config: PopulationConfig, track: Track, prototype: P) -> Result<Self, EvolutionError> {
        config.validate()?;
        if let Some(expected) = prototype.observation_size() {
            let rays = config.profile.ray_count();
            if expected != rays {
                return Err(InvalidPopulationConfig::ObservationMismatch { expected, rays }.into());
            }
        }

        let mut rng = Xoshiro256StarStar::seed_from_u64(config.seed);
        let spawn = track.pick_random_spawn(&mut rng, config.spawn_attempts)?;
        let records = (0..config.size)
            .map(|_| Record {
                car: Car::spawn(&track, spawn, config.profile.clone()),
                policy: prototype.randomize(&mut rng),
                fitness: 0.0,
            })
            .collect();

        log::info!(
            "Population of {} cars, {} test positions, seed {}",
            config.size,
            config.test_positions,
            config.seed
        );

        Ok(Self {
            config,
            track,
            rng,
            prototype,
            records,
            elite: None,
            generation: 0,
            test_position_index: 0,
            history: Vec::new(),
        })
    }

    /// Advance every live car by one tick, then handle an all-dead population
    pub fn step_tick(&mut self) -> Result<TickOutcome, EvolutionError> {
        let sensitivity = self.config.sensitivity;

        for (index, record) in self.records.iter_mut().enumerate() {
            if !record.car.is_alive() {
                continue;
            }

            let steering = record
                .policy
                .think(record.car.ray_lengths())
                .map_err(|source| EvolutionError::Policy { index, source })?;

            let distance_before = record.car.distance_traveled();
            let penalty_before = record.car.turn_penalty();
            record.car.control(steering, sensitivity);
            record.car.update(&self.track);

            let distance = record.car.distance_traveled() - distance_before;
            let penalty = record.car.turn_penalty() - penalty_before;
            record.fitness += distance - penalty;
        }

        if self.alive_count() > 0 {
            return Ok(TickOutcome::Running);
        }

        // Index 0 is the generation's own spawn, so `test_positions + 1` poses are driven
        if self.test_position_index < self.config.test_positions {
            let next_index = self.test_position_index + 1;
            let spawn = self.draw_spawn()?;
            for record in &mut self.records {
                record.car.reposition(&self.track, spawn);
            }
            self.test_position_index = next_index;
            log::debug!(
                "Generation {}: test position {} at ({}, {})",
                self.generation,
                next_index,
                spawn.row,
                spawn.col
            );
            return Ok(TickOutcome::TestPositionAdvanced { index: next_index });
        }

        self.breed().map(TickOutcome::GenerationCompleted)
    }

    /// Replace the population with the elite and mutated children of it
    fn breed(&mut self) -> Result<GenerationSummary, EvolutionError> {
        let best_index = self.best_index();
        let best_fitness = self.records[best_index].fitness;
        let average_fitness =
            self.records.iter().map(|record| record.fitness).sum::<f32>() / self.records.len() as f32;
        let elite = self.records[best_index].policy.clone();

        let mut policies = Vec::with_capacity(self.config.size);
        policies.push(elite.clone());
        for _ in 1..self.config.size {
            let child = elite
                .mutate(self.config.mutation_rate, &mut self.rng)
                .map_err(|source| EvolutionError::Policy {
                    index: best_index,
                    source,
                })?;
            policies.push(child);
        }

        let spawn = self.draw_spawn()?;
        self.records = self.spawn_records(spawn, policies, true);
        self.elite = Some(elite);
        self.history.push(best_fitness);
        self.generation += 1;
        self.test_position_index = 0;

        let summary = GenerationSummary {
            generation: self.generation,
            best_fitness,
            average_fitness,
            checkpoint_due: self.config.checkpoint_due(self.generation),
        };
        log::info!(
            "Generation {} complete: best {:.2}, average {:.2}",
            summary.generation,
            summary.best_fitness,
            summary.average_fitness
        );
        Ok(summary)
    }

    /// First record with the highest fitness
    fn best_index(&self) -> usize {
        let mut best = 0;
        for (index, record) in self.records.iter().enumerate().skip(1) {
            if record.fitness > self.records[best].fitness {
                best = index;
            }
        }
        best
    }

    fn draw_spawn(&mut self) -> Result<Spawn, EvolutionError> {
        Ok(self
            .track
            .pick_random_spawn(&mut self.rng, self.config.spawn_attempts)?)
    }

    /// Cars for a new generation, all on the same spawn
    fn spawn_records(&self, spawn: Spawn, policies: Vec<P>, first_is_elite: bool) -> Vec<Record<P>> {
        policies
            .into_iter()
            .enumerate()
            .map(|(index, policy)| {
                let color = if index == 0 && first_is_elite {
                    ELITE_COLOR
                } else {
                    DEFAULT_COLOR
                };
                Record {
                    car: Car::spawn(&self.track, spawn, self.config.profile.clone()).with_color(color),
                    policy,
                    fitness: 0.0,
                }
            })
            .collect()
    }

    /// Start over with freshly randomized policies.
    ///
    /// Generation count and fitness history are kept.
    pub fn reset(&mut self) -> Result<(), EvolutionError> {
        let spawn = self.draw_spawn()?;
        let policies = (0..self.config.size)
            .map(|_| self.prototype.randomize(&mut self.rng))
            .collect();
        self.elite = None;
        self.records = self.spawn_records(spawn, policies, false);
        self.test_position_index = 0;
        log::info!("Population reset at generation {}", self.generation);
        Ok(())
    }

    /// Swap in a new track and restart the current generation on it.
    ///
    /// Policies survive, fitness and test positions start over. On error the
    /// old track stays in place.
    pub fn replace_track(&mut self, track: Track) -> Result<(), EvolutionError> {
        let spawn = track.pick_random_spawn(&mut self.rng, self.config.spawn_attempts)?;
        self.track = track;
        for record in &mut self.records {
            record.car.respawn(&self.track, spawn);
            record.fitness = 0.0;
        }
        self.test_position_index = 0;
        Ok(())
    }

    pub fn config(&self) -> &PopulationConfig {
        &self.config
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    /// Number of completed generations
    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn test_position_index(&self) -> usize {
        self.test_position_index
    }

    pub fn records(&self) -> &[Record<P>] {
        &self.records
    }

    pub fn alive_count(&self) -> usize {
        self.records.iter().filter(|record| record.car.is_alive()).count()
    }

    /// Record with the highest fitness so far this generation
    pub fn best_record(&self) -> &Record<P> {
        &self.records[self.best_index()]
    }

    /// Best policy of the last completed generation
    pub fn elite_policy(&self) -> Option<&P> {
        self.elite.as_ref()
    }

    /// Best fitness of every completed generation, oldest first
    pub fn history(&self) -> &[f32] {
        &self.history
    }

    /// Render view of the track and every live car
    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot::capture(
            &self.track,
            self.records.iter().map(|record| &record.car),
            self.generation,
            self.test_position_index,
        )
    }
}
