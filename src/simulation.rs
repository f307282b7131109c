//! Simulation engine.
//!
//! One iteration runs these phases in order:
//!
//! 1. Snapshot the identities of the active entities.
//! 2. For each snapshotted entity still active: move it by one fresh random
//!    factor, resolve interactions at its new position, and let the survivor
//!    (unless it is the guardian) rob its nearest neighbor.
//! 3. Move the guardian by one more factor and resolve interactions where it
//!    lands.
//! 4. Re-evaluate the status.
//!
//! The step runs on a scratch copy of the horizon that replaces the caller's
//! value only when every phase succeeded, so a failed iteration changes
//! nothing.

mod interactions;
mod invariants;

pub use interactions::{
    Interaction, Resolution, Theft, evaluate_status, find_nearest_neighbor,
    resolve_interactions_at, treat_neighbor_theft,
};
pub use invariants::{InvariantViolation, assert_invariants, check_invariants, total_gold};

use tracing::{debug, info};

use crate::entity::{Entity, EntityId, EntityKey, HorizonEntity, Move};
use crate::error::{SimResult, SimulationError};
use crate::horizon::{Horizon, SimulationStatus};
use crate::random::RandomPort;

/// Fewest creatures a simulation can start with.
pub const MIN_CREATURES: usize = 1;

/// Most creatures a simulation can start with.
pub const MAX_CREATURES: usize = 10;

/// Share of the victim's gold taken by a neighbor theft.
pub const THEFT_PERCENTAGE: f64 = 0.5;

/// Default cap on iterations for a full run.
pub const DEFAULT_MAX_ITERATIONS: u32 = 10_000;

/// Configuration for a full simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationConfig {
    /// Number of creatures at start (1-10).
    pub creatures: usize,
    /// Iterations after which an unfinished run is abandoned.
    pub max_iterations: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            creatures: MAX_CREATURES,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// Summary of a single iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IterationOutcome {
    /// Status after the iteration.
    pub status: SimulationStatus,
    /// Fusions performed.
    pub fusions: u32,
    /// Clusters consumed by the guardian.
    pub predations: u32,
    /// Neighbor thefts performed.
    pub thefts: u32,
    /// Active entities left.
    pub entities_remaining: usize,
}

impl IterationOutcome {
    fn record(&mut self, interaction: &Interaction) {
        match interaction.resolution {
            Resolution::Quiet => {}
            Resolution::Predation { .. } => self.predations += 1,
            Resolution::Fusion { .. } => self.fusions += 1,
        }
    }
}

/// Result of running a simulation until it finishes or hits the cap.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRun {
    /// Final world.
    pub horizon: Horizon,
    /// Iterations executed.
    pub iterations: u32,
}

impl SimulationRun {
    /// Whether the run reached a terminal status.
    #[must_use]
    pub const fn finished(&self) -> bool {
        self.horizon.status().is_terminal()
    }
}

/// The simulation engine, driven by a source of movement factors.
#[derive(Debug, Clone)]
pub struct Simulation<R> {
    random: R,
}

impl<R: RandomPort> Simulation<R> {
    /// Create an engine drawing movement factors from `random`.
    #[must_use]
    pub const fn new(random: R) -> Self {
        Self { random }
    }

    /// The factor source.
    #[must_use]
    pub const fn random(&self) -> &R {
        &self.random
    }

    /// Build the initial world: `creatures` units with ids `1..=creatures` at
    /// the origin and a guardian with id `creatures + 1`.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::InvalidCreatureCount`] unless
    /// `1 <= creatures <= 10`.
    pub fn create_new_simulation(&self, creatures: usize) -> SimResult<Horizon> {
        let invalid = SimulationError::InvalidCreatureCount {
            count: creatures,
            min: MIN_CREATURES,
            max: MAX_CREATURES,
        };
        if !(MIN_CREATURES..=MAX_CREATURES).contains(&creatures) {
            return Err(invalid);
        }

        let guardian_id = EntityId::try_from(creatures + 1).map_err(|_| invalid)?;
        Horizon::populated(creatures, guardian_id)
    }

    /// Advance `horizon` by one iteration.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::NotRunning`] if the horizon already
    /// finished, or the validation error raised by any phase (for example a
    /// factor outside `[-1, 1]`). On error the horizon is left unchanged.
    pub fn run_iteration(&mut self, horizon: &mut Horizon) -> SimResult<IterationOutcome> {
        if horizon.status() != SimulationStatus::Running {
            return Err(SimulationError::NotRunning(horizon.status()));
        }

        let mut next = horizon.clone();
        let outcome = self.step(&mut next)?;
        *horizon = next;

        debug!(
            entities = outcome.entities_remaining,
            fusions = outcome.fusions,
            predations = outcome.predations,
            thefts = outcome.thefts,
            status = %outcome.status,
            "Iteration finished"
        );
        Ok(outcome)
    }

    /// Iterate `horizon` until it finishes or `max_iterations` have run.
    ///
    /// Returns the number of iterations executed.
    ///
    /// # Errors
    ///
    /// Propagates the first iteration error.
    pub fn run_until_finished(
        &mut self,
        horizon: &mut Horizon,
        max_iterations: u32,
    ) -> SimResult<u32> {
        let mut iterations = 0;
        while !horizon.status().is_terminal() && iterations < max_iterations {
            self.run_iteration(horizon)?;
            iterations += 1;
            assert_invariants(horizon);
        }

        if horizon.status().is_terminal() {
            info!(iterations, status = %horizon.status(), "Simulation finished");
        } else {
            info!(iterations, entities = horizon.len(), "Iteration cap reached");
        }
        Ok(iterations)
    }

    /// Create a world per `config` and run it to completion.
    ///
    /// # Errors
    ///
    /// Returns the creation error for an invalid creature count, or the first
    /// iteration error.
    pub fn run_full_simulation(&mut self, config: &SimulationConfig) -> SimResult<SimulationRun> {
        let mut horizon = self.create_new_simulation(config.creatures)?;
        let iterations = self.run_until_finished(&mut horizon, config.max_iterations)?;
        Ok(SimulationRun {
            horizon,
            iterations,
        })
    }

    fn step(&mut self, horizon: &mut Horizon) -> SimResult<IterationOutcome> {
        let mut outcome = IterationOutcome::default();

        // Fusions and predation remove entities mid-pass; walk a snapshot of
        // identities and skip whatever is gone. A tracked guardian moves once,
        // with the guardian, below.
        let guardian = horizon.guardian_key();
        let queue: Vec<EntityKey> = horizon
            .entities()
            .iter()
            .map(Entity::key)
            .filter(|key| Some(*key) != guardian)
            .collect();

        for key in queue {
            let Some(entity) = horizon.get_mut(key) else {
                continue;
            };
            if let Some(mover) = entity.as_move_mut() {
                mover.move_by(self.random.next_factor())?;
            }
            let position = entity.x();

            let interaction = resolve_interactions_at(horizon, position)?;
            outcome.record(&interaction);

            let theft = match interaction.survivor {
                Some(survivor) if !survivor.is_guardian() => {
                    treat_neighbor_theft(horizon, &survivor)?
                }
                _ => None,
            };
            if theft.is_some() {
                outcome.thefts += 1;
            }
        }

        let guardian_position = match horizon.guardian_mut() {
            Some(guardian) => Some(guardian.move_by(self.random.next_factor())?),
            None => None,
        };
        if let Some(position) = guardian_position {
            let interaction = resolve_interactions_at(horizon, position)?;
            outcome.record(&interaction);
        }
        horizon.sync_tracked_guardian();

        let status = evaluate_status(horizon);
        horizon.transition(status)?;

        outcome.status = status;
        outcome.entities_remaining = horizon.len();
        Ok(outcome)
    }
}
