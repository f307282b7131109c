//! Batch runner for many independent simulations.
//!
//! Provides a pure function interface: `(config) -> BatchStats`. Simulation
//! `i` of a batch is seeded with `base_seed + i` (wrapping), so a batch is
//! reproducible regardless of the number of threads.

// Rates and averages use intentional casts
#![allow(clippy::cast_precision_loss)]

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{SimResult, SimulationError};
use crate::horizon::SimulationStatus;
use crate::random::XorShiftRandom;
use crate::simulation::{MAX_CREATURES, MIN_CREATURES, Simulation, SimulationConfig, SimulationRun};

/// Configuration for a batch of simulations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchConfig {
    /// Number of simulations to run.
    pub simulations: u64,
    /// Seed of the first simulation.
    pub base_seed: u64,
    /// Settings shared by every simulation.
    pub simulation: SimulationConfig,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            simulations: 1000,
            base_seed: 42,
            simulation: SimulationConfig::default(),
        }
    }
}

/// Aggregated results of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BatchStats {
    /// Simulations run.
    pub simulations: u64,
    /// Simulations that ended `Successful`.
    pub successes: u64,
    /// Simulations that ended `Failed`.
    pub failures: u64,
    /// Simulations stopped by the iteration cap.
    pub unfinished: u64,
    /// Simulations aborted by an engine error.
    pub errors: u64,
    /// Iterations executed across all simulations.
    pub total_iterations: u64,
}

impl BatchStats {
    /// Empty statistics.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            simulations: 0,
            successes: 0,
            failures: 0,
            unfinished: 0,
            errors: 0,
            total_iterations: 0,
        }
    }

    /// Record one finished or abandoned run.
    pub fn add_run(&mut self, run: &SimulationRun) {
        self.simulations += 1;
        self.total_iterations += u64::from(run.iterations);
        match run.horizon.status() {
            SimulationStatus::Successful => self.successes += 1,
            SimulationStatus::Failed => self.failures += 1,
            SimulationStatus::Running => self.unfinished += 1,
        }
    }

    /// Record a run that errored out.
    pub fn add_error(&mut self) {
        self.simulations += 1;
        self.errors += 1;
    }

    /// Merge another set of statistics into this one.
    pub fn merge(&mut self, other: &Self) {
        self.simulations += other.simulations;
        self.successes += other.successes;
        self.failures += other.failures;
        self.unfinished += other.unfinished;
        self.errors += other.errors;
        self.total_iterations += other.total_iterations;
    }

    /// Share of simulations that ended `Successful` (0.0-1.0).
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        if self.simulations == 0 {
            return 0.0;
        }
        self.successes as f64 / self.simulations as f64
    }

    /// Average iterations per simulation.
    #[must_use]
    pub fn avg_iterations(&self) -> f64 {
        if self.simulations == 0 {
            return 0.0;
        }
        self.total_iterations as f64 / self.simulations as f64
    }
}

/// Run one simulation driven by a [`XorShiftRandom`] seeded with `seed`.
///
/// Given the same seed and config, this always produces the same run.
///
/// # Errors
///
/// Returns [`SimulationError::InvalidCreatureCount`] for an out-of-range
/// creature count.
pub fn run_seeded(seed: u64, config: &SimulationConfig) -> SimResult<SimulationRun> {
    Simulation::new(XorShiftRandom::new(seed)).run_full_simulation(config)
}

/// Run every simulation of the batch in parallel and aggregate the results.
///
/// # Errors
///
/// Returns [`SimulationError::InvalidCreatureCount`] before running anything
/// when the creature count is out of range.
pub fn run_batch(config: &BatchConfig) -> SimResult<BatchStats> {
    let creatures = config.simulation.creatures;
    if !(MIN_CREATURES..=MAX_CREATURES).contains(&creatures) {
        return Err(SimulationError::InvalidCreatureCount {
            count: creatures,
            min: MIN_CREATURES,
            max: MAX_CREATURES,
        });
    }

    // Each thread accumulates into its own stats, merged at the end
    let stats = (0..config.simulations)
        .into_par_iter()
        .fold(BatchStats::new, |mut local, i| {
            let seed = config.base_seed.wrapping_add(i);
            match run_seeded(seed, &config.simulation) {
                Ok(run) => local.add_run(&run),
                Err(e) => {
                    debug!(seed, error = %e, "Simulation aborted");
                    local.add_error();
                }
            }
            local
        })
        .reduce(BatchStats::new, |mut a, b| {
            a.merge(&b);
            a
        });

    info!(
        simulations = stats.simulations,
        successes = stats.successes,
        failures = stats.failures,
        unfinished = stats.unfinished,
        "Batch finished"
    );
    Ok(stats)
}
