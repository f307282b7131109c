//! Output formatting utilities for CLI.

// Rates are shown as percentages
#![allow(clippy::cast_precision_loss)]

use creature_horizon::{
    BatchStats, Horizon, HorizonEntity, IterationOutcome, SimulationRun, SimulationStatus,
};
use serde::Serialize;

/// JSON-serializable simulation result.
#[derive(Debug, Serialize)]
pub(super) struct JsonRunResult<'a> {
    /// Random seed used.
    pub(super) seed: u64,
    /// Final status.
    pub(super) status: SimulationStatus,
    /// Iterations executed.
    pub(super) iterations: u32,
    /// Whether a terminal status was reached.
    pub(super) finished: bool,
    /// Final world.
    pub(super) horizon: &'a Horizon,
}

impl<'a> JsonRunResult<'a> {
    /// Create from a finished run.
    pub(super) fn from_run(seed: u64, run: &'a SimulationRun) -> Self {
        Self {
            seed,
            status: run.horizon.status(),
            iterations: run.iterations,
            finished: run.finished(),
            horizon: &run.horizon,
        }
    }
}

/// Format the entities of a world, one per line.
pub(super) fn format_horizon(horizon: &Horizon) -> String {
    let mut output = String::new();

    for entity in horizon.entities() {
        output.push_str(&format!(
            "  {:?} {}: x = {:.2}, gold = {:.2}\n",
            entity.kind(),
            entity.id(),
            entity.x(),
            entity.gold()
        ));
    }
    if let Some(guardian) = horizon.guardian() {
        output.push_str(&format!(
            "  Guardian {}: x = {:.2}, gold = {:.2}\n",
            guardian.id(),
            guardian.x(),
            guardian.gold()
        ));
    }

    output
}

/// Format a run as human-readable text.
pub(super) fn format_run_text(seed: u64, run: &SimulationRun) -> String {
    let mut output = String::new();

    output.push_str(&format!("Simulation Result (seed: {seed})\n"));
    output.push_str(&format!("  Status: {}\n", run.horizon.status()));
    output.push_str(&format!("  Iterations: {}", run.iterations));
    if !run.finished() {
        output.push_str(" (cap reached)");
    }
    output.push_str("\n\n");
    output.push_str(&format_horizon(&run.horizon));

    output
}

/// Format a single iteration outcome as text.
pub(super) fn format_outcome_text(outcome: &IterationOutcome) -> String {
    format!(
        "Status: {}\n  Entities: {}\n  Fusions: {}\n  Predations: {}\n  Thefts: {}\n",
        outcome.status,
        outcome.entities_remaining,
        outcome.fusions,
        outcome.predations,
        outcome.thefts
    )
}

/// JSON-serializable batch result.
#[derive(Debug, Serialize)]
pub(super) struct JsonBatchResult {
    /// Seed of the first simulation.
    base_seed: u64,
    /// Creatures per simulation.
    creatures: usize,
    /// Raw counters.
    #[serde(flatten)]
    stats: BatchStats,
    /// Success rate (0.0-1.0).
    success_rate: f64,
    /// Average iterations per simulation.
    avg_iterations: f64,
}

impl JsonBatchResult {
    /// Create from stats.
    pub(super) fn from_stats(stats: &BatchStats, base_seed: u64, creatures: usize) -> Self {
        Self {
            base_seed,
            creatures,
            stats: *stats,
            success_rate: stats.success_rate(),
            avg_iterations: stats.avg_iterations(),
        }
    }
}

fn percent(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    part as f64 / total as f64 * 100.0
}

/// Format batch stats as human-readable text.
pub(super) fn format_batch_text(stats: &BatchStats, creatures: usize) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Batch Results ({} simulations, {creatures} creatures)\n",
        stats.simulations
    ));
    output.push_str("========================================\n\n");

    let rows = [
        ("Successful", stats.successes),
        ("Failed", stats.failures),
        ("Unfinished", stats.unfinished),
        ("Errors", stats.errors),
    ];
    for (label, count) in rows {
        output.push_str(&format!(
            "  {label}: {count} ({:.1}%)\n",
            percent(count, stats.simulations)
        ));
    }

    output.push_str(&format!(
        "\nAverage Length: {:.1} iterations\n",
        stats.avg_iterations()
    ));

    output
}

const CSV_HEADER: &str =
    "creatures,simulations,successes,failures,unfinished,errors,success_rate,avg_iterations\n";

/// Format batch stats as CSV.
pub(super) fn format_batch_csv(stats: &BatchStats, creatures: usize) -> String {
    let mut output = String::new();

    output.push_str(CSV_HEADER);
    output.push_str(&format!(
        "{},{},{},{},{},{},{:.4},{:.2}\n",
        creatures,
        stats.simulations,
        stats.successes,
        stats.failures,
        stats.unfinished,
        stats.errors,
        stats.success_rate(),
        stats.avg_iterations()
    ));

    output
}
