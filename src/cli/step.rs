//! Step command implementation.
//!
//! Loads a world snapshot, runs one iteration and writes the snapshot back.

use super::output::{format_horizon, format_outcome_text};
use super::{CliError, seed_or_clock};
use creature_horizon::{Horizon, IterationOutcome, Simulation, XorShiftRandom};
use std::fs;
use std::path::Path;

/// Read a world snapshot from `path`.
fn load(path: &Path) -> Result<Horizon, CliError> {
    let text = fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&text)?)
}

/// Write a world snapshot to `path`.
fn save(path: &Path, horizon: &Horizon) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(horizon)?;
    fs::write(path, json).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Advance the snapshot at `path` by one iteration and return the outcome.
fn step_file(path: &Path, seed: u64, init: Option<usize>) -> Result<IterationOutcome, CliError> {
    let mut simulation = Simulation::new(XorShiftRandom::new(seed));

    let mut horizon = match init {
        Some(creatures) => simulation.create_new_simulation(creatures)?,
        None => load(path)?,
    };

    let outcome = simulation.run_iteration(&mut horizon)?;
    save(path, &horizon)?;
    Ok(outcome)
}

/// Execute the step command.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be read, parsed or written, or if
/// the world cannot be advanced (for example because it already finished).
pub(crate) fn execute(
    state: &Path,
    seed: Option<u64>,
    init: Option<usize>,
) -> Result<(), CliError> {
    let seed = seed_or_clock(seed);
    let outcome = step_file(state, seed, init)?;

    print!("{}", format_outcome_text(&outcome));
    let horizon = load(state)?;
    println!();
    print!("{}", format_horizon(&horizon));

    Ok(())
}
