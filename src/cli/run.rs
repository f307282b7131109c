//! Run command implementation.

use super::output::{JsonRunResult, format_run_text};
use super::{CliError, OutputFormat, seed_or_clock};
use creature_horizon::{SimulationConfig, run_seeded};

/// Execute the run command.
///
/// # Errors
///
/// Returns an error if the creature count is invalid or the run fails.
pub(crate) fn execute(
    creatures: usize,
    seed: Option<u64>,
    max_iterations: u32,
    format: OutputFormat,
    quiet: bool,
) -> Result<(), CliError> {
    let seed = seed_or_clock(seed);
    let config = SimulationConfig {
        creatures,
        max_iterations,
    };

    if !quiet && format == OutputFormat::Text {
        println!("Running simulation with seed {seed} and {creatures} creatures...");
        println!();
    }

    let run = run_seeded(seed, &config)?;

    match format {
        OutputFormat::Text if quiet => println!("{}", run.horizon.status()),
        OutputFormat::Text => print!("{}", format_run_text(seed, &run)),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&JsonRunResult::from_run(seed, &run))?;
            println!("{json}");
        }
    }

    Ok(())
}
