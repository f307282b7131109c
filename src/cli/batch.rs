//! Batch command implementation.

use super::output::{JsonBatchResult, format_batch_csv, format_batch_text};
use super::{BatchFormat, CliError, seed_or_clock};
use creature_horizon::{BatchConfig, SimulationConfig, run_batch};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Instant;

const PROGRESS_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} simulations ({per_sec})";

/// Execute the batch command.
///
/// # Errors
///
/// Returns an error if the creature count is invalid or output fails.
#[allow(clippy::too_many_arguments)]
pub(crate) fn execute(
    simulations: u64,
    creatures: usize,
    seed: Option<u64>,
    max_iterations: u32,
    threads: Option<usize>,
    format: BatchFormat,
    progress: bool,
) -> Result<(), CliError> {
    // Set thread pool size if specified
    if let Some(num_threads) = threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .ok(); // Ignore error if already initialized
    }

    let config = BatchConfig {
        simulations,
        base_seed: seed_or_clock(seed),
        simulation: SimulationConfig {
            creatures,
            max_iterations,
        },
    };

    // Progress bar
    let pb = if progress {
        let pb = ProgressBar::new(simulations);
        let style = ProgressStyle::default_bar()
            .template(PROGRESS_TEMPLATE)
            .map_err(|e| CliError::Other(format!("Invalid progress template: {e}")))?
            .progress_chars("=>-");
        pb.set_style(style);
        Some(pb)
    } else {
        None
    };

    let start = Instant::now();
    let stats = run_batch(&config)?;

    // Update progress bar after completion (no atomic overhead in hot path)
    if let Some(pb) = pb {
        pb.set_position(stats.simulations);
        pb.finish_with_message("done");
    }

    let duration = start.elapsed();

    match format {
        BatchFormat::Text => {
            println!();
            print!("{}", format_batch_text(&stats, creatures));
            println!();
            println!("Base seed: {}", config.base_seed);
            println!("Duration: {:.2}s", duration.as_secs_f64());
        }
        BatchFormat::Json => {
            let json_result = JsonBatchResult::from_stats(&stats, config.base_seed, creatures);
            println!("{}", serde_json::to_string_pretty(&json_result)?);
        }
        BatchFormat::Csv => {
            print!("{}", format_batch_csv(&stats, creatures));
        }
    }

    Ok(())
}
