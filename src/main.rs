//! Creature Horizon CLI - run and inspect creature economy simulations.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Creature Horizon - a one-dimensional creature economy simulator
#[derive(Parser, Debug)]
#[command(name = "horizon")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a single simulation to completion
    Run {
        /// Number of creatures (1-10)
        #[arg(short, long, default_value = "10")]
        creatures: usize,

        /// Random seed (default: random)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Iterations before giving up (default: 10000)
        #[arg(short, long, default_value = "10000")]
        max_iterations: u32,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Only print the final status
        #[arg(short, long)]
        quiet: bool,
    },

    /// Advance a saved world by one iteration
    Step {
        /// Snapshot file (JSON), rewritten after the step
        #[arg(long, required = true)]
        state: PathBuf,

        /// Random seed (default: random)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Start a fresh world with N creatures instead of loading the file
        #[arg(long)]
        init: Option<usize>,
    },

    /// Run many seeded simulations in parallel and aggregate statistics
    Batch {
        /// Number of simulations to run (default: 1000)
        #[arg(short = 'n', long, default_value = "1000")]
        simulations: u64,

        /// Number of creatures per simulation (1-10)
        #[arg(short, long, default_value = "10")]
        creatures: usize,

        /// Starting seed (increments for each simulation)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Iterations before a simulation is abandoned (default: 10000)
        #[arg(short, long, default_value = "10000")]
        max_iterations: u32,

        /// Parallel threads (default: CPU count)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Output format: text, json, or csv
        #[arg(short, long, default_value = "text")]
        format: cli::BatchFormat,

        /// Show progress bar
        #[arg(short, long)]
        progress: bool,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing();

    let result = match args.command {
        Commands::Run {
            creatures,
            seed,
            max_iterations,
            format,
            quiet,
        } => cli::run::execute(creatures, seed, max_iterations, format, quiet),

        Commands::Step { state, seed, init } => cli::step::execute(&state, seed, init),

        Commands::Batch {
            simulations,
            creatures,
            seed,
            max_iterations,
            threads,
            format,
            progress,
        } => cli::batch::execute(
            simulations,
            creatures,
            seed,
            max_iterations,
            threads,
            format,
            progress,
        ),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
