// src/cli/commands.rs
use crate::config::Config;
use crate::types::ExportFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Proof-of-work mining simulator
#[derive(Parser, Debug)]
#[command(name = "pow-sim-rs")]
#[command(version, about, long_about = None)]
pub struct Commands {
    /// The action to perform
    #[command(subcommand)]
    pub action: Action,
}

/// Top-level commands for the simulator
#[derive(Subcommand, Debug)]
pub enum Action {
    /// Mine one block until found, Enter is pressed, or the duration elapses
    Start(StartOptions),

    /// Menu-driven session: start mining, show the chart, export, quit
    Interactive(InteractiveOptions),

    /// Measure raw hashing throughput against an unreachable target
    Benchmark(BenchmarkOptions),

    /// Hash one payload/nonce pair and check it against a difficulty
    Verify(VerifyOptions),

    /// Generate configuration file template
    Config(ConfigOptions),
}

/// Options for a one-shot mining session
#[derive(Parser, Debug)]
pub struct StartOptions {
    /// Path to configuration file (defaults are used when omitted)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Block payload (random `Block #NNNN` when omitted)
    #[arg(short, long)]
    pub payload: Option<String>,

    /// Required leading zeros (overrides config)
    #[arg(short, long)]
    pub difficulty: Option<u32>,

    /// Number of hashing workers (overrides config, 0 = all cores)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Stop after this many seconds if no block was found
    #[arg(short = 't', long)]
    pub duration: Option<u64>,

    /// Print the hash rate chart after stopping
    #[arg(long)]
    pub chart: bool,

    /// Export the sample history to this file after stopping
    #[arg(short, long)]
    pub export: Option<PathBuf>,

    /// Export file format
    #[arg(short, long, value_enum, default_value_t = ExportFormat::Json)]
    pub format: ExportFormat,
}

/// Options for the interactive menu
#[derive(Parser, Debug)]
pub struct InteractiveOptions {
    /// Path to configuration file (defaults are used when omitted)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Required leading zeros (overrides config)
    #[arg(short, long)]
    pub difficulty: Option<u32>,

    /// Number of hashing workers (overrides config, 0 = all cores)
    #[arg(short, long)]
    pub workers: Option<usize>,
}

/// Options for running the hashing benchmark
#[derive(Parser, Debug)]
pub struct BenchmarkOptions {
    /// Duration of benchmark in seconds
    #[arg(short, long, default_value_t = 10)]
    pub duration: u64,

    /// Number of threads to use
    #[arg(short, long, default_value_t = num_cpus::get())]
    pub threads: usize,
}

/// Options for checking a single digest
#[derive(Parser, Debug)]
pub struct VerifyOptions {
    /// Block payload
    #[arg(short, long)]
    pub payload: String,

    /// Nonce appended to the payload
    #[arg(short, long)]
    pub nonce: u64,

    /// Required leading zeros
    #[arg(short, long, default_value_t = 4)]
    pub difficulty: u32,

    /// Expected hex digest; verification fails if it differs
    #[arg(short, long)]
    pub expect: Option<String>,
}

/// Options for generating configuration files
#[derive(Parser, Debug)]
pub struct ConfigOptions {
    /// Output file path
    #[arg(short, long, default_value = "pow_sim.toml")]
    pub output: PathBuf,
}

/// Applies command-line overrides on top of a loaded configuration
pub fn apply_overrides(config: &mut Config, difficulty: Option<u32>, workers: Option<usize>) {
    if let Some(difficulty) = difficulty {
        config.difficulty = difficulty;
    }
    if let Some(workers) = workers {
        config.worker_threads = workers;
    }
}
