// src/main.rs
use clap::Parser;
use crossbeam_channel::{Receiver, select};
use pow_sim_rs::cli::commands::{
    BenchmarkOptions, ConfigOptions, InteractiveOptions, StartOptions, VerifyOptions,
    apply_overrides,
};
use pow_sim_rs::cli::{self, Action, Menu};
use pow_sim_rs::miner::hash::{self, MAX_DIFFICULTY};
use pow_sim_rs::render::{export_history, render_block, render_chart};
use pow_sim_rs::stats::format_rate;
use pow_sim_rs::utils::{self, init_bench_logging};
use pow_sim_rs::{Config, MinerError, MiningController, MiningEvent, config};
use std::io;
use std::thread;
use std::time::Duration;

const CHART_WIDTH: usize = 60;
const CHART_HEIGHT: usize = 12;

/// Main entry point for the simulator
///
/// # Returns
/// - `Ok(())` on successful execution
/// - `Err(MinerError)` if any operation fails
fn main() -> Result<(), MinerError> {
    let cli = cli::Commands::parse();

    match cli.action {
        Action::Start(opts) => start_mining(opts),
        Action::Interactive(opts) => run_interactive(opts),
        Action::Benchmark(opts) => run_benchmark(opts),
        Action::Verify(opts) => verify(opts),
        Action::Config(opts) => generate_config(opts),
    }
}

/// Mines one block until it is found, Enter is pressed, or the duration elapses
///
/// # Operations
/// 1. Initializes logging
/// 2. Loads configuration and applies CLI overrides
/// 3. Starts the session and waits for the first stop condition
/// 4. Stops, prints statistics, and optionally renders or exports the history
fn start_mining(opts: StartOptions) -> Result<(), MinerError> {
    utils::init_logging();

    let mut config = config::load_or_default(opts.config.as_deref())?;
    apply_overrides(&mut config, opts.difficulty, opts.workers);
    let controller = MiningController::new(config)?;

    let payload = cli::resolve_payload(
        opts.payload.as_deref().unwrap_or_default(),
        controller.config(),
    );
    let events = controller.subscribe();
    controller.start(payload)?;

    // enter_tx outlives the stdin thread so EOF on stdin is not taken as Enter
    let (enter_tx, enter) = crossbeam_channel::bounded(1);
    let watcher = enter_tx.clone();
    thread::Builder::new()
        .name("stdin".into())
        .spawn(move || {
            let mut line = String::new();
            if matches!(io::stdin().read_line(&mut line), Ok(n) if n > 0) {
                let _ = watcher.send(());
            }
        })?;
    let deadline = match opts.duration {
        Some(secs) => crossbeam_channel::after(Duration::from_secs(secs)),
        None => crossbeam_channel::never(),
    };

    println!("Press Enter to stop mining...");
    wait_for_stop(&events, &enter, &deadline);
    drop(enter_tx);

    let stats = controller.stop()?;
    println!("\n{}", stats);

    let history = controller.history();
    if opts.chart {
        println!("\n{}", render_chart(&history, CHART_WIDTH, CHART_HEIGHT));
    }
    if let Some(path) = opts.export {
        export_history(&history, &path, opts.format)?;
    }
    Ok(())
}

/// Blocks until a block is found, the search ends, Enter is pressed, or the deadline passes
fn wait_for_stop(
    events: &Receiver<MiningEvent>,
    enter: &Receiver<()>,
    deadline: &Receiver<std::time::Instant>,
) {
    loop {
        select! {
            recv(events) -> event => match event {
                Ok(MiningEvent::BlockFound(block)) => {
                    println!("\n{}", render_block(&block));
                    return;
                }
                Ok(MiningEvent::Exhausted { .. }) | Err(_) => return,
                Ok(_) => {}
            },
            recv(enter) -> _ => return,
            recv(deadline) -> _ => return,
        }
    }
}

/// Runs the menu-driven session on stdin/stdout
fn run_interactive(opts: InteractiveOptions) -> Result<(), MinerError> {
    utils::init_logging();

    let mut config = config::load_or_default(opts.config.as_deref())?;
    apply_overrides(&mut config, opts.difficulty, opts.workers);
    let controller = MiningController::new(config)?;

    let stdin = io::stdin();
    Menu::new(&controller, stdin.lock(), io::stdout()).run()
}

/// Measures hashing throughput against a target no digest can meet
///
/// # Operations
/// 1. Initializes benchmark-specific logging
/// 2. Starts a session with the maximum difficulty on the requested threads
/// 3. Lets it run for the requested duration
/// 4. Reports total hashes and average hash rate
fn run_benchmark(opts: BenchmarkOptions) -> Result<(), MinerError> {
    init_bench_logging();

    let controller = MiningController::new(Config {
        difficulty: MAX_DIFFICULTY,
        worker_threads: opts.threads,
        ..Config::default()
    })?;

    log::info!(
        "Starting benchmark on {} thread(s) for {} seconds",
        controller.config().workers(),
        opts.duration
    );
    controller.start(cli::random_payload())?;
    thread::sleep(Duration::from_secs(opts.duration));
    let stats = controller.stop()?;

    log::info!("Benchmark results:");
    log::info!("Total hashes: {}", stats.hashes_computed);
    log::info!("Average hashrate: {}", format_rate(stats.average_rate));
    log::logger().flush(); // Ensure final results appear
    println!("{}", render_chart(&controller.history(), CHART_WIDTH, CHART_HEIGHT));
    Ok(())
}

/// Prints the digest of one payload/nonce pair and whether it meets the difficulty
fn verify(opts: VerifyOptions) -> Result<(), MinerError> {
    hash::validate_difficulty(opts.difficulty)?;
    let digest = hash::calculate_hash(&opts.payload, opts.nonce);
    let meets = hash::meets_difficulty(&digest, opts.difficulty);

    println!("Hash: {}", digest);
    println!(
        "Meets difficulty {}: {}",
        opts.difficulty,
        if meets { "yes" } else { "no" }
    );

    if let Some(expected) = opts.expect {
        if hex::decode(&digest)? != hex::decode(expected.trim())? {
            return Err(MinerError::InputError(format!(
                "digest mismatch: expected {}, computed {}",
                expected.trim(),
                digest
            )));
        }
        println!("Matches expected digest");
    }
    Ok(())
}

/// Generates configuration template file
fn generate_config(opts: ConfigOptions) -> Result<(), MinerError> {
    let config = config::generate_template();
    std::fs::write(&opts.output, config)?;
    println!("Configuration template written to {}", opts.output.display());
    Ok(())
}
