// src/utils/logging.rs
//! Logging setup for the simulator
//!
//! Everything the simulator reports while mining goes through `log`:
//! the sampler's `Hash rate: ... | Hashes: ... | Blocks: ...` progress line
//! every interval, the `Block found! Nonce: ...` and `Hash: ...` lines of a
//! find, and the controller's start and stop summaries. This module routes
//! those records to stdout through `env_logger`.

use env_logger::{Builder, Target};
use log::LevelFilter;
use std::env;

/// Initializes logging for the `start` and `interactive` commands
///
/// At the default Info level the progress lines, the find report and the
/// session summary are shown; `RUST_LOG` overrides the level.
pub fn init_logging() {
    init_with_default(LevelFilter::Info);
}

/// Initializes logging for the `benchmark` command
///
/// Defaults to Debug so each `Mining worker N started`/`stopped` line is
/// visible next to the throughput samples.
pub fn init_bench_logging() {
    init_with_default(LevelFilter::Debug);
}

fn init_with_default(level: LevelFilter) {
    let mut builder = common_log_config();

    if env::var("RUST_LOG").is_err() {
        builder.filter_level(level);
    } else {
        builder.parse_env("RUST_LOG");
    }

    // A second initialization (tests, repeated menu sessions) is harmless.
    let _ = builder.try_init();
}

/// Builder writing `[timestamp level module:line] message` lines to stdout
///
/// The module path tells a sampler line (`stats::sampler`) from a worker
/// line (`miner::engine`) when several threads log at once.
fn common_log_config() -> Builder {
    let mut builder = Builder::new();

    builder
        .format(|buf, record| {
            use std::io::Write;
            let ts = buf.timestamp_seconds();
            let level = record.level();
            let module = record.module_path().unwrap_or_default();
            let line = record.line().unwrap_or(0);

            writeln!(
                buf,
                "[{} {} {}:{}] {}",
                ts,
                level,
                module,
                line,
                record.args()
            )
        })
        .target(Target::Stdout);

    builder
}
