//! Proof-of-work mining simulator
//!
//! This crate repeatedly hashes a block payload with an incrementing nonce
//! until the SHA-256 digest starts with the required number of `'0'` hex
//! characters, while sampling the hash rate. It provides:
//! - A cancellable search loop on one or more worker threads
//! - A periodic throughput sampler with an inspectable history
//! - A controller with an explicit start/stop lifecycle
//! - Terminal rendering, history export and an interactive menu

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Miner core: digest, session state, search loop and lifecycle
pub mod miner;

/// Hash rate sampling and session statistics
pub mod stats;

/// Chart, report and export rendering
pub mod render;

/// Utility functions and error handling
pub mod utils;

/// Command-line interface definitions
pub mod cli;

/// Configuration management
pub mod config;

/// Shared type definitions
pub mod types;

// Core exports
pub use cli::Commands;
pub use config::Config;
pub use miner::{FoundBlock, MiningController, MiningEvent, MiningSession, SearchEngine};
pub use stats::{MiningStatistics, Sample, SampleHistory, Sampler};
pub use types::{ExportFormat, SessionState};
pub use utils::{MinerError, init_logging};
