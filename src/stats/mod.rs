//! Statistics collection and reporting module
//!
//! This module provides the throughput side of the simulator:
//! - Periodic hash rate sampling while a session runs
//! - The sample history kept for charts and exports
//! - Final session statistics
//!
//! The main component is [`Sampler`], which runs next to the hashing
//! workers and records a [`Sample`] every interval.

/// Periodic hash rate sampler and its history
pub mod sampler;

/// Session statistics and hash rate arithmetic
pub mod statistics;

// Re-export main components
pub use sampler::{Sample, SampleHistory, Sampler};
pub use statistics::{MiningStatistics, format_rate, hash_rate};
