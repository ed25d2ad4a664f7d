// src/render/mod.rs
//! Output rendering for the command-line interface
//!
//! Turns controller results into something a person can read:
//! - A terminal chart of the hash rate history
//! - JSON and CSV exports of the history
//! - A short report for a found block

/// Terminal hash rate chart
pub mod chart;

/// History export in JSON and CSV
pub mod export;

pub use chart::render_chart;
pub use export::export_history;

use crate::miner::engine::FoundBlock;

/// Two-line report of a found block
pub fn render_block(block: &FoundBlock) -> String {
    format!("Block found! Nonce: {}\nHash: {}", block.nonce, block.digest)
}
