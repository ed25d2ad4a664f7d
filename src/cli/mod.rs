// src/cli/mod.rs
//! Command-line interface
//!
//! Clap command definitions and the interactive menu. Both only drive a
//! [`MiningController`](crate::miner::MiningController) and render results.

/// Clap command and option definitions
pub mod commands;

/// Interactive menu loop
pub mod menu;

pub use commands::{Action, Commands};
pub use menu::Menu;

use crate::config::Config;
use rand::Rng;

/// Random default payload, `Block #NNNN` with `NNNN` in `1000..=9999`
pub fn random_payload() -> String {
    format!("Block #{}", rand::thread_rng().gen_range(1000..=9999))
}

/// Payload for user input: the input itself, else the configured default,
/// else a random block name
pub fn resolve_payload(input: &str, config: &Config) -> String {
    if !input.trim().is_empty() {
        return input.to_string();
    }
    config
        .default_payload
        .clone()
        .unwrap_or_else(random_payload)
}
