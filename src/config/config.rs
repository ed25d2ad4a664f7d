// src/config/config.rs
use crate::{miner::hash, utils::error::MinerError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for the simulator
///
/// Contains everything a mining session needs besides its payload:
/// difficulty, hashing worker count and sampling period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Required number of leading '0' hex characters (default: 4)
    #[serde(default = "default_difficulty")]
    pub difficulty: u32,

    /// Number of hashing worker threads sharing one nonce counter
    /// (default: 1, 0 = one per CPU core)
    #[serde(default = "default_worker_threads")]
    pub worker_threads: usize,

    /// Milliseconds between hash rate samples (default: 1000)
    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,

    /// Payload used when none is given; a random `Block #NNNN` otherwise
    #[serde(default)]
    pub default_payload: Option<String>,
}

fn default_difficulty() -> u32 {
    4
}

fn default_worker_threads() -> usize {
    1
}

fn default_sample_interval_ms() -> u64 {
    1000
}

impl Default for Config {
    fn default() -> Self {
        Config {
            difficulty: default_difficulty(),
            worker_threads: default_worker_threads(),
            sample_interval_ms: default_sample_interval_ms(),
            default_payload: None,
        }
    }
}

impl Config {
    /// Loads configuration from a file
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file (TOML format)
    ///
    /// # Returns
    /// * `Ok(Config)` - Successfully loaded and validated configuration
    /// * `Err(MinerError)` - If file couldn't be read, parsed or validated
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, MinerError> {
        let path = path.into();
        let config_str = std::fs::read_to_string(&path).map_err(|e| {
            MinerError::ConfigError(format!(
                "Failed to read config at {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&config_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges that serde cannot express
    pub fn validate(&self) -> Result<(), MinerError> {
        hash::validate_difficulty(self.difficulty)?;
        if self.sample_interval_ms == 0 {
            return Err(MinerError::ConfigError(
                "sample_interval_ms must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Worker count with `0` resolved to the number of CPU cores
    pub fn workers(&self) -> usize {
        match self.worker_threads {
            0 => num_cpus::get(),
            n => n,
        }
    }

    /// Time between hash rate samples
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }

    /// Generates a configuration template string
    ///
    /// # Returns
    /// String containing a commented TOML configuration template
    pub fn generate_template() -> String {
        let mut template = String::new();
        template.push_str("# Proof-of-work Simulator Configuration\n\n");
        template.push_str("# Required number of leading '0' hex characters (0-64)\n");
        template.push_str("difficulty = 4\n");
        template.push_str("# Number of hashing worker threads (0 = auto-detect)\n");
        template.push_str("worker_threads = 1\n");
        template.push_str("# Milliseconds between hash rate samples\n");
        template.push_str("sample_interval_ms = 1000\n");
        template.push_str("# Payload used when none is given (random 'Block #NNNN' if unset)\n");
        template.push_str("# default_payload = \"Block data\"\n");
        template
    }
}
