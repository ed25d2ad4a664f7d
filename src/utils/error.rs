// src/utils/error.rs
use std::io;
use thiserror::Error;

/// Main error type for the mining simulator
///
/// Covers session lifecycle violations, numeric exhaustion of the search
/// space, configuration problems and the I/O performed by the CLI and
/// exporters.
#[derive(Error, Debug)]
pub enum MinerError {
    /// `start` was called while a session is still running
    #[error("Mining is already running")]
    AlreadyRunning,

    /// The nonce counter reached `u64::MAX`; continuing would repeat attempts
    #[error("Nonce counter exhausted after {0} attempts")]
    CounterOverflow(u64),

    /// Difficulty larger than the 64 hex characters of a SHA-256 digest
    #[error("Invalid difficulty {0}: must be between 0 and 64")]
    InvalidDifficulty(u32),

    /// Configuration file or parameter errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid user input or parameter errors
    #[error("Invalid input: {0}")]
    InputError(String),

    /// A worker or sampler thread failed to spawn or panicked
    #[error("Thread error: {0}")]
    ThreadError(String),

    /// Standard I/O operation errors
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Converts hex decoding errors into MinerError
///
/// Used when a digest supplied on the command line is not valid hex.
impl From<hex::FromHexError> for MinerError {
    fn from(e: hex::FromHexError) -> Self {
        MinerError::InputError(format!("Hex conversion failed: {}", e))
    }
}

/// Converts TOML parse errors into MinerError
impl From<toml::de::Error> for MinerError {
    fn from(e: toml::de::Error) -> Self {
        MinerError::ConfigError(format!("Invalid config format: {}", e))
    }
}
