// src/miner/mod.rs
//! Core mining functionality
//!
//! This module contains all components related to the mining process:
//! - SHA-256 digest and difficulty checks
//! - Shared per-session state
//! - The proof-of-work search loop
//! - Session lifecycle control and event fan-out

/// Session lifecycle: start, stop, statistics and history
pub mod controller;

/// Proof-of-work search loop run by each hashing worker
pub mod engine;

/// Event stream consumed by renderers
pub mod events;

/// Digest computation and target checks
pub mod hash;

/// Shared atomic state of one mining attempt
pub mod session;

// Re-export main components for cleaner imports
pub use self::controller::MiningController;
pub use self::engine::{FoundBlock, SearchEngine};
pub use self::events::{EventBus, MiningEvent};
pub use self::session::MiningSession;
