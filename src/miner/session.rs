// src/miner/session.rs
//! Shared state of one mining attempt
//!
//! A [`MiningSession`] is created by the controller on every start and shared
//! through an `Arc` between the engine workers (sole writers of the counters)
//! and the sampler/controller (readers). Every shared field is atomic.

use crate::miner::hash;
use crate::stats::statistics::MiningStatistics;
use crate::utils::error::MinerError;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// One mining attempt, from start until stop, find or counter exhaustion
#[derive(Debug)]
pub struct MiningSession {
    /// Block payload the nonce is appended to
    payload: String,
    /// Required number of leading `'0'` hex characters
    difficulty: u32,
    /// Last nonce handed out; the first attempt uses 1
    counter: AtomicU64,
    /// Number of digest evaluations so far
    hashes_computed: AtomicU64,
    /// Successful finds, 0 or 1
    found_blocks: AtomicU64,
    /// Single source of truth for whether workers and sampler continue
    running: AtomicBool,
    started_at: Instant,
    /// Set exactly once, when the session stops for any reason
    ended_at: OnceLock<Instant>,
}

impl MiningSession {
    /// Creates a running session with zeroed counters
    ///
    /// # Errors
    /// `InvalidDifficulty` if `difficulty` exceeds the digest length
    pub fn new(payload: impl Into<String>, difficulty: u32) -> Result<Self, MinerError> {
        Ok(Self {
            payload: payload.into(),
            difficulty: hash::validate_difficulty(difficulty)?,
            counter: AtomicU64::new(0),
            hashes_computed: AtomicU64::new(0),
            found_blocks: AtomicU64::new(0),
            running: AtomicBool::new(true),
            started_at: Instant::now(),
            ended_at: OnceLock::new(),
        })
    }

    #[cfg(test)]
    pub(crate) fn with_counter(self, counter: u64) -> Self {
        self.counter.store(counter, Ordering::SeqCst);
        self
    }

    /// Block payload
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Difficulty fixed at creation
    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    /// Whether workers and sampler should keep going
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Hands out the next nonce (pre-increment), or `None` at `u64::MAX`
    ///
    /// The counter never wraps: wrapping would repeat attempts already made.
    pub fn next_nonce(&self) -> Option<u64> {
        self.counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |c| c.checked_add(1))
            .ok()
            .map(|previous| previous + 1)
    }

    /// Counts one digest evaluation
    pub fn record_hash(&self) {
        self.hashes_computed.fetch_add(1, Ordering::Relaxed);
    }

    /// Claims a valid digest for this session
    ///
    /// Only the first caller that observes the session still running wins.
    /// The winner records its block and then calls [`halt`](Self::halt), so
    /// anyone seeing the session stopped also sees the find.
    pub fn claim_find(&self) -> bool {
        self.is_running()
            && self
                .found_blocks
                .compare_exchange(0, 1, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
    }

    /// Stops the session; returns whether it was still running
    pub fn halt(&self) -> bool {
        let was_running = self.running.swap(false, Ordering::SeqCst);
        self.mark_ended();
        was_running
    }

    fn mark_ended(&self) {
        let _ = self.ended_at.set(Instant::now());
    }

    /// Time since start, frozen once the session has ended
    pub fn elapsed(&self) -> Duration {
        let end = self.ended_at.get().copied().unwrap_or_else(Instant::now);
        end.saturating_duration_since(self.started_at)
    }

    /// Last nonce handed out
    pub fn counter(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }

    /// Digest evaluations so far
    pub fn hashes_computed(&self) -> u64 {
        self.hashes_computed.load(Ordering::Relaxed)
    }

    /// Successful finds so far
    pub fn found_blocks(&self) -> u64 {
        self.found_blocks.load(Ordering::SeqCst)
    }

    /// Snapshot of the session's statistics
    pub fn statistics(&self) -> MiningStatistics {
        MiningStatistics::new(
            self.elapsed(),
            self.hashes_computed(),
            self.found_blocks(),
            self.counter(),
        )
    }
}
