// src/stats/sampler.rs
//! Periodic hash rate sampling
//!
//! A [`Sampler`] thread wakes once per interval and appends a [`Sample`] to
//! the shared [`SampleHistory`] while its session is running. Halting a
//! session through [`SampleHistory::halt`] takes the history lock, so no
//! sample can land after the halt returns.

use crate::miner::events::{EventBus, MiningEvent};
use crate::miner::session::MiningSession;
use crate::stats::statistics::{format_rate, hash_rate};
use crate::utils::error::MinerError;
use chrono::{DateTime, TimeDelta, Utc};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// One throughput measurement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    /// Wall-clock time of the measurement
    pub timestamp: DateTime<Utc>,
    /// Seconds since the session started
    pub elapsed_secs: f64,
    /// Hashes computed at measurement time
    pub hashes: u64,
    /// Average hashes per second since the session started
    pub hash_rate: f64,
}

/// Append-only, chronologically ordered list of samples
#[derive(Debug, Default)]
pub struct SampleHistory {
    samples: Mutex<Vec<Sample>>,
}

impl SampleHistory {
    /// Creates an empty history
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> MutexGuard<'_, Vec<Sample>> {
        self.samples.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends a sample
    pub fn push(&self, sample: Sample) {
        self.guard().push(sample);
    }

    /// Appends the sample built by `build` if `session` is still running
    ///
    /// The running check and the append happen under the history lock, so
    /// they cannot interleave with [`halt`](Self::halt). `build` receives
    /// the previous sample and may decline by returning `None`.
    pub fn record_while_running<F>(&self, session: &MiningSession, build: F) -> Option<Sample>
    where
        F: FnOnce(Option<&Sample>) -> Option<Sample>,
    {
        let mut samples = self.guard();
        if !session.is_running() {
            return None;
        }
        let sample = build(samples.last())?;
        samples.push(sample.clone());
        Some(sample)
    }

    /// Halts `session` under the history lock; returns whether it was running
    ///
    /// Once this returns, no further sample of `session` is appended.
    pub fn halt(&self, session: &MiningSession) -> bool {
        let _samples = self.guard();
        session.halt()
    }

    /// Copy of every sample, oldest first
    pub fn snapshot(&self) -> Vec<Sample> {
        self.guard().clone()
    }

    /// Most recent sample
    pub fn last(&self) -> Option<Sample> {
        self.guard().last().cloned()
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.guard().len()
    }

    /// Whether no sample was taken
    pub fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }

    /// Drops every sample; used when a new session starts
    pub fn clear(&self) {
        self.guard().clear();
    }
}

/// Periodically measures the hash rate of a running session
///
/// The sampler reads the very counters the engine workers mutate, through
/// the shared session. It waits on a shutdown channel between ticks, so it
/// sleeps without holding any lock and wakes as soon as the channel is
/// disconnected.
pub struct Sampler {
    session: Arc<MiningSession>,
    history: Arc<SampleHistory>,
    interval: Duration,
    events: Arc<EventBus>,
}

impl Sampler {
    /// Creates a sampler for `session` writing into `history`
    ///
    /// # Arguments
    /// * `session` - Session being mined
    /// * `history` - Destination of the samples
    /// * `interval` - Time between samples
    /// * `events` - Bus receiving a `Sample` event per measurement
    pub fn new(
        session: Arc<MiningSession>,
        history: Arc<SampleHistory>,
        interval: Duration,
        events: Arc<EventBus>,
    ) -> Self {
        Sampler {
            session,
            history,
            interval,
            events,
        }
    }

    /// Takes one measurement and appends it to the history
    ///
    /// Returns `None` without touching the history when the session is no
    /// longer running or no time has elapsed yet.
    pub fn take_sample(&self) -> Option<Sample> {
        let session = &self.session;
        let sample = self.history.record_while_running(session, |previous| {
            let elapsed_secs = session.elapsed().as_secs_f64();
            if elapsed_secs <= 0.0 {
                return None;
            }

            let hashes = session.hashes_computed();
            let mut timestamp = Utc::now();
            if let Some(previous) = previous {
                // wall clock may step backwards; keep the history strictly ordered
                timestamp = timestamp.max(previous.timestamp + TimeDelta::microseconds(1));
            }

            Some(Sample {
                timestamp,
                elapsed_secs,
                hashes,
                hash_rate: hash_rate(hashes, elapsed_secs),
            })
        })?;

        log::info!(
            "Hash rate: {} | Hashes: {} | Blocks: {}",
            format_rate(sample.hash_rate),
            sample.hashes,
            self.session.found_blocks()
        );
        self.events.publish(MiningEvent::Sample(sample.clone()));
        Some(sample)
    }

    /// Samples every interval until the session stops or `shutdown` fires
    ///
    /// Any message on `shutdown`, or its disconnection, ends the loop
    /// immediately.
    pub fn run(&self, shutdown: Receiver<()>) {
        // an interval too large to schedule means waiting for shutdown only
        let mut deadline = Instant::now().checked_add(self.interval);

        loop {
            let woke = match deadline {
                Some(deadline) => shutdown.recv_deadline(deadline),
                None => shutdown.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };
            match woke {
                Err(RecvTimeoutError::Timeout) => {}
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
            if self.take_sample().is_none() && !self.session.is_running() {
                break;
            }

            let now = Instant::now();
            deadline = deadline.and_then(|d| d.checked_add(self.interval));
            if deadline.is_some_and(|d| d <= now) {
                // fell behind, e.g. the process was suspended
                deadline = now.checked_add(self.interval);
            }
        }
    }

    /// Runs the sampler on a dedicated named thread
    pub fn spawn(self, shutdown: Receiver<()>) -> Result<JoinHandle<()>, MinerError> {
        thread::Builder::new()
            .name("sampler".into())
            .spawn(move || self.run(shutdown))
            .map_err(|e| MinerError::ThreadError(format!("Failed to spawn sampler: {}", e)))
    }
}
