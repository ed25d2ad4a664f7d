// src/miner/controller.rs
//! Mining session lifecycle
//!
//! The [`MiningController`] owns the hashing workers and the sampler of the
//! current session as joinable threads. `stop` returns only after every one
//! of them has been joined.

use crate::config::Config;
use crate::miner::engine::{FoundBlock, FoundSlot, SearchEngine, SearchOutcome};
use crate::miner::events::{EventBus, MiningEvent};
use crate::miner::session::MiningSession;
use crate::stats::sampler::{Sample, SampleHistory, Sampler};
use crate::stats::statistics::{MiningStatistics, format_rate};
use crate::types::SessionState;
use crate::utils::error::MinerError;
use arc_swap::ArcSwap;
use crossbeam_channel::{Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Threads and state of the session currently owned by the controller
struct ActiveSession {
    session: Arc<MiningSession>,
    workers: Vec<JoinHandle<SearchOutcome>>,
    sampler: Option<JoinHandle<()>>,
    /// Dropping this wakes the sampler
    shutdown: Sender<()>,
}

/// Starts, stops and inspects mining sessions
///
/// State machine: `Idle -> Running` on [`start`](Self::start),
/// `Running -> Idle` on [`stop`](Self::stop), on a find, or on nonce
/// exhaustion. A session that ended on its own keeps its threads until the
/// next `stop` or `start` reaps them.
pub struct MiningController {
    config: Config,
    active: Mutex<Option<ActiveSession>>,
    history: Arc<SampleHistory>,
    last_block: FoundSlot,
    last_stats: Mutex<MiningStatistics>,
    events: Arc<EventBus>,
}

impl MiningController {
    /// Creates an idle controller
    ///
    /// # Errors
    /// Returns the validation error of `config`
    pub fn new(config: Config) -> Result<Self, MinerError> {
        config.validate()?;
        Ok(MiningController {
            config,
            active: Mutex::new(None),
            history: Arc::new(SampleHistory::new()),
            last_block: Arc::new(ArcSwap::from_pointee(None)),
            last_stats: Mutex::new(MiningStatistics::default()),
            events: Arc::new(EventBus::new()),
        })
    }

    /// Configuration sessions are started with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Receives every event published from now on
    pub fn subscribe(&self) -> Receiver<MiningEvent> {
        self.events.subscribe()
    }

    fn lock_active(&self) -> MutexGuard<'_, Option<ActiveSession>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_stats(&self) -> MutexGuard<'_, MiningStatistics> {
        self.last_stats.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts mining `payload` with a fresh session
    ///
    /// # Errors
    /// - `AlreadyRunning` if a session is still hashing
    /// - `ThreadError` if a thread could not be spawned; anything already
    ///   started is stopped again
    pub fn start(&self, payload: impl Into<String>) -> Result<(), MinerError> {
        self.start_with(payload, |session| session)
    }

    /// Starts a session after passing it through `prepare`
    fn start_with<F>(&self, payload: impl Into<String>, prepare: F) -> Result<(), MinerError>
    where
        F: FnOnce(MiningSession) -> MiningSession,
    {
        let mut active = self.lock_active();
        if active.as_ref().is_some_and(|a| a.session.is_running()) {
            return Err(MinerError::AlreadyRunning);
        }
        if let Some(finished) = active.take() {
            if let Err(e) = self.finalize(finished) {
                log::warn!("Previous session ended with an error: {}", e);
            }
        }

        let payload = payload.into();
        let session = Arc::new(prepare(MiningSession::new(
            payload.clone(),
            self.config.difficulty,
        )?));
        let workers = self.config.workers();
        self.history.clear();
        self.last_block.store(Arc::new(None));

        log::info!(
            "Starting mining with difficulty {} on {} worker(s)...",
            session.difficulty(),
            workers
        );
        self.events.publish(MiningEvent::Started {
            payload,
            difficulty: session.difficulty(),
            workers,
        });

        let (shutdown, shutdown_rx) = crossbeam_channel::bounded(0);
        let mut starting = ActiveSession {
            session: session.clone(),
            workers: Vec::with_capacity(workers),
            sampler: None,
            shutdown,
        };

        let sampler = Sampler::new(
            session.clone(),
            self.history.clone(),
            self.config.sample_interval(),
            self.events.clone(),
        )
        .spawn(shutdown_rx);
        let spawned = sampler.and_then(|handle| {
            starting.sampler = Some(handle);
            for id in 0..workers {
                let engine = SearchEngine::new(
                    id,
                    session.clone(),
                    self.history.clone(),
                    self.events.clone(),
                    self.last_block.clone(),
                );
                starting.workers.push(engine.spawn()?);
            }
            Ok(())
        });

        if let Err(e) = spawned {
            let _ = self.finalize(starting);
            return Err(e);
        }

        *active = Some(starting);
        Ok(())
    }

    /// Stops mining and returns the final statistics
    ///
    /// Blocks until the sampler and every worker have been joined. With no
    /// session to stop this is a no-op returning the statistics of the last
    /// session (all zero if none ever ran), so repeated calls never double
    /// count.
    ///
    /// # Errors
    /// The first worker failure (`CounterOverflow`, `ThreadError`); the
    /// session is finalized regardless.
    pub fn stop(&self) -> Result<MiningStatistics, MinerError> {
        let finished = self.lock_active().take();
        match finished {
            Some(active) => self.finalize(active),
            None => Ok(self.lock_stats().clone()),
        }
    }

    fn finalize(&self, active: ActiveSession) -> Result<MiningStatistics, MinerError> {
        let ActiveSession {
            session,
            workers,
            sampler,
            shutdown,
        } = active;

        self.history.halt(&session);
        drop(shutdown);

        let mut failure = None;
        if let Some(sampler) = sampler {
            if sampler.join().is_err() {
                failure = Some(MinerError::ThreadError("Sampler thread panicked".into()));
            }
        }
        for worker in workers {
            match worker.join() {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => {
                    failure.get_or_insert(e);
                }
                Err(_) => {
                    failure.get_or_insert(MinerError::ThreadError("Mining worker panicked".into()));
                }
            }
        }

        let stats = session.statistics();
        log::info!(
            "Mining stopped after {:.2}s: {} hashes, {} average, {} block(s) found",
            stats.elapsed_secs,
            stats.hashes_computed,
            format_rate(stats.average_rate),
            stats.found_blocks
        );
        *self.lock_stats() = stats.clone();
        self.events.publish(MiningEvent::Stopped(stats.clone()));

        match failure {
            Some(e) => Err(e),
            None => Ok(stats),
        }
    }

    /// Live statistics while running, final statistics of the last session otherwise
    pub fn statistics(&self) -> MiningStatistics {
        match self.lock_active().as_ref() {
            Some(active) => active.session.statistics(),
            None => self.lock_stats().clone(),
        }
    }

    /// Samples of the current or last session, oldest first
    pub fn history(&self) -> Vec<Sample> {
        self.history.snapshot()
    }

    /// Block found by the current or last session
    pub fn last_block(&self) -> Option<FoundBlock> {
        (**self.last_block.load()).clone()
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        if self.is_running() {
            SessionState::Running
        } else {
            SessionState::Idle
        }
    }

    /// Whether a session is hashing
    pub fn is_running(&self) -> bool {
        self.lock_active()
            .as_ref()
            .is_some_and(|active| active.session.is_running())
    }

    /// Waits until the running session finds a block or ends
    ///
    /// # Returns
    /// - `Some(block)` if the session found a block (possibly before the call)
    /// - `None` on timeout, cancellation or exhaustion
    pub fn wait_for_block(&self, timeout: Duration) -> Option<FoundBlock> {
        let events = self.subscribe();
        if !self.is_running() {
            return self.last_block();
        }

        // a timeout past the end of the clock waits without a deadline
        let deadline = Instant::now().checked_add(timeout);
        loop {
            let event = match deadline {
                Some(deadline) => events.recv_deadline(deadline).ok(),
                None => events.recv().ok(),
            };
            match event {
                Some(MiningEvent::BlockFound(block)) => return Some(block),
                Some(MiningEvent::Exhausted { .. }) | Some(MiningEvent::Stopped(_)) => {
                    return self.last_block();
                }
                Some(_) => {}
                None => return None,
            }
        }
    }
}

impl Drop for MiningController {
    fn drop(&mut self) {
        if let Some(active) = self.lock_active().take() {
            if let Err(e) = self.finalize(active) {
                log::warn!("Session ended with an error on shutdown: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(difficulty: u32, sample_interval_ms: u64) -> MiningController {
        MiningController::new(Config {
            difficulty,
            sample_interval_ms,
            ..Config::default()
        })
        .unwrap()
    }

    #[test]
    fn starts_idle_with_zero_statistics() {
        let miner = controller(4, 1000);
        assert_eq!(miner.state(), SessionState::Idle);
        assert_eq!(miner.statistics(), MiningStatistics::default());
        assert!(miner.history().is_empty());
        assert!(miner.last_block().is_none());
    }

    #[test]
    fn stop_without_session_is_a_noop() {
        let miner = controller(4, 1000);
        let stats = miner.stop().unwrap();
        assert_eq!(stats.hashes_computed, 0);
        assert_eq!(stats.average_rate, 0.0);
    }

    #[test]
    fn rejects_invalid_config() {
        let result = MiningController::new(Config {
            difficulty: 99,
            ..Config::default()
        });
        assert!(matches!(result, Err(MinerError::InvalidDifficulty(99))));
    }

    #[test]
    fn zero_difficulty_finds_at_first_nonce() {
        let miner = controller(0, 1000);
        miner.start("anything").unwrap();
        let block = miner.wait_for_block(Duration::from_secs(10)).unwrap();
        assert_eq!(block.nonce, 1);

        let stats = miner.stop().unwrap();
        assert_eq!(stats.found_blocks, 1);
        assert_eq!(stats.hashes_computed, 1);
        assert_eq!(stats.last_nonce, 1);
    }

    #[test]
    fn finished_session_is_idle_and_restartable() {
        let miner = controller(2, 1000);
        miner.start("test").unwrap();
        let block = miner.wait_for_block(Duration::from_secs(10)).unwrap();
        assert_eq!(block.nonce, 304);
        assert_eq!(miner.state(), SessionState::Idle);

        miner.start("Block data").unwrap();
        let block = miner.wait_for_block(Duration::from_secs(10)).unwrap();
        assert_eq!(block.nonce, 37);
        let stats = miner.stop().unwrap();
        assert_eq!(stats.hashes_computed, 37);
    }

    #[test]
    fn unbounded_wait_returns_the_find() {
        let miner = controller(0, 1000);
        miner.start("forever").unwrap();
        let block = miner.wait_for_block(Duration::MAX).unwrap();
        assert_eq!(block.nonce, 1);
        miner.stop().unwrap();
    }

    #[test]
    fn overflow_still_finalizes_the_session() {
        let miner = controller(64, 1000);
        miner
            .start_with("x", |session| session.with_counter(u64::MAX - 2))
            .unwrap();
        assert!(miner.wait_for_block(Duration::from_secs(10)).is_none());
        assert_eq!(miner.state(), SessionState::Idle);

        assert!(matches!(miner.stop(), Err(MinerError::CounterOverflow(2))));
        let cached = miner.statistics();
        assert_eq!(cached.hashes_computed, 2);
        assert_eq!(cached.last_nonce, u64::MAX);
        assert_eq!(cached.found_blocks, 0);

        let again = miner.stop().unwrap();
        assert_eq!(again, cached);
    }

    #[test]
    fn events_follow_the_lifecycle() {
        let miner = controller(0, 1000);
        let events = miner.subscribe();
        miner.start("x").unwrap();
        miner.wait_for_block(Duration::from_secs(10)).unwrap();
        miner.stop().unwrap();

        let received: Vec<_> = events.try_iter().collect();
        assert!(matches!(received.first(), Some(MiningEvent::Started { difficulty: 0, .. })));
        assert!(received.iter().any(|e| matches!(e, MiningEvent::BlockFound(b) if b.nonce == 1)));
        assert!(matches!(received.last(), Some(MiningEvent::Stopped(s)) if s.found_blocks == 1));
    }
}
