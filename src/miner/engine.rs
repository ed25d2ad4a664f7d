// src/miner/engine.rs
//! Proof-of-work search loop
//!
//! A [`SearchEngine`] scans increasing nonces for one session until a digest
//! meets the target, the session is stopped, or the nonce space runs out.
//! Several engines may share one session; they then draw nonces from the
//! same atomic counter so no nonce is hashed twice.

use crate::miner::events::{EventBus, MiningEvent};
use crate::miner::hash;
use crate::miner::session::MiningSession;
use crate::stats::sampler::SampleHistory;
use crate::utils::error::MinerError;
use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// A digest that met the session's target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FoundBlock {
    /// Payload the nonce was appended to
    pub payload: String,
    /// Winning nonce
    pub nonce: u64,
    /// Lowercase hex SHA-256 digest
    pub digest: String,
    /// Worker that found it
    pub worker: usize,
    /// Wall-clock time of the find
    pub found_at: DateTime<Utc>,
}

/// Result of one worker's scan: the find, or `None` when cancelled
pub type SearchOutcome = Result<Option<FoundBlock>, MinerError>;

/// Slot holding the most recent find, shared with the controller
pub type FoundSlot = Arc<ArcSwap<Option<FoundBlock>>>;

/// Hashing worker bound to one session
pub struct SearchEngine {
    /// Worker index, for logs and reports
    id: usize,
    /// `difficulty` repetitions of `'0'`
    target: String,
    session: Arc<MiningSession>,
    /// Halting goes through the history so the sampler sees a consistent stop
    history: Arc<SampleHistory>,
    events: Arc<EventBus>,
    found: FoundSlot,
}

impl SearchEngine {
    /// Creates a worker for `session`
    ///
    /// # Arguments
    /// * `id` - Worker index
    /// * `session` - Session whose counters this worker advances
    /// * `history` - Sample history of the session, locked when halting
    /// * `events` - Bus receiving the `BlockFound`/`Exhausted` events
    /// * `found` - Slot updated with the winning block
    pub fn new(
        id: usize,
        session: Arc<MiningSession>,
        history: Arc<SampleHistory>,
        events: Arc<EventBus>,
        found: FoundSlot,
    ) -> Self {
        SearchEngine {
            id,
            target: hash::target_prefix(session.difficulty()),
            session,
            history,
            events,
            found,
        }
    }

    /// Scans nonces until a find, cancellation or exhaustion
    ///
    /// Cancellation is checked once per hash, so a stop is observed after at
    /// most one more digest evaluation.
    ///
    /// # Returns
    /// - `Ok(Some(block))` if this worker claimed a valid digest
    /// - `Ok(None)` if the session stopped first
    /// - `Err(CounterOverflow)` if the nonce counter reached `u64::MAX`
    pub fn mine(&self) -> SearchOutcome {
        let session = &self.session;
        let payload = session.payload();

        while session.is_running() {
            let Some(nonce) = session.next_nonce() else {
                let attempts = session.hashes_computed();
                self.history.halt(session);
                log::error!("Worker {} exhausted the nonce space", self.id);
                self.events.publish(MiningEvent::Exhausted { attempts });
                return Err(MinerError::CounterOverflow(attempts));
            };
            session.record_hash();

            let digest = hash::calculate_hash(payload, nonce);
            if digest.starts_with(&self.target) && session.claim_find() {
                let block = FoundBlock {
                    payload: payload.to_owned(),
                    nonce,
                    digest,
                    worker: self.id,
                    found_at: Utc::now(),
                };
                log::info!("Block found! Nonce: {}", block.nonce);
                log::info!("Hash: {}", block.digest);
                self.found.store(Arc::new(Some(block.clone())));
                self.history.halt(session);
                self.events.publish(MiningEvent::BlockFound(block.clone()));
                return Ok(Some(block));
            }
        }

        Ok(None)
    }

    /// Runs [`mine`](Self::mine) on a dedicated named thread
    pub fn spawn(self) -> Result<JoinHandle<SearchOutcome>, MinerError> {
        thread::Builder::new()
            .name(format!("miner-{}", self.id))
            .spawn(move || {
                log::debug!("Mining worker {} started", self.id);
                let outcome = self.mine();
                log::debug!("Mining worker {} stopped", self.id);
                outcome
            })
            .map_err(|e| MinerError::ThreadError(format!("Failed to spawn worker: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn engine(session: MiningSession) -> (SearchEngine, Arc<MiningSession>, FoundSlot) {
        let (engine, session, found, _) = engine_with_history(session);
        (engine, session, found)
    }

    fn engine_with_history(
        session: MiningSession,
    ) -> (SearchEngine, Arc<MiningSession>, FoundSlot, Arc<SampleHistory>) {
        let session = Arc::new(session);
        let history = Arc::new(SampleHistory::new());
        let found: FoundSlot = Arc::new(ArcSwap::from_pointee(None));
        let engine = SearchEngine::new(
            0,
            session.clone(),
            history.clone(),
            Arc::new(EventBus::new()),
            found.clone(),
        );
        (engine, session, found, history)
    }

    #[test]
    fn zero_difficulty_succeeds_on_first_attempt() {
        let (engine, session, _) = engine(MiningSession::new("anything", 0).unwrap());
        let block = engine.mine().unwrap().unwrap();
        assert_eq!(block.nonce, 1);
        assert_eq!(block.digest, hash::calculate_hash("anything", 1));
        assert_eq!(session.hashes_computed(), 1);
        assert_eq!(session.found_blocks(), 1);
        assert!(!session.is_running());
    }

    #[test]
    fn finds_first_matching_nonce() {
        let (engine, session, found) = engine(MiningSession::new("Block data", 3).unwrap());
        let block = engine.mine().unwrap().unwrap();
        assert_eq!(block.nonce, 1337);
        assert!(block.digest.starts_with("000"));
        assert_eq!(session.counter(), 1337);
        assert_eq!(session.hashes_computed(), 1337);
        assert_eq!(**found.load(), Some(block));
    }

    #[test]
    fn find_closes_the_sample_history() {
        let (engine, session, _, history) =
            engine_with_history(MiningSession::new("Block data", 2).unwrap());
        engine.mine().unwrap().unwrap();

        let recorded = history.record_while_running(&session, |_| unreachable!());
        assert!(recorded.is_none());
        assert!(history.is_empty());
    }

    #[test]
    fn stopped_session_yields_nothing() {
        let (engine, session, _) = engine(MiningSession::new("x", 64).unwrap());
        session.halt();
        assert!(engine.mine().unwrap().is_none());
        assert_eq!(session.hashes_computed(), 0);
    }

    #[test]
    fn cancellation_from_another_thread() {
        let (engine, session, _) = engine(MiningSession::new("x", 64).unwrap());
        let handle = engine.spawn().unwrap();
        std::thread::sleep(Duration::from_millis(50));
        session.halt();
        assert!(handle.join().unwrap().unwrap().is_none());
        assert!(session.hashes_computed() > 0);
    }

    #[test]
    fn exhaustion_fails_instead_of_wrapping() {
        let (engine, session, _) =
            engine(MiningSession::new("x", 64).unwrap().with_counter(u64::MAX - 2));
        assert!(matches!(engine.mine(), Err(MinerError::CounterOverflow(2))));
        assert_eq!(session.counter(), u64::MAX);
        assert!(!session.is_running());
    }
}
