// src/miner/events.rs
//! Mining event stream
//!
//! Renderers subscribe to the controller's [`EventBus`] to receive samples,
//! found blocks and lifecycle notifications without polling.

use crate::miner::engine::FoundBlock;
use crate::stats::sampler::Sample;
use crate::stats::statistics::MiningStatistics;
use crossbeam_channel::{Receiver, Sender};
use std::sync::{Mutex, PoisonError};

/// Notification published by the engine, the sampler or the controller
#[derive(Debug, Clone)]
pub enum MiningEvent {
    /// A session started
    Started {
        /// Payload being mined
        payload: String,
        /// Required leading zeros
        difficulty: u32,
        /// Number of hashing workers
        workers: usize,
    },
    /// The sampler appended a sample
    Sample(Sample),
    /// A worker found a digest meeting the target
    BlockFound(FoundBlock),
    /// A worker exhausted the nonce space
    Exhausted {
        /// Attempts made before exhaustion
        attempts: u64,
    },
    /// The controller finalized the session
    Stopped(MiningStatistics),
}

/// Fan-out of [`MiningEvent`]s to any number of subscribers
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Mutex<Vec<Sender<MiningEvent>>>,
}

impl EventBus {
    /// Creates a bus without subscribers
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new unbounded subscriber
    pub fn subscribe(&self) -> Receiver<MiningEvent> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    /// Sends `event` to every live subscriber, dropping disconnected ones
    pub fn publish(&self, event: MiningEvent) {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publishes_to_all_and_prunes_dropped() {
        let bus = EventBus::new();
        let a = bus.subscribe();
        let b = bus.subscribe();
        drop(b);

        bus.publish(MiningEvent::Exhausted { attempts: 7 });

        assert!(matches!(a.try_recv(), Ok(MiningEvent::Exhausted { attempts: 7 })));
        assert_eq!(bus.subscribers.lock().unwrap().len(), 1);
    }
}
