//! Background thread running the relay polling loop.

use std::sync::mpsc::{channel, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::OutboxRelay;
use crate::bus::Publisher;
use crate::ledger::LedgerStore;

/// Statistics from the relay thread.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RelayStats {
    pub polls: usize,
    /// Non-empty batches whose transaction committed.
    pub batches_committed: usize,
    pub events_published: usize,
    pub failed_batches: usize,
}

/// A background thread that calls `process_batch` once per tick.
///
/// The stop signal is observed between ticks, never while a batch
/// transaction is open.
///
/// ## Example
///
/// ```
/// use std::time::Duration;
/// use checkout_ledger::bus::InMemoryQueue;
/// use checkout_ledger::ledger::InMemoryLedger;
/// use checkout_ledger::relay::{OutboxRelay, OutboxRelayThread};
///
/// let relay = OutboxRelay::new(InMemoryLedger::new(), InMemoryQueue::new());
/// let handle = OutboxRelayThread::spawn(relay, Duration::from_millis(10));
///
/// let stats = handle.stop();
/// assert_eq!(stats.failed_batches, 0);
/// ```
pub struct OutboxRelayThread {
    stop_tx: Sender<()>,
    handle: Option<JoinHandle<RelayStats>>,
}

impl OutboxRelayThread {
    pub fn spawn<S, P>(relay: OutboxRelay<S, P>, poll_interval: Duration) -> Self
    where
        S: LedgerStore + 'static,
        P: Publisher + 'static,
    {
        let (stop_tx, stop_rx) = channel();

        let handle = thread::spawn(move || {
            let mut stats = RelayStats::default();
            tracing::info!(topic = relay.topic(), batch_size = relay.batch_size(), "outbox relay started");

            loop {
                stats.polls += 1;

                match relay.process_batch() {
                    Ok(outcome) if outcome.published > 0 => {
                        stats.batches_committed += 1;
                        stats.events_published += outcome.published;
                    }
                    Ok(_) => {}
                    Err(err) => {
                        stats.failed_batches += 1;
                        tracing::warn!(error = %err, "outbox batch failed, retrying next tick");
                    }
                }

                match stop_rx.recv_timeout(poll_interval) {
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    Err(RecvTimeoutError::Timeout) => {}
                }
            }

            tracing::info!(
                polls = stats.polls,
                events_published = stats.events_published,
                failed_batches = stats.failed_batches,
                "outbox relay stopped"
            );
            stats
        });

        Self {
            stop_tx,
            handle: Some(handle),
        }
    }

    /// Signal the relay to stop and wait for the current tick to finish.
    pub fn stop(mut self) -> RelayStats {
        let _ = self.stop_tx.send(());
        match self.handle.take() {
            Some(handle) => handle.join().unwrap_or_default(),
            None => RelayStats::default(),
        }
    }

    /// Signal the relay to stop without waiting.
    pub fn signal_stop(&self) {
        let _ = self.stop_tx.send(());
    }
}

impl Drop for OutboxRelayThread {
    fn drop(&mut self) {
        let _ = self.stop_tx.send(());
    }
}
