//! Outbox relay: ledger-of-record to message bus, at least once.
//!
//! ```text
//! tick ── read_write(|tx| {
//!           events = tx.read_outbox(N)          oldest first
//!           for e in events: publish(e)?        abort on first failure
//!           tx.delete_outbox_events(events)
//!         })
//! ```
//!
//! A crash after the last acknowledgment but before the commit leaves the
//! events in place, so they are published again. Consumers deduplicate by
//! message id, which is the outbox event id.

mod error;
mod relay;
mod thread;

pub use error::RelayError;
pub use relay::{BatchOutcome, OutboxRelay, RelayEnvelope};
pub use thread::{OutboxRelayThread, RelayStats};
