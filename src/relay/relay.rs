use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::RelayError;
use crate::bus::{Message, Publisher, ATTR_AGGREGATE_ID, ATTR_TYPE};
use crate::config::RelayConfig;
use crate::ledger::{LedgerStore, OutboxEvent};

/// Body of a relayed message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayEnvelope {
    pub event_id: String,
    pub aggregate_id: String,
    pub event_type: String,
    /// The outbox payload exactly as committed.
    pub payload: String,
    pub created_at: DateTime<Utc>,
}

impl From<&OutboxEvent> for RelayEnvelope {
    fn from(event: &OutboxEvent) -> Self {
        RelayEnvelope {
            event_id: event.event_id.clone(),
            aggregate_id: event.aggregate_id.clone(),
            event_type: event.event_type.clone(),
            payload: event.payload.clone(),
            created_at: event.created_at,
        }
    }
}

/// Result of one `process_batch` call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Events published and deleted by the committed transaction.
    pub published: usize,
}

/// Moves committed outbox events to the bus.
///
/// Assumes it is the only relay polling its ledger; a second instance would
/// publish the same events twice.
pub struct OutboxRelay<S, P> {
    ledger: S,
    publisher: P,
    topic: String,
    batch_size: usize,
}

impl<S, P> OutboxRelay<S, P> {
    pub fn new(ledger: S, publisher: P) -> Self {
        let defaults = RelayConfig::default();
        Self {
            ledger,
            publisher,
            topic: defaults.topic,
            batch_size: defaults.batch_size,
        }
    }

    /// Apply topic and batch size from configuration.
    pub fn with_config(self, config: &RelayConfig) -> Self {
        self.with_topic(config.topic.clone())
            .with_batch_size(config.batch_size)
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    /// Set the batch size (max events per transaction). Clamped to at least 1.
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    pub fn ledger(&self) -> &S {
        &self.ledger
    }
}

impl<S, P> OutboxRelay<S, P>
where
    S: LedgerStore,
    P: Publisher,
{
    /// Publish up to `batch_size` of the oldest outbox events and delete them.
    ///
    /// Runs in one ledger transaction. Publishes happen in creation order and
    /// each waits for the bus acknowledgment; the first failure aborts the
    /// transaction without deleting anything. Events acknowledged before a
    /// failed commit are published again by the next batch.
    pub fn process_batch(&self) -> Result<BatchOutcome, RelayError> {
        self.ledger.read_write(|tx| -> Result<BatchOutcome, RelayError> {
            let events = tx.read_outbox(self.batch_size)?;
            if events.is_empty() {
                return Ok(BatchOutcome::default());
            }

            let mut published = Vec::with_capacity(events.len());
            for event in &events {
                let message = self.to_message(event)?;
                self.publisher
                    .publish(message)
                    .map_err(|source| RelayError::Publish {
                        event_id: event.event_id.clone(),
                        source,
                    })?;
                tracing::debug!(event_id = %event.event_id, order_id = %event.aggregate_id, "event published");
                published.push(event.event_id.clone());
            }

            tx.delete_outbox_events(&published)?;
            Ok(BatchOutcome {
                published: published.len(),
            })
        })
    }

    fn to_message(&self, event: &OutboxEvent) -> Result<Message, RelayError> {
        let body = serde_json::to_vec(&RelayEnvelope::from(event))?;
        Ok(Message::new(event.event_id.as_str(), self.topic.as_str(), body)
            .with_attribute(ATTR_TYPE, event.event_type.as_str())
            .with_attribute(ATTR_AGGREGATE_ID, event.aggregate_id.as_str()))
    }
}
