//! In-memory bus for testing and single-process scenarios.

use std::sync::{Arc, RwLock};

use super::{Message, PublishError, Publisher};

/// In-memory bus.
///
/// Features:
/// - Thread-safe (can be shared across threads via `Clone`)
/// - Messages are stored in an append-only log, in publish order
/// - A publish is acknowledged as soon as the message is in the log
///
/// ## Example
///
/// ```
/// use checkout_ledger::bus::{InMemoryQueue, Message, Publisher};
///
/// let queue = InMemoryQueue::new();
/// queue.publish(Message::new("evt-1", "orders", b"{}".to_vec())).unwrap();
///
/// assert_eq!(queue.len(), 1);
/// assert_eq!(queue.ids(), vec!["evt-1".to_string()]);
/// ```
#[derive(Clone, Default)]
pub struct InMemoryQueue {
    log: Arc<RwLock<Vec<Message>>>,
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all messages in the log.
    pub fn messages(&self) -> Vec<Message> {
        self.log.read().map(|log| log.clone()).unwrap_or_default()
    }

    /// Get all messages published to a topic.
    pub fn messages_for(&self, topic: &str) -> Vec<Message> {
        self.log
            .read()
            .map(|log| log.iter().filter(|m| m.topic == topic).cloned().collect())
            .unwrap_or_default()
    }

    /// Message ids in publish order, duplicates included.
    pub fn ids(&self) -> Vec<String> {
        self.log
            .read()
            .map(|log| log.iter().map(|m| m.id.clone()).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.log.read().map(|log| log.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all messages from the log (useful for test cleanup).
    pub fn clear(&self) {
        if let Ok(mut log) = self.log.write() {
            log.clear();
        }
    }
}

impl Publisher for InMemoryQueue {
    fn publish(&self, message: Message) -> Result<(), PublishError> {
        self.log
            .write()
            .map_err(|_| PublishError::Poisoned)?
            .push(message);
        Ok(())
    }
}
