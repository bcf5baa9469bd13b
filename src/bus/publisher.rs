//! Core publisher trait for the message bus.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;

/// Attribute carrying the event type of a relayed outbox event.
pub const ATTR_TYPE: &str = "type";
/// Attribute carrying the aggregate (order) id of a relayed outbox event.
pub const ATTR_AGGREGATE_ID: &str = "aggregate_id";

/// A message to be published to the bus.
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    /// Unique identifier; consumers deduplicate on it.
    pub id: String,
    /// Destination topic (e.g. "orders")
    pub topic: String,
    /// Serialized body (JSON for relayed outbox events)
    pub data: Vec<u8>,
    /// String attributes routed alongside the body
    pub attributes: BTreeMap<String, String>,
}

impl Message {
    pub fn new(id: impl Into<String>, topic: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            id: id.into(),
            topic: topic.into(),
            data,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Get the body as a string (if valid UTF-8).
    pub fn data_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.data).ok()
    }

    /// Decode the JSON body.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.data)
    }
}

/// Error type for publish operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PublishError {
    /// Connection to the bus failed
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    /// The bus rejected the message
    #[error("message rejected: {0}")]
    Rejected(String),
    /// No durable acknowledgment arrived in time
    #[error("publish timeout")]
    Timeout,
    #[error("publisher poisoned")]
    Poisoned,
}

/// Trait for publishing messages to a bus.
///
/// `publish` returns only after the bus durably accepted the message (or
/// failed to). Delivery downstream is at-least-once.
pub trait Publisher: Send + Sync {
    fn publish(&self, message: Message) -> Result<(), PublishError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_construction() {
        let message = Message::new("evt-1", "orders", br#"{"id":"o1"}"#.to_vec())
            .with_attribute(ATTR_TYPE, "ORDER_CREATED")
            .with_attribute(ATTR_AGGREGATE_ID, "o1");

        assert_eq!(message.id, "evt-1");
        assert_eq!(message.topic, "orders");
        assert_eq!(message.attribute(ATTR_TYPE), Some("ORDER_CREATED"));
        assert_eq!(message.attribute("missing"), None);
        assert_eq!(message.data_str(), Some(r#"{"id":"o1"}"#));
    }

    #[test]
    fn decode_json_body() {
        let message = Message::new("evt-1", "orders", br#"{"total":19.98}"#.to_vec());
        let body: serde_json::Value = message.decode().unwrap();
        assert_eq!(body["total"], 19.98);
    }
}
