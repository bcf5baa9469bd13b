//! Message bus abstraction used by the outbox relay.
//!
//! The bus is treated as an at-least-once publish/ack primitive: `publish`
//! blocks until the broker durably accepted the message. Consumers must
//! deduplicate by message id, which the relay sets to the outbox event id.
//!
//! ```text
//! ┌──────────────┐  publish(Message)  ┌──────────────────────────────┐
//! │ OutboxRelay  │ ─────────────────▶ │ Publisher                    │
//! └──────────────┘   Ok = durable ack │  InMemoryQueue (included)    │
//!                                     │  Pub/Sub, Kafka... (external)│
//!                                     └──────────────────────────────┘
//! ```

mod in_memory_queue;
mod publisher;

pub use in_memory_queue::InMemoryQueue;
pub use publisher::{Message, PublishError, Publisher, ATTR_AGGREGATE_ID, ATTR_TYPE};
