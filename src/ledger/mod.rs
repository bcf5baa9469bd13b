//! Ledger-of-record: transactional home of `Orders`, `OrderItems` and `Outbox`.
//!
//! ## Outbox invariant
//!
//! Outbox rows can only be written through a `Transaction`, so an event
//! exists if and only if the order change it describes committed in the same
//! atomic write. The relay never sees an event before that commit is durable.
//!
//! ```text
//! read_write(|tx| {
//!     tx.insert_order(..)          ─┐
//!     tx.insert_order_item(..)      ├─ one commit, one timestamp
//!     tx.insert_outbox_event(..)   ─┘
//! })
//! ```

mod error;
mod in_memory;
mod model;
mod store;

pub use error::StoreError;
pub use in_memory::InMemoryLedger;
pub use model::{
    NewOrder, NewOutboxEvent, Order, OrderItem, OrderStatus, OutboxEvent, ORDER_CREATED,
};
pub use store::{LedgerStore, Transaction};
