use super::{NewOrder, NewOutboxEvent, Order, OrderItem, OrderStatus, OutboxEvent, StoreError};

/// Operations available inside one read-write transaction.
///
/// Reads observe committed state. Writes are buffered and applied together
/// when the transaction body returns `Ok`; an `Err` discards all of them.
pub trait Transaction {
    fn read_order(&self, order_id: &str) -> Result<Option<Order>, StoreError>;

    fn read_order_items(&self, order_id: &str) -> Result<Vec<OrderItem>, StoreError>;

    /// Up to `limit` pending outbox events, oldest first.
    fn read_outbox(&self, limit: usize) -> Result<Vec<OutboxEvent>, StoreError>;

    fn insert_order(&mut self, order: NewOrder) -> Result<(), StoreError>;

    fn insert_order_item(&mut self, item: OrderItem) -> Result<(), StoreError>;

    fn insert_outbox_event(&mut self, event: NewOutboxEvent) -> Result<(), StoreError>;

    fn update_order_status(&mut self, order_id: &str, status: OrderStatus)
        -> Result<(), StoreError>;

    fn delete_outbox_events(&mut self, event_ids: &[String]) -> Result<(), StoreError>;
}

/// The ledger-of-record: the single source of truth for orders and the outbox.
///
/// Every mutation goes through `read_write`, which runs `body` inside one ACID
/// transaction. The body's error type only needs `From<StoreError>`, so domain
/// errors (a failed publish, a missing order) abort the transaction and come
/// back to the caller unchanged.
pub trait LedgerStore: Send + Sync {
    fn read_write<T, E, F>(&self, body: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn Transaction) -> Result<T, E>,
        E: From<StoreError>;
}
