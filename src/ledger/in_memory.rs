use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use super::{
    LedgerStore, NewOrder, NewOutboxEvent, Order, OrderItem, OrderStatus, OutboxEvent, StoreError,
    Transaction,
};

#[derive(Clone)]
struct OutboxRow {
    seq: u64,
    event: OutboxEvent,
}

#[derive(Clone, Default)]
struct Tables {
    orders: HashMap<String, Order>,
    order_items: BTreeMap<(String, String), OrderItem>,
    outbox: Vec<OutboxRow>,
    outbox_seq: u64,
    last_commit: Option<DateTime<Utc>>,
}

enum Mutation {
    InsertOrder(NewOrder),
    InsertOrderItem(OrderItem),
    InsertOutboxEvent(NewOutboxEvent),
    UpdateOrderStatus { order_id: String, status: OrderStatus },
    DeleteOutboxEvents(Vec<String>),
}

impl Tables {
    fn commit_timestamp(&self) -> DateTime<Utc> {
        let now = Utc::now();
        match self.last_commit {
            Some(last) if last > now => last,
            _ => now,
        }
    }

    fn apply(&mut self, mutation: Mutation, ts: DateTime<Utc>) -> Result<(), StoreError> {
        match mutation {
            Mutation::InsertOrder(order) => {
                if self.orders.contains_key(&order.order_id) {
                    return Err(StoreError::AlreadyExists {
                        table: "Orders",
                        key: order.order_id,
                    });
                }
                self.orders.insert(
                    order.order_id.clone(),
                    Order {
                        order_id: order.order_id,
                        user_id: order.user_id,
                        total_amount: order.total_amount,
                        status: order.status,
                        created_at: ts,
                    },
                );
            }
            Mutation::InsertOrderItem(item) => {
                let key = (item.order_id.clone(), item.item_id.clone());
                if self.order_items.contains_key(&key) {
                    return Err(StoreError::AlreadyExists {
                        table: "OrderItems",
                        key: format!("{}/{}", key.0, key.1),
                    });
                }
                self.order_items.insert(key, item);
            }
            Mutation::InsertOutboxEvent(event) => {
                if self.outbox.iter().any(|row| row.event.event_id == event.event_id) {
                    return Err(StoreError::AlreadyExists {
                        table: "Outbox",
                        key: event.event_id,
                    });
                }
                self.outbox_seq += 1;
                self.outbox.push(OutboxRow {
                    seq: self.outbox_seq,
                    event: OutboxEvent {
                        event_id: event.event_id,
                        aggregate_id: event.aggregate_id,
                        event_type: event.event_type,
                        payload: event.payload,
                        created_at: ts,
                    },
                });
            }
            Mutation::UpdateOrderStatus { order_id, status } => {
                let order = self.orders.get_mut(&order_id).ok_or(StoreError::NotFound {
                    table: "Orders",
                    key: order_id.clone(),
                })?;
                if !order.status.can_transition_to(status) {
                    return Err(StoreError::Constraint(format!(
                        "order {} cannot move from {} to {}",
                        order_id, order.status, status
                    )));
                }
                order.status = status;
            }
            Mutation::DeleteOutboxEvents(ids) => {
                self.outbox.retain(|row| !ids.contains(&row.event.event_id));
            }
        }
        Ok(())
    }

    /// Child rows written by this commit must reference an order that exists after it.
    fn check_references(&self, items: &[(String, String)], events: &[String]) -> Result<(), StoreError> {
        for (order_id, item_id) in items {
            if !self.orders.contains_key(order_id) {
                return Err(StoreError::Constraint(format!(
                    "order item {} references missing order {}",
                    item_id, order_id
                )));
            }
        }
        for aggregate_id in events {
            if !self.orders.contains_key(aggregate_id) {
                return Err(StoreError::Constraint(format!(
                    "outbox event references missing order {}",
                    aggregate_id
                )));
            }
        }
        Ok(())
    }
}

struct InMemoryTransaction<'a> {
    tables: &'a Tables,
    mutations: Vec<Mutation>,
}

impl Transaction for InMemoryTransaction<'_> {
    fn read_order(&self, order_id: &str) -> Result<Option<Order>, StoreError> {
        Ok(self.tables.orders.get(order_id).cloned())
    }

    fn read_order_items(&self, order_id: &str) -> Result<Vec<OrderItem>, StoreError> {
        Ok(self
            .tables
            .order_items
            .values()
            .filter(|item| item.order_id == order_id)
            .cloned()
            .collect())
    }

    fn read_outbox(&self, limit: usize) -> Result<Vec<OutboxEvent>, StoreError> {
        let mut rows: Vec<&OutboxRow> = self.tables.outbox.iter().collect();
        rows.sort_by_key(|row| (row.event.created_at, row.seq));
        Ok(rows
            .into_iter()
            .take(limit)
            .map(|row| row.event.clone())
            .collect())
    }

    fn insert_order(&mut self, order: NewOrder) -> Result<(), StoreError> {
        self.mutations.push(Mutation::InsertOrder(order));
        Ok(())
    }

    fn insert_order_item(&mut self, item: OrderItem) -> Result<(), StoreError> {
        self.mutations.push(Mutation::InsertOrderItem(item));
        Ok(())
    }

    fn insert_outbox_event(&mut self, event: NewOutboxEvent) -> Result<(), StoreError> {
        self.mutations.push(Mutation::InsertOutboxEvent(event));
        Ok(())
    }

    fn update_order_status(
        &mut self,
        order_id: &str,
        status: OrderStatus,
    ) -> Result<(), StoreError> {
        self.mutations.push(Mutation::UpdateOrderStatus {
            order_id: order_id.to_string(),
            status,
        });
        Ok(())
    }

    fn delete_outbox_events(&mut self, event_ids: &[String]) -> Result<(), StoreError> {
        self.mutations
            .push(Mutation::DeleteOutboxEvents(event_ids.to_vec()));
        Ok(())
    }
}

/// In-memory ledger-of-record.
///
/// Transactions are serialized by a single write lock held for the whole
/// body, and writes are staged on a copy of the tables that replaces the live
/// tables only if every mutation and reference check succeeds. Cloning returns
/// another handle to the same tables.
#[derive(Clone, Default)]
pub struct InMemoryLedger {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn order(&self, order_id: &str) -> Result<Option<Order>, StoreError> {
        let tables = self
            .tables
            .read()
            .map_err(|_| StoreError::LockPoisoned("read"))?;
        Ok(tables.orders.get(order_id).cloned())
    }

    pub fn orders(&self) -> Result<Vec<Order>, StoreError> {
        let tables = self
            .tables
            .read()
            .map_err(|_| StoreError::LockPoisoned("read"))?;
        let mut orders: Vec<Order> = tables.orders.values().cloned().collect();
        orders.sort_by_key(|order| order.created_at);
        Ok(orders)
    }

    pub fn order_items(&self, order_id: &str) -> Result<Vec<OrderItem>, StoreError> {
        self.read_write(|tx| tx.read_order_items(order_id))
    }

    /// Every pending outbox event, oldest first.
    pub fn outbox(&self) -> Result<Vec<OutboxEvent>, StoreError> {
        self.read_write(|tx| tx.read_outbox(usize::MAX))
    }
}

impl LedgerStore for InMemoryLedger {
    fn read_write<T, E, F>(&self, body: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn Transaction) -> Result<T, E>,
        E: From<StoreError>,
    {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| StoreError::LockPoisoned("transaction"))?;

        let (value, mutations) = {
            let mut tx = InMemoryTransaction {
                tables: &*tables,
                mutations: Vec::new(),
            };
            let value = body(&mut tx)?;
            (value, tx.mutations)
        };

        if mutations.is_empty() {
            return Ok(value);
        }

        let mut inserted_items = Vec::new();
        let mut inserted_events = Vec::new();
        for mutation in &mutations {
            match mutation {
                Mutation::InsertOrderItem(item) => {
                    inserted_items.push((item.order_id.clone(), item.item_id.clone()))
                }
                Mutation::InsertOutboxEvent(event) => {
                    inserted_events.push(event.aggregate_id.clone())
                }
                _ => {}
            }
        }

        let ts = tables.commit_timestamp();
        let mut staged = tables.clone();
        for mutation in mutations {
            staged.apply(mutation, ts)?;
        }
        staged.check_references(&inserted_items, &inserted_events)?;
        staged.last_commit = Some(ts);
        *tables = staged;

        Ok(value)
    }
}
