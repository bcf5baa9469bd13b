use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::{stock_key, ReservationError, ReservationLedger};

/// In-memory counter store keyed by `stock:{item_id}`.
///
/// Thread-safe and cheap to clone; clones share the same counters.
#[derive(Clone, Default)]
pub struct InMemoryReservationLedger {
    counters: Arc<Mutex<HashMap<String, i64>>>,
}

impl InMemoryReservationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed several items at once.
    pub fn with_stock<I, K>(stock: I) -> Self
    where
        I: IntoIterator<Item = (K, i64)>,
        K: AsRef<str>,
    {
        let ledger = Self::new();
        if let Ok(mut counters) = ledger.counters.lock() {
            for (item_id, count) in stock {
                counters.insert(stock_key(item_id.as_ref()), count);
            }
        }
        ledger
    }

    /// Overwrite the counter for an item (restocking, test setup).
    pub fn set_stock(&self, item_id: &str, count: i64) -> Result<(), ReservationError> {
        let mut counters = self
            .counters
            .lock()
            .map_err(|_| ReservationError::Poisoned("set_stock"))?;
        counters.insert(stock_key(item_id), count);
        Ok(())
    }

    fn apply(&self, item_id: &str, delta: i64, op: &'static str) -> Result<i64, ReservationError> {
        let mut counters = self
            .counters
            .lock()
            .map_err(|_| ReservationError::Poisoned(op))?;
        let counter = counters.entry(stock_key(item_id)).or_insert(0);
        *counter += delta;
        Ok(*counter)
    }
}

impl ReservationLedger for InMemoryReservationLedger {
    fn decrement(&self, item_id: &str, quantity: u32) -> Result<i64, ReservationError> {
        self.apply(item_id, -i64::from(quantity), "decrement")
    }

    fn increment(&self, item_id: &str, quantity: u32) -> Result<i64, ReservationError> {
        self.apply(item_id, i64::from(quantity), "increment")
    }

    fn available(&self, item_id: &str) -> Result<i64, ReservationError> {
        let counters = self
            .counters
            .lock()
            .map_err(|_| ReservationError::Poisoned("available"))?;
        Ok(counters.get(&stock_key(item_id)).copied().unwrap_or(0))
    }
}
