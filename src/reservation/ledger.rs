use super::ReservationError;

/// Namespaced counter key for an item.
pub fn stock_key(item_id: &str) -> String {
    format!("stock:{}", item_id)
}

/// Atomic per-item counters backing virtual stock.
///
/// Counters are mutated only through `decrement` / `increment`, which return
/// the value after the change. A decrement may produce a negative count; the
/// caller is expected to compensate immediately with a matching increment.
/// Implementations never take part in ledger-of-record transactions.
pub trait ReservationLedger: Send + Sync {
    fn decrement(&self, item_id: &str, quantity: u32) -> Result<i64, ReservationError>;

    fn increment(&self, item_id: &str, quantity: u32) -> Result<i64, ReservationError>;

    /// Current count without mutating it. Unknown items read as 0.
    fn available(&self, item_id: &str) -> Result<i64, ReservationError>;
}
