/// Error type for ledger-of-record transactions.
///
/// Any error returned from a transaction body aborts it; nothing it wrote
/// becomes visible.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("ledger lock poisoned during {0}")]
    LockPoisoned(&'static str),
    #[error("row {key} already exists in {table}")]
    AlreadyExists { table: &'static str, key: String },
    #[error("row {key} not found in {table}")]
    NotFound { table: &'static str, key: String },
    /// A commit would break a cross-table invariant (e.g. an orphaned outbox row).
    #[error("constraint violated: {0}")]
    Constraint(String),
    /// The transaction was aborted by the backend (contention, crash, timeout).
    #[error("transaction aborted: {0}")]
    Aborted(String),
}
