use std::time::Duration;

/// Error type for lease operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LockError {
    /// The underlying lock primitive was poisoned (e.g. a thread panicked while holding it).
    #[error("lock poisoned: {0}")]
    Poisoned(String),
    /// Another holder owns the key and the wait deadline elapsed (or no wait was allowed).
    #[error("lease unavailable for key {key}")]
    Unavailable { key: String },
    /// The lease expired and the key was taken over, or it was already released.
    #[error("lease for key {key} is no longer held by token {token}")]
    NotHeld { key: String, token: String },
    /// A lease must have a non-zero time to live.
    #[error("invalid lease ttl: {0:?}")]
    InvalidTtl(Duration),
}
