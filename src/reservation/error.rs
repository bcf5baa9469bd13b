/// Error type for reservation counter operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReservationError {
    #[error("reservation ledger poisoned during {0}")]
    Poisoned(&'static str),
    /// The counter backend could not be reached.
    #[error("reservation ledger unavailable: {0}")]
    Unavailable(String),
}
