use crate::ledger::StoreError;
use crate::lock::LockError;
use crate::payment::PaymentError;
use crate::reservation::ReservationError;

/// Outcome kinds of a failed checkout.
///
/// Every kind except `CommitFailed` leaves reservations as they were before
/// the call. `CommitFailed` means the customer was charged and stock is gone
/// but no order exists; it must go through reconciliation, never a blind retry.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("invalid cart: {0}")]
    InvalidCart(String),
    /// Another purchase for the same user holds the lease. Transient.
    #[error("checkout already in progress for user {user_id}")]
    LockUnavailable {
        user_id: String,
        #[source]
        source: LockError,
    },
    #[error("item {item_id} is out of stock (requested {requested})")]
    OutOfStock { item_id: String, requested: u32 },
    #[error("payment failed: {0}")]
    PaymentFailed(#[source] PaymentError),
    #[error("order commit failed after payment {payment_id}: {source}")]
    CommitFailed {
        payment_id: String,
        #[source]
        source: StoreError,
    },
    /// The reservation counters could not be read or updated.
    #[error("reservation ledger error: {0}")]
    Reservation(#[from] ReservationError),
    /// A standalone `finalize_order` commit failed; nothing was written.
    #[error("ledger error: {0}")]
    Store(#[from] StoreError),
}

impl CheckoutError {
    /// Map this error to an HTTP-style status code.
    pub fn status_code(&self) -> u16 {
        match self {
            CheckoutError::InvalidCart(_) => 400,
            CheckoutError::LockUnavailable { .. } => 409,
            CheckoutError::OutOfStock { .. } => 409,
            CheckoutError::PaymentFailed(_) => 402,
            CheckoutError::CommitFailed { .. } => 500,
            CheckoutError::Reservation(_) => 503,
            CheckoutError::Store(_) => 500,
        }
    }

    /// Whether the same request may simply be sent again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CheckoutError::LockUnavailable { .. } | CheckoutError::Reservation(_)
        )
    }
}
