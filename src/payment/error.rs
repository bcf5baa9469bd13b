use crate::ledger::StoreError;

/// Error returned by a payment gateway charge.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaymentError {
    /// The provider refused the charge.
    #[error("payment declined: {0}")]
    Declined(String),
    /// The provider could not be reached or timed out.
    #[error("payment provider unavailable: {0}")]
    Unavailable(String),
}

/// Error type for payment webhook handling.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// Body is not a valid webhook payload.
    #[error("malformed webhook payload: {0}")]
    Malformed(String),
    #[error("invalid webhook signature")]
    InvalidSignature,
    #[error("order not found: {0}")]
    OrderNotFound(String),
    #[error("ledger error: {0}")]
    Store(#[from] StoreError),
}

impl WebhookError {
    /// Map this error to the HTTP status returned to the provider.
    pub fn status_code(&self) -> u16 {
        match self {
            WebhookError::Malformed(_) => 400,
            WebhookError::InvalidSignature => 401,
            WebhookError::OrderNotFound(_) => 404,
            WebhookError::Store(_) => 500,
        }
    }
}

impl From<serde_json::Error> for WebhookError {
    fn from(err: serde_json::Error) -> Self {
        WebhookError::Malformed(err.to_string())
    }
}
