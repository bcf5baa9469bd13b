use crate::bus::PublishError;
use crate::ledger::StoreError;

/// Failure of one relay batch. Every kind aborts the batch transaction, so no
/// outbox row is deleted and the whole batch is retried on the next tick.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("publish of event {event_id} failed: {source}")]
    Publish {
        event_id: String,
        #[source]
        source: PublishError,
    },
    #[error("envelope encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("ledger error: {0}")]
    Store(#[from] StoreError),
}
