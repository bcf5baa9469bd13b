use serde::{Deserialize, Serialize};

use super::{SignatureVerifier, WebhookError};
use crate::ledger::{LedgerStore, OrderStatus};

/// Payment result reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentResult {
    Success,
    Failed,
}

impl PaymentResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentResult::Success => "SUCCESS",
            PaymentResult::Failed => "FAILED",
        }
    }

    /// Terminal order status this result settles to.
    pub fn order_status(&self) -> OrderStatus {
        match self {
            PaymentResult::Success => OrderStatus::Paid,
            PaymentResult::Failed => OrderStatus::Failed,
        }
    }
}

/// Inbound provider callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub signature: String,
    pub order_id: String,
    pub status: PaymentResult,
    pub amount: f64,
}

/// What a successfully handled webhook did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// The order moved to a terminal status.
    Applied { order_id: String, status: OrderStatus },
    /// The order was already terminal; a duplicate delivery, nothing changed.
    AlreadyFinalized { order_id: String, status: OrderStatus },
}

/// Applies provider payment results to orders, idempotently.
pub struct PaymentWebhookProcessor<S, V> {
    ledger: S,
    verifier: V,
}

impl<S, V> PaymentWebhookProcessor<S, V>
where
    S: LedgerStore,
    V: SignatureVerifier,
{
    pub fn new(ledger: S, verifier: V) -> Self {
        PaymentWebhookProcessor { ledger, verifier }
    }

    /// Handle a raw webhook body and return the HTTP status for the provider.
    ///
    /// `200` covers both the first delivery and any duplicate, so provider
    /// retries stop once the order is settled.
    pub fn handle(&self, body: &[u8]) -> u16 {
        match self.process(body) {
            Ok(_) => 200,
            Err(err) => {
                if err.status_code() >= 500 {
                    tracing::error!(error = %err, "payment webhook failed");
                } else {
                    tracing::warn!(error = %err, "payment webhook rejected");
                }
                err.status_code()
            }
        }
    }

    pub fn process(&self, body: &[u8]) -> Result<WebhookOutcome, WebhookError> {
        let payload: WebhookPayload = serde_json::from_slice(body)?;

        // Before any state is read.
        if !self.verifier.verify(&payload) {
            return Err(WebhookError::InvalidSignature);
        }

        let next = payload.status.order_status();
        let outcome = self.ledger.read_write(|tx| -> Result<_, WebhookError> {
            let order = tx
                .read_order(&payload.order_id)?
                .ok_or_else(|| WebhookError::OrderNotFound(payload.order_id.clone()))?;

            if order.status.is_terminal() {
                return Ok(WebhookOutcome::AlreadyFinalized {
                    order_id: order.order_id,
                    status: order.status,
                });
            }

            if order.total_amount != payload.amount {
                tracing::warn!(
                    order_id = %order.order_id,
                    expected = order.total_amount,
                    reported = payload.amount,
                    "webhook amount differs from order total"
                );
            }

            tx.update_order_status(&order.order_id, next)?;
            Ok(WebhookOutcome::Applied {
                order_id: order.order_id,
                status: next,
            })
        })?;

        match &outcome {
            WebhookOutcome::Applied { order_id, status } => {
                tracing::info!(%order_id, %status, "payment result applied");
            }
            WebhookOutcome::AlreadyFinalized { order_id, status } => {
                tracing::debug!(%order_id, %status, "duplicate payment webhook ignored");
            }
        }
        Ok(outcome)
    }
}
