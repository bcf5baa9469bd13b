//! HTTP transport for the payment webhook.
//!
//! Requires the `http` feature. Uses axum for routing.
//!
//! ## Routes
//!
//! - `POST /webhooks/payment`: body handed verbatim to the processor; the
//!   response carries only the processor's status code.
//! - `GET /health`: returns `{ "ok": true }`.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use checkout_ledger::ledger::InMemoryLedger;
//! use checkout_ledger::payment::{self, HmacSignatureVerifier, PaymentWebhookProcessor};
//!
//! let processor = Arc::new(PaymentWebhookProcessor::new(
//!     InMemoryLedger::new(),
//!     HmacSignatureVerifier::new("whsec"),
//! ));
//!
//! // Compose with other axum routes
//! let app = payment::webhook_router(processor.clone());
//!
//! // Or serve directly
//! payment::serve(processor, "0.0.0.0:8080").await?;
//! ```

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use super::{PaymentWebhookProcessor, SignatureVerifier};
use crate::ledger::LedgerStore;

/// Build an axum `Router` serving the provider callback.
pub fn webhook_router<S, V>(processor: Arc<PaymentWebhookProcessor<S, V>>) -> Router
where
    S: LedgerStore + 'static,
    V: SignatureVerifier + 'static,
{
    Router::new()
        .route("/health", get(health_handler))
        .route("/webhooks/payment", post(webhook_handler::<S, V>))
        .with_state(processor)
}

/// Serve the webhook over HTTP at the given address (e.g. `"0.0.0.0:8080"`).
pub async fn serve<S, V>(
    processor: Arc<PaymentWebhookProcessor<S, V>>,
    addr: &str,
) -> Result<(), std::io::Error>
where
    S: LedgerStore + 'static,
    V: SignatureVerifier + 'static,
{
    let app = webhook_router(processor);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

async fn webhook_handler<S, V>(
    State(processor): State<Arc<PaymentWebhookProcessor<S, V>>>,
    body: Bytes,
) -> StatusCode
where
    S: LedgerStore + 'static,
    V: SignatureVerifier + 'static,
{
    // The ledger transaction blocks while it holds the write lock.
    match tokio::task::spawn_blocking(move || processor.handle(&body)).await {
        Ok(code) => StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Err(join) => {
            tracing::error!(error = %join, "webhook task failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
