//! HTTP transport for checkout.
//!
//! Requires the `http` feature. Uses axum for routing.
//!
//! ## Routes
//!
//! - `POST /checkout`: body `{ "user_id": .., "items": [..] }`, runs a
//!   purchase and returns the `OrderReceipt`.
//! - `POST /checkout/evaluate`: body `{ "items": [..] }`, returns the
//!   `StockEvaluation`.
//! - `POST /orders`: body as for `/checkout`, commits a `CREATED` order
//!   without reserving or charging.
//!
//! Merge with `payment::webhook_router`, which owns `GET /health`.
//!
//! Errors come back as `{ "error": ".." }` with `CheckoutError::status_code()`.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{CartItem, CheckoutCoordinator, CheckoutError};
use crate::ledger::LedgerStore;
use crate::lock::LeaseLock;
use crate::payment::PaymentGateway;
use crate::reservation::ReservationLedger;

#[derive(Debug, Deserialize)]
pub struct PurchaseRequest {
    pub user_id: String,
    pub items: Vec<CartItem>,
}

#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    pub items: Vec<CartItem>,
}

/// Build an axum `Router` serving checkout operations.
pub fn checkout_router<L, R, P, S>(coordinator: Arc<CheckoutCoordinator<L, R, P, S>>) -> Router
where
    L: LeaseLock + 'static,
    R: ReservationLedger + 'static,
    P: PaymentGateway + 'static,
    S: LedgerStore + 'static,
{
    Router::new()
        .route("/checkout", post(purchase_handler::<L, R, P, S>))
        .route("/checkout/evaluate", post(evaluate_handler::<L, R, P, S>))
        .route("/orders", post(finalize_handler::<L, R, P, S>))
        .with_state(coordinator)
}

async fn purchase_handler<L, R, P, S>(
    State(coordinator): State<Arc<CheckoutCoordinator<L, R, P, S>>>,
    Json(req): Json<PurchaseRequest>,
) -> Response
where
    L: LeaseLock + 'static,
    R: ReservationLedger + 'static,
    P: PaymentGateway + 'static,
    S: LedgerStore + 'static,
{
    // A purchase may block on the lease and the gateway.
    run_blocking("purchase", move || coordinator.purchase(&req.user_id, &req.items)).await
}

async fn evaluate_handler<L, R, P, S>(
    State(coordinator): State<Arc<CheckoutCoordinator<L, R, P, S>>>,
    Json(req): Json<EvaluateRequest>,
) -> Response
where
    L: LeaseLock + 'static,
    R: ReservationLedger + 'static,
    P: PaymentGateway + 'static,
    S: LedgerStore + 'static,
{
    run_blocking("evaluate", move || coordinator.evaluate_stock(&req.items)).await
}

async fn finalize_handler<L, R, P, S>(
    State(coordinator): State<Arc<CheckoutCoordinator<L, R, P, S>>>,
    Json(req): Json<PurchaseRequest>,
) -> Response
where
    L: LeaseLock + 'static,
    R: ReservationLedger + 'static,
    P: PaymentGateway + 'static,
    S: LedgerStore + 'static,
{
    run_blocking("finalize", move || coordinator.finalize_order(&req.user_id, &req.items)).await
}

/// Run a coordinator call on the blocking pool; every call touches a store
/// that may block.
async fn run_blocking<T, F>(op: &'static str, call: F) -> Response
where
    T: Serialize + Send + 'static,
    F: FnOnce() -> Result<T, CheckoutError> + Send + 'static,
{
    match tokio::task::spawn_blocking(call).await {
        Ok(Ok(value)) => (StatusCode::OK, Json(value)).into_response(),
        Ok(Err(err)) => error_response(&err),
        Err(join) => {
            tracing::error!(op, error = %join, "checkout task failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn error_response(err: &CheckoutError) -> Response {
    let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(json!({ "error": err.to_string() }))).into_response()
}
