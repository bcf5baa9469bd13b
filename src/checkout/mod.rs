//! Checkout: the reserve-then-commit purchase protocol.
//!
//! ```text
//! purchase(user, items)
//!   1. lease  lock:checkout:{user}        ── LockUnavailable
//!   2. reserve stock:{item} per item       ── OutOfStock      (stock restored)
//!   3. charge the payment gateway          ── PaymentFailed   (stock restored)
//!   4. commit Order + OrderItems + Outbox  ── CommitFailed    (reconciliation)
//! ```
//!
//! `finalize_order` runs step 4 alone; `evaluate_stock` is a read-only
//! availability check.

mod cart;
mod coordinator;
mod error;
mod finalize;
#[cfg(feature = "http")]
mod http;
mod reserve;
mod stock;

pub use cart::{cart_total, CartItem};
pub(crate) use cart::validate_cart;
pub use coordinator::{checkout_lock_key, CheckoutCoordinator};
pub use error::CheckoutError;
pub use finalize::{finalize_order, OrderReceipt};
#[cfg(feature = "http")]
pub use http::{checkout_router, EvaluateRequest, PurchaseRequest};
pub use stock::StockEvaluation;
