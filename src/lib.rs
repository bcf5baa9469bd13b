//! Reserve-then-commit checkout over three stores that cannot share a
//! transaction: a lease lock, a virtual stock counter service and a
//! ledger-of-record, plus an outbox relay to the message bus and an
//! idempotent payment webhook.
//!
//! ```text
//!  purchase ──▶ lock ──▶ reservation ──▶ payment ──▶ ledger (Order + Items + Outbox)
//!                                                        │
//!                                       relay ◀──────────┘ ──▶ bus
//!  provider webhook ──▶ payment::PaymentWebhookProcessor ──▶ ledger (status)
//! ```

pub mod bus;
pub mod checkout;
pub mod config;
pub mod ledger;
pub mod lock;
pub mod payment;
pub mod reconcile;
pub mod relay;
pub mod reservation;
pub mod telemetry;

pub use bus::{InMemoryQueue, Message, PublishError, Publisher};
pub use checkout::{
    cart_total, finalize_order, CartItem, CheckoutCoordinator, CheckoutError, OrderReceipt,
    StockEvaluation,
};
pub use config::{Config, ConfigError};
pub use ledger::{
    InMemoryLedger, LedgerStore, Order, OrderItem, OrderStatus, OutboxEvent, StoreError,
    Transaction,
};
pub use lock::{InMemoryLeaseLock, Lease, LeaseGuard, LeaseLock, LockError};
pub use payment::{
    HmacSignatureVerifier, PaymentGateway, PaymentWebhookProcessor, SignatureVerifier,
    SimulatedGateway, WebhookError, WebhookPayload,
};
pub use reconcile::{InMemoryReconciliationLog, ReconciliationLog, UnreconciledCommit};
pub use relay::{OutboxRelay, OutboxRelayThread, RelayError, RelayStats};
pub use reservation::{InMemoryReservationLedger, ReservationError, ReservationLedger};
