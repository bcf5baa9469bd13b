//! Payment side of checkout: the synchronous gateway and the asynchronous
//! provider webhook that settles orders.
//!
//! ## Webhook flow
//!
//! 1. Parse the JSON body (`400` if malformed)
//! 2. Verify the signature before touching any state (`401`)
//! 3. In one ledger transaction read the order (`404` if missing)
//! 4. Already `PAID` / `FAILED`: return `200` without writing
//! 5. Otherwise write the terminal status and commit (`200`, or `500` on a
//!    ledger failure so the provider retries)

mod error;
mod gateway;
#[cfg(feature = "http")]
mod http;
mod signature;
mod webhook;

pub use error::{PaymentError, WebhookError};
pub use gateway::{ChargeReceipt, ChargeRequest, PaymentGateway, SimulatedGateway};
#[cfg(feature = "http")]
pub use http::{serve, webhook_router};
pub use signature::{HmacSignatureVerifier, SignatureVerifier};
pub use webhook::{PaymentResult, PaymentWebhookProcessor, WebhookOutcome, WebhookPayload};
