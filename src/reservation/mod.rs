//! Reservation ledger: the virtual stock counters consulted before payment.
//!
//! This is an advisory count, not the ledger-of-record's truth. Cross-store
//! consistency with orders is eventual, restored by compensating increments.

mod error;
mod in_memory;
mod ledger;

pub use error::ReservationError;
pub use in_memory::InMemoryReservationLedger;
pub use ledger::{stock_key, ReservationLedger};
