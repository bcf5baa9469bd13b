//! Lease locks: TTL-bounded mutual exclusion keyed by an arbitrary string.
//!
//! - `LeaseLock`: provider trait (`obtain` / `release`)
//! - `Lease`: the holder token and expiry returned by `obtain`
//! - `LeaseGuard`: releases the lease on every exit path
//! - `InMemoryLeaseLock`: single-process provider for tests and demos
//!
//! ## Example
//!
//! ```
//! use std::time::Duration;
//! use checkout_ledger::lock::{InMemoryLeaseLock, LeaseGuard, LockError};
//!
//! let locks = InMemoryLeaseLock::new();
//! let guard = LeaseGuard::acquire(&locks, "lock:checkout:u1", Duration::from_secs(5), None).unwrap();
//!
//! // A second caller fails fast while the guard is alive.
//! let second = LeaseGuard::acquire(&locks, "lock:checkout:u1", Duration::from_secs(5), None);
//! assert!(matches!(second, Err(LockError::Unavailable { .. })));
//!
//! drop(guard);
//! assert!(LeaseGuard::acquire(&locks, "lock:checkout:u1", Duration::from_secs(5), None).is_ok());
//! ```

mod error;
mod in_memory;
mod lease;

pub use error::LockError;
pub use in_memory::InMemoryLeaseLock;
pub use lease::{Lease, LeaseGuard, LeaseLock};
