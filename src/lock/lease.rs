use std::time::{Duration, Instant};

use super::LockError;

/// A time-bounded claim on a key, identified by a unique holder token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lease {
    key: String,
    token: String,
    expires_at: Instant,
}

impl Lease {
    pub fn new(key: impl Into<String>, token: impl Into<String>, expires_at: Instant) -> Self {
        Lease {
            key: key.into(),
            token: token.into(),
            expires_at,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Trait for a lease provider.
///
/// Expiry is enforced by the provider, not the holder: once a lease's TTL
/// elapses the key becomes available to other callers even if the holder
/// never releases it. In-memory leases use `Mutex` + `Condvar`; distributed
/// providers might use Redis (`SET NX PX`), etcd leases, etc.
pub trait LeaseLock: Send + Sync {
    /// Obtain a lease on `key` valid for `ttl`.
    ///
    /// With `wait = None` the call fails fast with `LockError::Unavailable`
    /// when the key is held. With `wait = Some(d)` it blocks for up to `d`
    /// for the current holder to release or expire.
    fn obtain(&self, key: &str, ttl: Duration, wait: Option<Duration>) -> Result<Lease, LockError>;

    /// Release a lease. Fails with `LockError::NotHeld` if the token no longer owns the key.
    fn release(&self, lease: &Lease) -> Result<(), LockError>;
}

/// Releases its lease when dropped, so every exit path of a critical section
/// gives the key back.
pub struct LeaseGuard<'a, L: LeaseLock + ?Sized> {
    lock: &'a L,
    lease: Option<Lease>,
}

impl<'a, L: LeaseLock + ?Sized> LeaseGuard<'a, L> {
    pub fn acquire(
        lock: &'a L,
        key: &str,
        ttl: Duration,
        wait: Option<Duration>,
    ) -> Result<Self, LockError> {
        let lease = lock.obtain(key, ttl, wait)?;
        tracing::debug!(key, token = lease.token(), "lease obtained");
        Ok(LeaseGuard {
            lock,
            lease: Some(lease),
        })
    }

    pub fn lease(&self) -> Option<&Lease> {
        self.lease.as_ref()
    }

    /// Release explicitly, surfacing the release error instead of logging it.
    pub fn release(mut self) -> Result<(), LockError> {
        match self.lease.take() {
            Some(lease) => self.lock.release(&lease),
            None => Ok(()),
        }
    }
}

impl<L: LeaseLock + ?Sized> Drop for LeaseGuard<'_, L> {
    fn drop(&mut self) {
        if let Some(lease) = self.lease.take() {
            if let Err(err) = self.lock.release(&lease) {
                // An expired lease may already belong to someone else.
                tracing::warn!(key = lease.key(), error = %err, "lease release failed");
            }
        }
    }
}
