use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use uuid::Uuid;

use super::{Lease, LeaseLock, LockError};

struct Held {
    token: String,
    expires_at: Instant,
}

#[derive(Default)]
struct Shared {
    leases: Mutex<HashMap<String, Held>>,
    released: Condvar,
}

/// In-memory lease provider backed by `Mutex<HashMap<..>>` + `Condvar`.
///
/// Cloning returns another handle to the same lease table, so one instance
/// can be shared by every coordinator in a process.
#[derive(Clone, Default)]
pub struct InMemoryLeaseLock {
    shared: Arc<Shared>,
}

impl InMemoryLeaseLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token of the current, unexpired holder of `key`.
    pub fn holder(&self, key: &str) -> Result<Option<String>, LockError> {
        let leases = self
            .shared
            .leases
            .lock()
            .map_err(|e| LockError::Poisoned(e.to_string()))?;
        let now = Instant::now();
        Ok(leases
            .get(key)
            .filter(|held| held.expires_at > now)
            .map(|held| held.token.clone()))
    }
}

impl LeaseLock for InMemoryLeaseLock {
    fn obtain(&self, key: &str, ttl: Duration, wait: Option<Duration>) -> Result<Lease, LockError> {
        if ttl.is_zero() {
            return Err(LockError::InvalidTtl(ttl));
        }
        let deadline = wait.map(|wait| Instant::now() + wait);

        let mut leases = self
            .shared
            .leases
            .lock()
            .map_err(|e| LockError::Poisoned(e.to_string()))?;

        loop {
            let now = Instant::now();
            let held_until = match leases.get(key) {
                Some(held) if held.expires_at > now => held.expires_at,
                _ => {
                    let lease = Lease::new(key, Uuid::new_v4().to_string(), now + ttl);
                    leases.insert(
                        key.to_string(),
                        Held {
                            token: lease.token().to_string(),
                            expires_at: lease.expires_at(),
                        },
                    );
                    return Ok(lease);
                }
            };

            let deadline = match deadline {
                Some(deadline) if deadline > now => deadline,
                _ => {
                    return Err(LockError::Unavailable {
                        key: key.to_string(),
                    })
                }
            };

            // Wake on release, on the holder's expiry, or on our own deadline.
            let timeout = held_until.min(deadline).saturating_duration_since(now);
            let (guard, _) = self
                .shared
                .released
                .wait_timeout(leases, timeout)
                .map_err(|e| LockError::Poisoned(e.to_string()))?;
            leases = guard;
        }
    }

    fn release(&self, lease: &Lease) -> Result<(), LockError> {
        let mut leases = self
            .shared
            .leases
            .lock()
            .map_err(|e| LockError::Poisoned(e.to_string()))?;

        match leases.get(lease.key()) {
            Some(held) if held.token == lease.token() => {
                leases.remove(lease.key());
                self.shared.released.notify_all();
                Ok(())
            }
            _ => Err(LockError::NotHeld {
                key: lease.key().to_string(),
                token: lease.token().to_string(),
            }),
        }
    }
}
