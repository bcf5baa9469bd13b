//! Shared fixtures for integration tests: scripted collaborators and a ledger
//! wrapper that can fail its commits on demand.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use checkout_ledger::bus::{InMemoryQueue, Message, PublishError, Publisher};
use checkout_ledger::ledger::{InMemoryLedger, LedgerStore, StoreError, Transaction};
use checkout_ledger::payment::{ChargeReceipt, ChargeRequest, PaymentError, PaymentGateway};

/// Gateway that approves or declines every charge and counts calls.
#[derive(Clone, Default)]
pub struct ScriptedGateway {
    decline: Arc<AtomicBool>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedGateway {
    pub fn approving() -> Self {
        Self::default()
    }

    pub fn declining() -> Self {
        let gateway = Self::default();
        gateway.decline.store(true, Ordering::SeqCst);
        gateway
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PaymentGateway for ScriptedGateway {
    fn charge(&self, request: &ChargeRequest) -> Result<ChargeReceipt, PaymentError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.decline.load(Ordering::SeqCst) {
            return Err(PaymentError::Declined(format!("card declined for {}", request.user_id)));
        }
        Ok(ChargeReceipt {
            payment_id: format!("pay_{}", n),
        })
    }
}

/// Gateway that parks inside `charge` until the test lets it go.
///
/// `entered()` returns once a charge is in flight, which means the caller
/// holds its checkout lease.
#[derive(Clone)]
pub struct GatedGateway {
    entered_tx: Arc<Mutex<Sender<()>>>,
    entered_rx: Arc<Mutex<Receiver<()>>>,
    release_tx: Arc<Mutex<Sender<()>>>,
    release_rx: Arc<Mutex<Receiver<()>>>,
}

impl GatedGateway {
    pub fn new() -> Self {
        let (entered_tx, entered_rx) = channel();
        let (release_tx, release_rx) = channel();
        GatedGateway {
            entered_tx: Arc::new(Mutex::new(entered_tx)),
            entered_rx: Arc::new(Mutex::new(entered_rx)),
            release_tx: Arc::new(Mutex::new(release_tx)),
            release_rx: Arc::new(Mutex::new(release_rx)),
        }
    }

    pub fn entered(&self, timeout: Duration) -> bool {
        self.entered_rx.lock().unwrap().recv_timeout(timeout).is_ok()
    }

    pub fn release_one(&self) {
        self.release_tx.lock().unwrap().send(()).unwrap();
    }
}

impl PaymentGateway for GatedGateway {
    fn charge(&self, _request: &ChargeRequest) -> Result<ChargeReceipt, PaymentError> {
        self.entered_tx.lock().unwrap().send(()).ok();
        self.release_rx
            .lock()
            .unwrap()
            .recv_timeout(Duration::from_secs(5))
            .map_err(|_| PaymentError::Unavailable("gate never opened".into()))?;
        Ok(ChargeReceipt {
            payment_id: "pay_gated".into(),
        })
    }
}

/// Publisher that forwards to an `InMemoryQueue` but rejects the message at
/// a chosen position (1-based) while armed.
#[derive(Clone, Default)]
pub struct FlakyPublisher {
    pub queue: InMemoryQueue,
    fail_at: Arc<Mutex<Option<usize>>>,
    attempts: Arc<AtomicUsize>,
}

impl FlakyPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the `n`-th publish attempt from now on.
    pub fn fail_at(&self, n: usize) {
        self.attempts.store(0, Ordering::SeqCst);
        *self.fail_at.lock().unwrap() = Some(n);
    }

    pub fn heal(&self) {
        *self.fail_at.lock().unwrap() = None;
    }
}

impl Publisher for FlakyPublisher {
    fn publish(&self, message: Message) -> Result<(), PublishError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if *self.fail_at.lock().unwrap() == Some(attempt) {
            return Err(PublishError::Timeout);
        }
        self.queue.publish(message)
    }
}

/// Ledger whose transactions run their body but fail to commit while armed.
#[derive(Clone, Default)]
pub struct AbortingLedger {
    pub inner: InMemoryLedger,
    failing: Arc<AtomicBool>,
}

impl AbortingLedger {
    pub fn new(inner: InMemoryLedger) -> Self {
        AbortingLedger {
            inner,
            failing: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn fail_commits(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl LedgerStore for AbortingLedger {
    fn read_write<T, E, F>(&self, body: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn Transaction) -> Result<T, E>,
        E: From<StoreError>,
    {
        if !self.failing.load(Ordering::SeqCst) {
            return self.inner.read_write(body);
        }
        self.inner.read_write(|tx| -> Result<T, E> {
            body(tx)?;
            Err(StoreError::Aborted("injected commit failure".into()).into())
        })
    }
}

/// Poll `check` until it holds or `timeout` elapses.
pub fn wait_until(timeout: Duration, mut check: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if check() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    check()
}
