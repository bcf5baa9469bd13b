//! Record of checkouts that charged the customer but failed to commit.
//!
//! A ledger commit failure after a successful charge cannot be compensated
//! locally: retrying the charge risks a double payment and the stock is
//! already decremented. Such checkouts are written here for the out-of-band
//! sweep that compares provider records against the ledger-of-record.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::checkout::CartItem;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnreconciledCommit {
    pub user_id: String,
    pub items: Vec<CartItem>,
    pub amount: f64,
    /// Provider reference of the captured charge.
    pub payment_id: String,
    pub error: String,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconcileError {
    #[error("reconciliation log poisoned")]
    Poisoned,
}

/// Durable sink for unreconciled commits.
pub trait ReconciliationLog: Send + Sync {
    fn record(&self, entry: UnreconciledCommit) -> Result<(), ReconcileError>;
}

#[derive(Clone, Default)]
pub struct InMemoryReconciliationLog {
    entries: Arc<Mutex<Vec<UnreconciledCommit>>>,
}

impl InMemoryReconciliationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<UnreconciledCommit> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }
}

impl ReconciliationLog for InMemoryReconciliationLog {
    fn record(&self, entry: UnreconciledCommit) -> Result<(), ReconcileError> {
        self.entries
            .lock()
            .map_err(|_| ReconcileError::Poisoned)?
            .push(entry);
        Ok(())
    }
}
