//! The purchase protocol: lease, reserve, charge, commit.
//!
//! ## Example
//!
//! ```
//! use checkout_ledger::checkout::{CartItem, CheckoutCoordinator};
//! use checkout_ledger::ledger::{InMemoryLedger, OrderStatus};
//! use checkout_ledger::lock::InMemoryLeaseLock;
//! use checkout_ledger::payment::SimulatedGateway;
//! use checkout_ledger::reservation::InMemoryReservationLedger;
//!
//! let ledger = InMemoryLedger::new();
//! let coordinator = CheckoutCoordinator::new(
//!     InMemoryLeaseLock::new(),
//!     InMemoryReservationLedger::with_stock([("sku1", 10)]),
//!     SimulatedGateway::new(),
//!     ledger.clone(),
//! );
//!
//! let receipt = coordinator
//!     .purchase("u1", &[CartItem::new("sku1", 2, 9.99)])
//!     .unwrap();
//! assert_eq!(receipt.status, OrderStatus::Confirmed);
//! assert_eq!(ledger.outbox().unwrap().len(), 1);
//! ```

use std::sync::Arc;

use chrono::Utc;

use super::finalize::{commit_order, finalize_order};
use super::reserve::Reservation;
use super::stock::{evaluate, StockEvaluation};
use super::{cart_total, validate_cart, CartItem, CheckoutError, OrderReceipt};
use crate::config::CheckoutConfig;
use crate::ledger::{LedgerStore, OrderStatus};
use crate::lock::{Lease, LeaseGuard, LeaseLock};
use crate::payment::{ChargeRequest, PaymentGateway};
use crate::reconcile::{InMemoryReconciliationLog, ReconciliationLog, UnreconciledCommit};
use crate::reservation::ReservationLedger;

/// Lease key serializing purchases of one user.
pub fn checkout_lock_key(user_id: &str) -> String {
    format!("lock:checkout:{}", user_id)
}

/// Coordinates one purchase across the lease lock, the reservation ledger,
/// the payment gateway and the ledger-of-record.
pub struct CheckoutCoordinator<L, R, P, S> {
    locks: L,
    reservations: R,
    gateway: P,
    ledger: S,
    config: CheckoutConfig,
    reconciliation: Arc<dyn ReconciliationLog>,
}

impl<L, R, P, S> CheckoutCoordinator<L, R, P, S>
where
    L: LeaseLock,
    R: ReservationLedger,
    P: PaymentGateway,
    S: LedgerStore,
{
    pub fn new(locks: L, reservations: R, gateway: P, ledger: S) -> Self {
        CheckoutCoordinator {
            locks,
            reservations,
            gateway,
            ledger,
            config: CheckoutConfig::default(),
            reconciliation: Arc::new(InMemoryReconciliationLog::new()),
        }
    }

    pub fn with_config(mut self, config: CheckoutConfig) -> Self {
        self.config = config;
        self
    }

    /// Route post-payment commit failures to `log`.
    pub fn with_reconciliation_log(mut self, log: Arc<dyn ReconciliationLog>) -> Self {
        self.reconciliation = log;
        self
    }

    pub fn config(&self) -> &CheckoutConfig {
        &self.config
    }

    pub fn ledger(&self) -> &S {
        &self.ledger
    }

    pub fn reservations(&self) -> &R {
        &self.reservations
    }

    /// Run the full reserve-then-commit protocol for `user_id`.
    ///
    /// The lease is held from the first reservation through the commit and is
    /// released on every return path. Failures before the commit leave the
    /// reservation ledger as it was. A failure of the commit itself is
    /// `CommitFailed`: the charge stands, the stock stays decremented, and the
    /// attempt is written to the reconciliation log.
    pub fn purchase(&self, user_id: &str, items: &[CartItem]) -> Result<OrderReceipt, CheckoutError> {
        validate_cart(items)?;

        let key = checkout_lock_key(user_id);
        let guard = LeaseGuard::acquire(
            &self.locks,
            &key,
            self.config.lock_ttl,
            self.config.lock_wait,
        )
        .map_err(|source| {
            tracing::debug!(%user_id, error = %source, "checkout lease unavailable");
            CheckoutError::LockUnavailable {
                user_id: user_id.to_string(),
                source,
            }
        })?;

        let reservation = Reservation::reserve(&self.reservations, items)?;
        tracing::debug!(%user_id, items = reservation.len(), "stock reserved");

        let amount = cart_total(items);
        let request = ChargeRequest {
            user_id: user_id.to_string(),
            items: items.to_vec(),
            amount,
        };
        let receipt = match self.gateway.charge(&request) {
            Ok(receipt) => receipt,
            Err(err) => {
                tracing::warn!(%user_id, amount, error = %err, "payment failed, releasing stock");
                reservation.release(&self.reservations);
                return Err(CheckoutError::PaymentFailed(err));
            }
        };
        tracing::debug!(%user_id, payment_id = %receipt.payment_id, amount, "payment captured");

        if guard.lease().is_some_and(Lease::is_expired) {
            // Another purchase for this user may already be running.
            tracing::warn!(%user_id, ttl = ?self.config.lock_ttl, "checkout lease expired before commit");
        }

        match commit_order(&self.ledger, user_id, items, OrderStatus::Confirmed) {
            Ok(order) => Ok(order),
            Err(source) => {
                tracing::error!(
                    %user_id,
                    payment_id = %receipt.payment_id,
                    amount,
                    error = %source,
                    "order commit failed after payment; manual reconciliation required"
                );
                let entry = UnreconciledCommit {
                    user_id: user_id.to_string(),
                    items: items.to_vec(),
                    amount,
                    payment_id: receipt.payment_id.clone(),
                    error: source.to_string(),
                    recorded_at: Utc::now(),
                };
                if let Err(err) = self.reconciliation.record(entry) {
                    tracing::error!(%user_id, payment_id = %receipt.payment_id, error = %err, "reconciliation record failed");
                }
                Err(CheckoutError::CommitFailed {
                    payment_id: receipt.payment_id,
                    source,
                })
            }
        }
    }

    /// Commit an order with status `CREATED` without locking, reserving or
    /// charging.
    pub fn finalize_order(
        &self,
        user_id: &str,
        items: &[CartItem],
    ) -> Result<OrderReceipt, CheckoutError> {
        finalize_order(&self.ledger, user_id, items)
    }

    /// Clamp a cart to current availability. Never mutates stock.
    pub fn evaluate_stock(&self, items: &[CartItem]) -> Result<StockEvaluation, CheckoutError> {
        evaluate(&self.reservations, items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::InMemoryLedger;
    use crate::lock::InMemoryLeaseLock;
    use crate::payment::SimulatedGateway;
    use crate::reservation::InMemoryReservationLedger;

    type Coordinator = CheckoutCoordinator<
        InMemoryLeaseLock,
        InMemoryReservationLedger,
        SimulatedGateway,
        InMemoryLedger,
    >;

    fn coordinator(stock: i64, gateway: SimulatedGateway) -> Coordinator {
        CheckoutCoordinator::new(
            InMemoryLeaseLock::new(),
            InMemoryReservationLedger::with_stock([("sku1", stock)]),
            gateway,
            InMemoryLedger::new(),
        )
    }

    #[test]
    fn purchase_commits_confirmed_order() {
        let coordinator = coordinator(10, SimulatedGateway::new());
        let receipt = coordinator
            .purchase("u1", &[CartItem::new("sku1", 2, 9.99)])
            .unwrap();

        assert_eq!(receipt.status, OrderStatus::Confirmed);
        assert_eq!(receipt.total, 19.98);
        assert_eq!(coordinator.reservations().available("sku1").unwrap(), 8);

        let order = coordinator.ledger().order(&receipt.order_id).unwrap().unwrap();
        assert_eq!(order.user_id, "u1");
        assert_eq!(coordinator.ledger().order_items(&receipt.order_id).unwrap().len(), 1);
    }

    #[test]
    fn lease_released_after_purchase() {
        let coordinator = coordinator(10, SimulatedGateway::new());
        coordinator.purchase("u1", &[CartItem::new("sku1", 1, 1.0)]).unwrap();
        assert!(coordinator.locks.holder(&checkout_lock_key("u1")).unwrap().is_none());
    }

    #[test]
    fn invalid_cart_rejected_before_lease() {
        let coordinator = coordinator(10, SimulatedGateway::new());
        let err = coordinator.purchase("u1", &[]).unwrap_err();
        assert!(matches!(err, CheckoutError::InvalidCart(_)));
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn declined_payment_restores_stock() {
        let coordinator = coordinator(10, SimulatedGateway::new().with_limit(5.0));
        let err = coordinator
            .purchase("u1", &[CartItem::new("sku1", 3, 9.99)])
            .unwrap_err();

        assert!(matches!(err, CheckoutError::PaymentFailed(_)));
        assert_eq!(coordinator.reservations().available("sku1").unwrap(), 10);
        assert!(coordinator.ledger().orders().unwrap().is_empty());
        assert!(coordinator.locks.holder(&checkout_lock_key("u1")).unwrap().is_none());
    }

    #[test]
    fn held_lease_fails_fast() {
        let coordinator = coordinator(10, SimulatedGateway::new());
        let _held = LeaseGuard::acquire(
            &coordinator.locks,
            &checkout_lock_key("u1"),
            std::time::Duration::from_secs(5),
            None,
        )
        .unwrap();

        let err = coordinator
            .purchase("u1", &[CartItem::new("sku1", 1, 1.0)])
            .unwrap_err();
        assert!(matches!(err, CheckoutError::LockUnavailable { .. }));
        assert!(err.is_retryable());
        assert_eq!(coordinator.reservations().available("sku1").unwrap(), 10);

        // Other users are unaffected.
        assert!(coordinator.purchase("u2", &[CartItem::new("sku1", 1, 1.0)]).is_ok());
    }
}
