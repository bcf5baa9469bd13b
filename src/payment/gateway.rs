use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PaymentError;
use crate::checkout::CartItem;

/// A synchronous charge for the reserved items of one purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeRequest {
    pub user_id: String,
    pub items: Vec<CartItem>,
    pub amount: f64,
}

/// Provider reference for a captured charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeReceipt {
    pub payment_id: String,
}

/// Payment provider client.
///
/// Charges are not idempotent: the coordinator never retries one inline.
pub trait PaymentGateway: Send + Sync {
    fn charge(&self, request: &ChargeRequest) -> Result<ChargeReceipt, PaymentError>;
}

/// Gateway that approves every charge up to an optional limit and keeps a
/// record of what it captured. Used by the demo server and tests.
#[derive(Clone, Default)]
pub struct SimulatedGateway {
    limit: Option<f64>,
    charges: Arc<Mutex<Vec<ChargeRequest>>>,
}

impl SimulatedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decline any charge above `limit`.
    pub fn with_limit(mut self, limit: f64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn charges(&self) -> Vec<ChargeRequest> {
        self.charges
            .lock()
            .map(|charges| charges.clone())
            .unwrap_or_default()
    }
}

impl PaymentGateway for SimulatedGateway {
    fn charge(&self, request: &ChargeRequest) -> Result<ChargeReceipt, PaymentError> {
        if let Some(limit) = self.limit {
            if request.amount > limit {
                return Err(PaymentError::Declined(format!(
                    "amount {} exceeds limit {}",
                    request.amount, limit
                )));
            }
        }
        self.charges
            .lock()
            .map_err(|_| PaymentError::Unavailable("charge log poisoned".into()))?
            .push(request.clone());
        Ok(ChargeReceipt {
            payment_id: format!("pay_{}", Uuid::new_v4().simple()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(amount: f64) -> ChargeRequest {
        ChargeRequest {
            user_id: "u1".into(),
            items: vec![CartItem::new("sku1", 1, amount)],
            amount,
        }
    }

    #[test]
    fn approves_and_records() {
        let gateway = SimulatedGateway::new();
        let receipt = gateway.charge(&request(10.0)).unwrap();
        assert!(receipt.payment_id.starts_with("pay_"));
        assert_eq!(gateway.charges().len(), 1);
    }

    #[test]
    fn declines_above_limit() {
        let gateway = SimulatedGateway::new().with_limit(50.0);
        assert!(gateway.charge(&request(50.0)).is_ok());
        assert!(matches!(
            gateway.charge(&request(50.01)),
            Err(PaymentError::Declined(_))
        ));
        assert_eq!(gateway.charges().len(), 1);
    }
}
