use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outbox event type written alongside every new order.
pub const ORDER_CREATED: &str = "ORDER_CREATED";

/// Lifecycle of an order. `Paid` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Created,
    Confirmed,
    Paid,
    Failed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "CREATED",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Paid => "PAID",
            OrderStatus::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Paid | OrderStatus::Failed)
    }

    /// Only non-terminal orders move, and only into a terminal state.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        !self.is_terminal() && next.is_terminal()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATED" => Ok(OrderStatus::Created),
            "CONFIRMED" => Ok(OrderStatus::Confirmed),
            "PAID" => Ok(OrderStatus::Paid),
            "FAILED" => Ok(OrderStatus::Failed),
            other => Err(format!("unknown order status: {}", other)),
        }
    }
}

/// A committed row of `Orders`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub user_id: String,
    pub total_amount: f64,
    pub status: OrderStatus,
    /// Commit timestamp assigned by the store.
    pub created_at: DateTime<Utc>,
}

/// An order row to insert; the store stamps `created_at` at commit.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub order_id: String,
    pub user_id: String,
    pub total_amount: f64,
    pub status: OrderStatus,
}

/// A row of `OrderItems`, keyed by `(order_id, item_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub order_id: String,
    pub item_id: String,
    pub quantity: u32,
    pub price: f64,
}

/// A committed, not yet relayed row of `Outbox`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboxEvent {
    pub event_id: String,
    /// The order this event describes.
    pub aggregate_id: String,
    pub event_type: String,
    /// Serialized JSON fact.
    pub payload: String,
    pub created_at: DateTime<Utc>,
}

/// An outbox row to insert in the same transaction as its order.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOutboxEvent {
    pub event_id: String,
    pub aggregate_id: String,
    pub event_type: String,
    pub payload: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(!OrderStatus::Created.is_terminal());
        assert!(!OrderStatus::Confirmed.is_terminal());
        assert!(OrderStatus::Paid.is_terminal());
        assert!(OrderStatus::Failed.is_terminal());
    }

    #[test]
    fn no_transition_out_of_terminal() {
        assert!(OrderStatus::Created.can_transition_to(OrderStatus::Paid));
        assert!(OrderStatus::Confirmed.can_transition_to(OrderStatus::Failed));
        assert!(!OrderStatus::Paid.can_transition_to(OrderStatus::Failed));
        assert!(!OrderStatus::Failed.can_transition_to(OrderStatus::Paid));
        assert!(!OrderStatus::Created.can_transition_to(OrderStatus::Confirmed));
    }

    #[test]
    fn status_wire_format() {
        assert_eq!(serde_json::to_string(&OrderStatus::Paid).unwrap(), r#""PAID""#);
        assert_eq!("CONFIRMED".parse::<OrderStatus>(), Ok(OrderStatus::Confirmed));
        assert!("SHIPPED".parse::<OrderStatus>().is_err());
    }
}
