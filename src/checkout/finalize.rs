use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::{cart_total, validate_cart, CartItem, CheckoutError};
use crate::ledger::{
    LedgerStore, NewOrder, NewOutboxEvent, OrderItem, OrderStatus, StoreError, ORDER_CREATED,
};

/// What a committed checkout produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub order_id: String,
    /// Id of the `ORDER_CREATED` outbox event written with the order.
    pub event_id: String,
    pub total: f64,
    pub status: OrderStatus,
}

/// Commit an order for items that were already validated and reserved.
///
/// Touches neither the lease nor the reservation ledger. The order is written
/// with status `CREATED`.
pub fn finalize_order<S>(
    ledger: &S,
    user_id: &str,
    items: &[CartItem],
) -> Result<OrderReceipt, CheckoutError>
where
    S: LedgerStore + ?Sized,
{
    validate_cart(items)?;
    Ok(commit_order(ledger, user_id, items, OrderStatus::Created)?)
}

/// One transaction: the order, each of its items, and exactly one
/// `ORDER_CREATED` outbox event. All of it commits or none of it does.
pub(crate) fn commit_order<S>(
    ledger: &S,
    user_id: &str,
    items: &[CartItem],
    status: OrderStatus,
) -> Result<OrderReceipt, StoreError>
where
    S: LedgerStore + ?Sized,
{
    let order_id = Uuid::new_v4().to_string();
    let event_id = Uuid::new_v4().to_string();
    let total = cart_total(items);
    let payload = json!({
        "order_id": order_id,
        "user_id": user_id,
        "total": total,
    })
    .to_string();

    ledger.read_write(|tx| -> Result<(), StoreError> {
        tx.insert_order(NewOrder {
            order_id: order_id.clone(),
            user_id: user_id.to_string(),
            total_amount: total,
            status,
        })?;

        for item in items {
            tx.insert_order_item(OrderItem {
                order_id: order_id.clone(),
                item_id: item.item_id.clone(),
                quantity: item.quantity,
                price: item.price,
            })?;
        }

        tx.insert_outbox_event(NewOutboxEvent {
            event_id: event_id.clone(),
            aggregate_id: order_id.clone(),
            event_type: ORDER_CREATED.to_string(),
            payload: payload.clone(),
        })
    })?;

    tracing::info!(%order_id, %user_id, total, %status, "order committed");
    Ok(OrderReceipt {
        order_id,
        event_id,
        total,
        status,
    })
}
