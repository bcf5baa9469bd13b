use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{CartItem, CheckoutError};
use crate::reservation::ReservationLedger;

/// A cart adjusted to what the reservation ledger can currently satisfy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockEvaluation {
    pub items: Vec<CartItem>,
    /// `true` when any quantity was reduced or any item removed.
    pub changed: bool,
}

/// Clamp each requested quantity to the available count.
///
/// Items with nothing available are dropped. Lines naming the same item draw
/// from one shared count, so the returned cart never asks for more of an item
/// than is in stock. Read-only: no counter is touched, so the answer can be
/// stale by the time a purchase runs.
pub(crate) fn evaluate<R>(ledger: &R, items: &[CartItem]) -> Result<StockEvaluation, CheckoutError>
where
    R: ReservationLedger + ?Sized,
{
    let mut remaining: HashMap<&str, i64> = HashMap::new();
    let mut adjusted = Vec::with_capacity(items.len());
    let mut changed = false;

    for item in items {
        let left = match remaining.get(item.item_id.as_str()) {
            Some(left) => *left,
            None => ledger.available(&item.item_id)?,
        };
        if left <= 0 {
            changed = true;
            remaining.insert(&item.item_id, 0);
            continue;
        }

        let granted = u32::try_from(left).unwrap_or(u32::MAX).min(item.quantity);
        remaining.insert(&item.item_id, left - i64::from(granted));
        if granted < item.quantity {
            changed = true;
            adjusted.push(CartItem {
                quantity: granted,
                ..item.clone()
            });
        } else {
            adjusted.push(item.clone());
        }
    }

    Ok(StockEvaluation {
        items: adjusted,
        changed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reservation::InMemoryReservationLedger;

    #[test]
    fn clamps_to_available() {
        let ledger = InMemoryReservationLedger::with_stock([("sku1", 3)]);
        let eval = evaluate(&ledger, &[CartItem::new("sku1", 5, 9.99)]).unwrap();
        assert!(eval.changed);
        assert_eq!(eval.items, vec![CartItem::new("sku1", 3, 9.99)]);
        // Read-only.
        assert_eq!(ledger.available("sku1").unwrap(), 3);
    }

    #[test]
    fn drops_unavailable_items() {
        let ledger = InMemoryReservationLedger::with_stock([("sku1", 0), ("sku2", 4)]);
        let eval = evaluate(
            &ledger,
            &[
                CartItem::new("sku1", 1, 1.0),
                CartItem::new("sku2", 2, 1.0),
                CartItem::new("unknown", 1, 1.0),
            ],
        )
        .unwrap();
        assert!(eval.changed);
        assert_eq!(eval.items, vec![CartItem::new("sku2", 2, 1.0)]);
    }

    #[test]
    fn repeated_item_shares_one_count() {
        let ledger = InMemoryReservationLedger::with_stock([("sku1", 3)]);
        let eval = evaluate(
            &ledger,
            &[
                CartItem::new("sku1", 5, 1.0),
                CartItem::new("sku1", 5, 1.0),
            ],
        )
        .unwrap();
        assert!(eval.changed);
        assert_eq!(eval.items, vec![CartItem::new("sku1", 3, 1.0)]);

        let eval = evaluate(
            &ledger,
            &[
                CartItem::new("sku1", 2, 1.0),
                CartItem::new("sku1", 2, 1.0),
            ],
        )
        .unwrap();
        let offered: u32 = eval.items.iter().map(|item| item.quantity).sum();
        assert_eq!(offered, 3);
        assert!(eval.changed);
    }

    #[test]
    fn unchanged_when_everything_fits() {
        let ledger = InMemoryReservationLedger::with_stock([("sku1", 10)]);
        let items = vec![CartItem::new("sku1", 10, 2.5)];
        let eval = evaluate(&ledger, &items).unwrap();
        assert!(!eval.changed);
        assert_eq!(eval.items, items);
    }
}
