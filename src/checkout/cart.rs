use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::CheckoutError;

/// One requested line of a purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub item_id: String,
    pub quantity: u32,
    /// Unit price.
    pub price: f64,
}

impl CartItem {
    pub fn new(item_id: impl Into<String>, quantity: u32, price: f64) -> Self {
        CartItem {
            item_id: item_id.into(),
            quantity,
            price,
        }
    }

    pub fn subtotal(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

/// Sum of quantity × price. No rounding is applied.
pub fn cart_total(items: &[CartItem]) -> f64 {
    items.iter().map(CartItem::subtotal).sum()
}

/// Reject carts that could not be committed as one order: empty carts, zero
/// quantities, negative or non-finite prices, and an item on more than one
/// line (`OrderItems` holds one row per item and order).
pub(crate) fn validate_cart(items: &[CartItem]) -> Result<(), CheckoutError> {
    if items.is_empty() {
        return Err(CheckoutError::InvalidCart("cart is empty".into()));
    }

    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if item.quantity == 0 {
            return Err(CheckoutError::InvalidCart(format!(
                "item {} has zero quantity",
                item.item_id
            )));
        }
        if !item.price.is_finite() || item.price < 0.0 {
            return Err(CheckoutError::InvalidCart(format!(
                "item {} has invalid price {}",
                item.item_id, item.price
            )));
        }
        if !seen.insert(item.item_id.as_str()) {
            return Err(CheckoutError::InvalidCart(format!(
                "item {} appears on more than one line",
                item.item_id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_sums_line_items() {
        let items = [CartItem::new("sku1", 2, 9.99), CartItem::new("sku2", 1, 0.5)];
        assert_eq!(cart_total(&items[..1]), 19.98);
        assert!((cart_total(&items) - 20.48).abs() < 1e-9);
        assert_eq!(cart_total(&[]), 0.0);
    }

    #[test]
    fn rejects_empty_and_zero_quantity() {
        assert!(matches!(validate_cart(&[]), Err(CheckoutError::InvalidCart(_))));
        assert!(matches!(
            validate_cart(&[CartItem::new("sku1", 0, 1.0)]),
            Err(CheckoutError::InvalidCart(_))
        ));
        assert!(validate_cart(&[CartItem::new("sku1", 1, 1.0)]).is_ok());
    }

    #[test]
    fn rejects_negative_and_non_finite_prices() {
        assert!(matches!(
            validate_cart(&[CartItem::new("sku1", 1, -0.01)]),
            Err(CheckoutError::InvalidCart(_))
        ));
        assert!(matches!(
            validate_cart(&[CartItem::new("sku1", 1, f64::NAN)]),
            Err(CheckoutError::InvalidCart(_))
        ));
        // Free items are fine.
        assert!(validate_cart(&[CartItem::new("sku1", 1, 0.0)]).is_ok());
    }

    #[test]
    fn rejects_item_on_two_lines() {
        let err = validate_cart(&[
            CartItem::new("sku1", 1, 5.0),
            CartItem::new("sku2", 1, 5.0),
            CartItem::new("sku1", 2, 5.0),
        ])
        .unwrap_err();
        assert!(matches!(err, CheckoutError::InvalidCart(ref msg) if msg.contains("sku1")));
    }
}
