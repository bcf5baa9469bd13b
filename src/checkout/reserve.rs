use super::{CartItem, CheckoutError};
use crate::reservation::ReservationLedger;

/// Stock taken from the reservation ledger by one purchase attempt.
///
/// Holds exactly what was decremented so it can be handed back with
/// matching increments.
#[derive(Debug, Default)]
pub(crate) struct Reservation {
    held: Vec<(String, u32)>,
}

impl Reservation {
    /// Decrement every item in order.
    ///
    /// When an item goes negative it is incremented back, the remaining items
    /// are not attempted, and the items already taken by this call are
    /// released too, so a failed call leaves no net decrement behind.
    pub(crate) fn reserve<R>(ledger: &R, items: &[CartItem]) -> Result<Self, CheckoutError>
    where
        R: ReservationLedger + ?Sized,
    {
        let mut reservation = Reservation::default();

        for item in items {
            let remaining = match ledger.decrement(&item.item_id, item.quantity) {
                Ok(remaining) => remaining,
                Err(err) => {
                    reservation.release(ledger);
                    return Err(err.into());
                }
            };

            if remaining < 0 {
                tracing::warn!(
                    item_id = %item.item_id,
                    requested = item.quantity,
                    remaining,
                    "insufficient stock, compensating"
                );
                if let Err(err) = ledger.increment(&item.item_id, item.quantity) {
                    tracing::error!(item_id = %item.item_id, error = %err, "stock compensation failed");
                }
                reservation.release(ledger);
                return Err(CheckoutError::OutOfStock {
                    item_id: item.item_id.clone(),
                    requested: item.quantity,
                });
            }

            reservation.held.push((item.item_id.clone(), item.quantity));
        }

        Ok(reservation)
    }

    /// Give every held item back. Failures are logged; the caller's error
    /// is what gets reported.
    pub(crate) fn release<R>(self, ledger: &R)
    where
        R: ReservationLedger + ?Sized,
    {
        for (item_id, quantity) in self.held.into_iter().rev() {
            if let Err(err) = ledger.increment(&item_id, quantity) {
                tracing::error!(%item_id, quantity, error = %err, "stock compensation failed");
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.held.len()
    }
}
