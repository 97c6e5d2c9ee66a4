//! FIFO lot consumption.

use rust_decimal::Decimal;
use serde::Serialize;
use tally_shared::types::{InventoryLotId, ProductId};

use super::error::InventoryError;

/// Unsold quantity left in one purchase lot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LotBalance {
    /// Lot id.
    pub lot_id: InventoryLotId,
    /// Quantity not yet consumed.
    pub remaining: Decimal,
    /// Purchase cost per unit.
    pub unit_cost: Decimal,
}

/// Quantity taken from one lot by a consumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LotDraw {
    /// Lot id.
    pub lot_id: InventoryLotId,
    /// Quantity taken.
    pub quantity: Decimal,
    /// Lot unit cost.
    pub unit_cost: Decimal,
    /// `quantity * unit_cost`.
    pub cost: Decimal,
    /// Quantity left in the lot afterwards.
    pub remaining_after: Decimal,
}

impl LotDraw {
    /// True when the draw emptied the lot.
    #[must_use]
    pub fn exhausts_lot(&self) -> bool {
        self.remaining_after <= Decimal::ZERO
    }
}

/// Result of consuming stock oldest-first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FifoConsumption {
    /// Quantity consumed.
    pub quantity: Decimal,
    /// Total cost consumed.
    pub cost: Decimal,
    /// Per-lot draws in consumption order.
    pub draws: Vec<LotDraw>,
}

/// Stateless FIFO costing.
pub struct FifoCosting;

impl FifoCosting {
    /// Total unsold quantity across lots.
    #[must_use]
    pub fn available(lots: &[LotBalance]) -> Decimal {
        lots.iter()
            .map(|lot| lot.remaining.max(Decimal::ZERO))
            .sum()
    }

    /// Consumes `quantity` from `lots`, which must be ordered oldest first.
    ///
    /// The oldest lot is drained before the next one is touched; the last lot
    /// drawn may be left partially consumed.
    ///
    /// # Errors
    ///
    /// Returns `NonPositiveQuantity` for `quantity <= 0`, or `Shortage` when
    /// the lots hold less than `quantity`. Nothing is consumed on error.
    pub fn consume(
        product: ProductId,
        lots: &[LotBalance],
        quantity: Decimal,
    ) -> Result<FifoConsumption, InventoryError> {
        if quantity <= Decimal::ZERO {
            return Err(InventoryError::NonPositiveQuantity(quantity));
        }

        let available = Self::available(lots);
        if available < quantity {
            return Err(InventoryError::Shortage {
                product,
                requested: quantity,
                available,
            });
        }

        let mut outstanding = quantity;
        let mut cost = Decimal::ZERO;
        let mut draws = Vec::new();

        for lot in lots.iter().filter(|lot| lot.remaining > Decimal::ZERO) {
            if outstanding.is_zero() {
                break;
            }
            let taken = outstanding.min(lot.remaining);
            let draw_cost = taken * lot.unit_cost;
            outstanding -= taken;
            cost += draw_cost;
            draws.push(LotDraw {
                lot_id: lot.lot_id,
                quantity: taken,
                unit_cost: lot.unit_cost,
                cost: draw_cost,
                remaining_after: lot.remaining - taken,
            });
        }

        Ok(FifoConsumption {
            quantity,
            cost,
            draws,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn lot(remaining: Decimal, unit_cost: Decimal) -> LotBalance {
        LotBalance {
            lot_id: InventoryLotId::new(),
            remaining,
            unit_cost,
        }
    }

    #[test]
    fn test_consume_across_two_lots() {
        let lots = [lot(dec!(10), dec!(2)), lot(dec!(5), dec!(3))];
        let result = FifoCosting::consume(ProductId::new(), &lots, dec!(12)).unwrap();

        assert_eq!(result.cost, dec!(26));
        assert_eq!(result.draws.len(), 2);
        assert_eq!(result.draws[0].lot_id, lots[0].lot_id);
        assert_eq!(result.draws[0].quantity, dec!(10));
        assert!(result.draws[0].exhausts_lot());
        assert_eq!(result.draws[1].quantity, dec!(2));
        assert_eq!(result.draws[1].remaining_after, dec!(3));
        assert!(!result.draws[1].exhausts_lot());
    }

    #[test]
    fn test_consume_within_first_lot() {
        let lots = [lot(dec!(10), dec!(2)), lot(dec!(5), dec!(3))];
        let result = FifoCosting::consume(ProductId::new(), &lots, dec!(4)).unwrap();
        assert_eq!(result.cost, dec!(8));
        assert_eq!(result.draws.len(), 1);
        assert_eq!(result.draws[0].remaining_after, dec!(6));
    }

    #[test]
    fn test_consume_skips_empty_lots() {
        let lots = [lot(dec!(0), dec!(1)), lot(dec!(5), dec!(3))];
        let result = FifoCosting::consume(ProductId::new(), &lots, dec!(5)).unwrap();
        assert_eq!(result.draws.len(), 1);
        assert_eq!(result.draws[0].lot_id, lots[1].lot_id);
        assert_eq!(result.cost, dec!(15));
    }

    #[test]
    fn test_oversell_rejected() {
        let lots = [lot(dec!(10), dec!(2)), lot(dec!(5), dec!(3))];
        let err = FifoCosting::consume(ProductId::new(), &lots, dec!(16)).unwrap_err();
        assert!(matches!(
            err,
            InventoryError::Shortage { requested, available, .. }
                if requested == dec!(16) && available == dec!(15)
        ));
    }

    #[test]
    fn test_non_positive_quantity_rejected() {
        let lots = [lot(dec!(10), dec!(2))];
        assert!(matches!(
            FifoCosting::consume(ProductId::new(), &lots, Decimal::ZERO),
            Err(InventoryError::NonPositiveQuantity(_))
        ));
    }

    #[test]
    fn test_fractional_quantities() {
        let lots = [lot(dec!(1.5), dec!(4.20)), lot(dec!(2), dec!(5))];
        let result = FifoCosting::consume(ProductId::new(), &lots, dec!(2.25)).unwrap();
        assert_eq!(result.cost, dec!(10.05));
    }
}
