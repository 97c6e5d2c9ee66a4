//! Moving weighted-average cost.

use rust_decimal::Decimal;
use tally_shared::types::round_unit_cost;

use super::error::InventoryError;

/// Checks a purchase before it is recorded.
///
/// # Errors
///
/// Returns `NonPositiveQuantity` or `NegativeUnitCost`.
pub fn validate_purchase(quantity: Decimal, unit_cost: Decimal) -> Result<(), InventoryError> {
    if quantity <= Decimal::ZERO {
        return Err(InventoryError::NonPositiveQuantity(quantity));
    }
    if unit_cost < Decimal::ZERO {
        return Err(InventoryError::NegativeUnitCost(unit_cost));
    }
    Ok(())
}

/// New average unit cost after receiving `new_qty` units at `new_cost`.
///
/// `(old_cost * old_qty + new_cost * new_qty) / (old_qty + new_qty)`, rounded
/// to four decimal places. With no stock on hand the purchase cost is taken
/// as-is.
#[must_use]
pub fn moving_average_cost(
    old_cost: Decimal,
    old_qty: Decimal,
    new_cost: Decimal,
    new_qty: Decimal,
) -> Decimal {
    let total_qty = old_qty + new_qty;
    if old_qty <= Decimal::ZERO || total_qty <= Decimal::ZERO {
        return round_unit_cost(new_cost);
    }
    round_unit_cost((old_cost * old_qty + new_cost * new_qty) / total_qty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(dec!(10), dec!(100), dec!(13), dec!(50), dec!(11))]
    #[case(dec!(0), dec!(0), dec!(7.5), dec!(20), dec!(7.5))]
    #[case(dec!(2), dec!(1), dec!(3), dec!(2), dec!(2.6667))]
    #[case(dec!(5), dec!(10), dec!(5), dec!(10), dec!(5))]
    fn test_moving_average(
        #[case] old_cost: Decimal,
        #[case] old_qty: Decimal,
        #[case] new_cost: Decimal,
        #[case] new_qty: Decimal,
        #[case] expected: Decimal,
    ) {
        assert_eq!(moving_average_cost(old_cost, old_qty, new_cost, new_qty), expected);
    }

    #[test]
    fn test_negative_stock_takes_purchase_cost() {
        assert_eq!(moving_average_cost(dec!(9), dec!(-3), dec!(4), dec!(10)), dec!(4));
    }

    #[test]
    fn test_validate_purchase() {
        assert!(validate_purchase(dec!(1), dec!(0)).is_ok());
        assert!(matches!(
            validate_purchase(dec!(0), dec!(1)),
            Err(InventoryError::NonPositiveQuantity(_))
        ));
        assert!(matches!(
            validate_purchase(dec!(1), dec!(-0.01)),
            Err(InventoryError::NegativeUnitCost(_))
        ));
    }
}
