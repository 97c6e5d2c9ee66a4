//! Cost of goods sold and physical count adjustments.

use rust_decimal::Decimal;

use crate::ledger::PostingLine;

/// Adjustment amount for a physical count.
///
/// Positive when stock is missing (book exceeds counted), negative for a
/// surplus, zero when the count agrees with the books.
#[must_use]
pub fn periodic_adjustment(counted: Decimal, book: Decimal, unit_cost: Decimal) -> Decimal {
    -(counted - book) * unit_cost
}

/// Voucher lines for a count adjustment, or `None` when the amount is zero.
///
/// A shrinkage debits COGS and credits Inventory; a surplus does the reverse.
#[must_use]
pub fn adjustment_lines(amount: Decimal, cogs_code: &str, inventory_code: &str) -> Option<Vec<PostingLine>> {
    if amount > Decimal::ZERO {
        Some(vec![
            PostingLine::debit(cogs_code, amount).with_memo("Inventory shrinkage"),
            PostingLine::credit(inventory_code, amount).with_memo("Inventory shrinkage"),
        ])
    } else if amount < Decimal::ZERO {
        Some(vec![
            PostingLine::debit(inventory_code, -amount).with_memo("Inventory surplus"),
            PostingLine::credit(cogs_code, -amount).with_memo("Inventory surplus"),
        ])
    } else {
        None
    }
}

/// Voucher lines moving the cost of a sale from Inventory to COGS.
#[must_use]
pub fn sale_cost_lines(cost: Decimal, cogs_code: &str, inventory_code: &str) -> Option<Vec<PostingLine>> {
    if cost <= Decimal::ZERO {
        return None;
    }
    Some(vec![
        PostingLine::debit(cogs_code, cost).with_memo("Cost of goods sold"),
        PostingLine::credit(inventory_code, cost).with_memo("Cost of goods sold"),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::EntryType;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(dec!(95), dec!(100), dec!(2), dec!(10))]
    #[case(dec!(104), dec!(100), dec!(2.5), dec!(-10))]
    #[case(dec!(100), dec!(100), dec!(7), dec!(0))]
    fn test_periodic_adjustment(
        #[case] counted: Decimal,
        #[case] book: Decimal,
        #[case] unit_cost: Decimal,
        #[case] expected: Decimal,
    ) {
        assert_eq!(periodic_adjustment(counted, book, unit_cost), expected);
    }

    #[test]
    fn test_shrinkage_lines() {
        let lines = adjustment_lines(dec!(10), "5100", "1300").unwrap();
        assert_eq!(lines[0].account_code, "5100");
        assert_eq!(lines[0].entry_type, EntryType::Debit);
        assert_eq!(lines[1].account_code, "1300");
        assert_eq!(lines[1].entry_type, EntryType::Credit);
        assert_eq!(lines[1].amount, dec!(10));
    }

    #[test]
    fn test_surplus_lines() {
        let lines = adjustment_lines(dec!(-10), "5100", "1300").unwrap();
        assert_eq!(lines[0].account_code, "1300");
        assert_eq!(lines[0].entry_type, EntryType::Debit);
        assert_eq!(lines[0].amount, dec!(10));
        assert_eq!(lines[1].account_code, "5100");
    }

    #[test]
    fn test_zero_adjustment_has_no_lines() {
        assert!(adjustment_lines(Decimal::ZERO, "5100", "1300").is_none());
        assert!(sale_cost_lines(Decimal::ZERO, "5100", "1300").is_none());
    }

    #[test]
    fn test_sale_cost_lines() {
        let lines = sale_cost_lines(dec!(26), "5100", "1300").unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].signed_amount() + lines[1].signed_amount(), Decimal::ZERO);
    }
}
