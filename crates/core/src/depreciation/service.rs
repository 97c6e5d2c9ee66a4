//! Straight-line monthly depreciation.

use rust_decimal::Decimal;
use serde::Serialize;
use tally_shared::types::round_currency;

use super::error::DepreciationError;
use crate::ledger::PostingLine;

/// One month's charge and the asset position after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DepreciationCharge {
    /// Amount to post.
    pub amount: Decimal,
    /// Accumulated depreciation including this charge.
    pub accumulated: Decimal,
    /// Remaining book value.
    pub book_value: Decimal,
}

/// Stateless depreciation calculator.
pub struct DepreciationService;

impl DepreciationService {
    /// Checks asset parameters at registration.
    ///
    /// # Errors
    ///
    /// Returns `NonPositiveValue` or `InvalidRate`.
    pub fn validate_asset(acquisition_value: Decimal, monthly_rate: Decimal) -> Result<(), DepreciationError> {
        if acquisition_value <= Decimal::ZERO {
            return Err(DepreciationError::NonPositiveValue(acquisition_value));
        }
        if monthly_rate <= Decimal::ZERO || monthly_rate > Decimal::ONE {
            return Err(DepreciationError::InvalidRate(monthly_rate));
        }
        Ok(())
    }

    /// `acquisition_value * monthly_rate`, rounded to cents.
    #[must_use]
    pub fn monthly_amount(acquisition_value: Decimal, monthly_rate: Decimal) -> Decimal {
        round_currency(acquisition_value * monthly_rate)
    }

    /// Charge for the next month, capped at the remaining book value.
    ///
    /// Returns `None` once the asset is fully depreciated.
    #[must_use]
    pub fn charge(
        acquisition_value: Decimal,
        monthly_rate: Decimal,
        accumulated: Decimal,
    ) -> Option<DepreciationCharge> {
        let book_value = acquisition_value - accumulated;
        if book_value <= Decimal::ZERO {
            return None;
        }
        let amount = Self::monthly_amount(acquisition_value, monthly_rate).min(book_value);
        if amount <= Decimal::ZERO {
            return None;
        }
        Some(DepreciationCharge {
            amount,
            accumulated: accumulated + amount,
            book_value: book_value - amount,
        })
    }

    /// Debit depreciation expense, credit accumulated depreciation.
    #[must_use]
    pub fn lines(amount: Decimal, expense_code: &str, accumulated_code: &str, memo: &str) -> Vec<PostingLine> {
        vec![
            PostingLine::debit(expense_code, amount).with_memo(memo),
            PostingLine::credit(accumulated_code, amount).with_memo(memo),
        ]
    }
}
