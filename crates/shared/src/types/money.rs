//! Money helpers with decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Every amount in the ledger is a `rust_decimal::Decimal`.

use rust_decimal::{Decimal, RoundingStrategy};

/// Largest difference between voucher debits and credits still treated as balanced (0.01).
pub const BALANCE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Decimal places kept for posted currency amounts.
pub const CURRENCY_SCALE: u32 = 2;

/// Decimal places kept for per-unit inventory costs.
pub const UNIT_COST_SCALE: u32 = 4;

/// Returns true if `debit` and `credit` differ by no more than `tolerance`.
#[must_use]
pub fn is_within_tolerance(debit: Decimal, credit: Decimal, tolerance: Decimal) -> bool {
    (debit - credit).abs() <= tolerance
}

/// Rounds an amount to currency precision using Banker's Rounding.
#[must_use]
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointNearestEven)
}

/// Rounds a unit cost to four decimal places using Banker's Rounding.
#[must_use]
pub fn round_unit_cost(cost: Decimal) -> Decimal {
    cost.round_dp_with_strategy(UNIT_COST_SCALE, RoundingStrategy::MidpointNearestEven)
}
