//! Property-based tests for LedgerService.
//!
//! - Property 1: Voucher Balance Integrity
//! - Property 7: Locked Periods Reject Postings

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use tally_shared::types::{BALANCE_TOLERANCE, FiscalPeriodId};

use super::error::LedgerError;
use super::service::{LedgerService, PostingGuard, PostingPeriod};
use super::types::PostingLine;
use crate::chart::{AccountInfo, AccountType};
use crate::fiscal::PeriodState;

/// Strategy to generate positive decimal amounts (0.01 to 10,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate 1-5 positive amounts.
fn amounts() -> impl Strategy<Value = Vec<Decimal>> {
    prop::collection::vec(positive_amount(), 1..=5)
}

/// Account lookup that always finds an active account.
fn ok_lookup(code: &str) -> Option<AccountInfo> {
    Some(AccountInfo {
        code: code.to_string(),
        account_type: AccountType::Asset,
        is_active: true,
    })
}

/// Debit lines for every amount, balanced by a single credit line.
fn balanced_lines(debits: &[Decimal]) -> Vec<PostingLine> {
    let total: Decimal = debits.iter().copied().sum();
    let mut lines: Vec<PostingLine> = debits
        .iter()
        .enumerate()
        .map(|(i, amount)| PostingLine::debit(format!("6{i:03}"), *amount))
        .collect();
    lines.push(PostingLine::credit("1100", total));
    lines
}

fn period_day(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 6, day).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // =========================================================================
    // Property 1: Voucher Balance Integrity
    // =========================================================================

    /// Property 1.1: Balanced vouchers are accepted.
    ///
    /// *For any* set of debit lines balanced by a credit line, validation
    /// SHALL succeed and the totals SHALL be equal.
    #[test]
    fn prop_balanced_voucher_accepted(debits in amounts()) {
        let lines = balanced_lines(&debits);
        let totals = LedgerService::validate_lines(&lines, BALANCE_TOLERANCE, ok_lookup);

        prop_assert!(totals.is_ok(), "Balanced voucher should be accepted");
        let totals = totals.unwrap();
        prop_assert_eq!(totals.debit, totals.credit);
    }

    /// Property 1.2: Vouchers off by more than the tolerance are rejected.
    ///
    /// *For any* voucher whose credit side is skewed by more than 0.01,
    /// validation SHALL fail with UnbalancedVoucher.
    #[test]
    fn prop_unbalanced_voucher_rejected(
        debits in amounts(),
        skew_cents in 2i64..100_000i64,
        skew_up in any::<bool>(),
    ) {
        let mut lines = balanced_lines(&debits);
        let skew = Decimal::new(skew_cents, 2);
        let last = lines.len() - 1;
        if skew_up {
            lines[last].amount += skew;
        } else {
            prop_assume!(lines[last].amount > skew);
            lines[last].amount -= skew;
        }

        let result = LedgerService::validate_lines(&lines, BALANCE_TOLERANCE, ok_lookup);
        prop_assert!(
            matches!(result, Err(LedgerError::UnbalancedVoucher { .. })),
            "Unbalanced voucher should be rejected"
        );
    }

    /// Property 1.3: A one-cent difference is within tolerance.
    #[test]
    fn prop_one_cent_difference_tolerated(amount in positive_amount()) {
        let lines = vec![
            PostingLine::debit("1100", amount + Decimal::new(1, 2)),
            PostingLine::credit("4100", amount),
        ];
        prop_assert!(LedgerService::validate_lines(&lines, BALANCE_TOLERANCE, ok_lookup).is_ok());
    }

    // =========================================================================
    // Property 7: Locked Periods Reject Postings
    // =========================================================================

    /// Property 7.1: Any date inside a locked period is rejected.
    #[test]
    fn prop_locked_period_rejects_every_date(day in 1u32..=30) {
        let period = PostingPeriod {
            id: FiscalPeriodId::new(),
            start_date: period_day(1),
            end_date: period_day(30),
            state: PeriodState::Locked,
        };
        let result = LedgerService::check_posting_period(
            period_day(day),
            None,
            Some(&period),
            false,
            PostingGuard::Regular,
        );
        prop_assert!(
            matches!(result, Err(LedgerError::PeriodLocked { .. })),
            "expected PeriodLocked error"
        );
    }
}
