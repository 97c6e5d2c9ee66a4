//! Property-based tests for ClosingService.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::closing::{ClosingService, TemporaryBalance};
use crate::chart::AccountType;
use crate::ledger::{EntryType, ReversalService, VoucherTotals};

fn arb_amount() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn arb_temporary_type() -> impl Strategy<Value = AccountType> {
    prop_oneof![Just(AccountType::Revenue), Just(AccountType::Expense)]
}

/// Up to 8 distinct temporary accounts with arbitrary debit/credit totals.
fn arb_balances() -> impl Strategy<Value = Vec<TemporaryBalance>> {
    prop::collection::vec((arb_temporary_type(), arb_amount(), arb_amount()), 0..8).prop_map(
        |rows| {
            rows.into_iter()
                .enumerate()
                .map(|(i, (account_type, debit, credit))| TemporaryBalance {
                    account_code: format!("{}{i:03}", if account_type == AccountType::Revenue { 4 } else { 6 }),
                    account_type,
                    debit,
                    credit,
                })
                .collect()
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// **Property 3.1: The closing voucher is always balanced**
    #[test]
    fn prop_closing_voucher_balanced(balances in arb_balances()) {
        let plan = ClosingService::plan(&balances, "3200");
        let totals = VoucherTotals::from_lines(&plan.lines);
        prop_assert_eq!(totals.debit, totals.credit);
        prop_assert!(plan.lines.iter().all(|l| l.amount > Decimal::ZERO));
    }

    /// **Property 3.2: Closing zeroes every temporary account**
    ///
    /// *For any* set of balances, applying the closing lines SHALL leave each
    /// revenue and expense account with a zero net.
    #[test]
    fn prop_closing_zeroes_temporary_accounts(balances in arb_balances()) {
        let plan = ClosingService::plan(&balances, "3200");
        let closing_net = ReversalService::net_by_account(&plan.lines);

        for balance in &balances {
            let before = balance.debit - balance.credit;
            let applied = closing_net.get(&balance.account_code).copied().unwrap_or_default();
            prop_assert_eq!(before + applied, Decimal::ZERO);
        }
    }

    /// **Property 3.3: Retained earnings absorbs exactly the net income**
    #[test]
    fn prop_retained_earnings_equals_net_income(balances in arb_balances()) {
        let plan = ClosingService::plan(&balances, "3200");
        let re: Decimal = plan
            .lines
            .iter()
            .filter(|l| l.account_code == "3200")
            .map(|l| match l.entry_type {
                EntryType::Credit => l.amount,
                EntryType::Debit => -l.amount,
            })
            .sum();
        prop_assert_eq!(re, plan.net_income);
        prop_assert_eq!(plan.net_income, plan.total_revenue - plan.total_expenses);
    }
}
