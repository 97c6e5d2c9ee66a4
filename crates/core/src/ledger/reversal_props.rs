//! Property-based tests for ReversalService.
//!
//! These tests validate that a reversal exactly cancels its original voucher.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::reversal::ReversalService;
use super::types::{EntryType, PostingLine, VoucherTotals};

/// Strategy for generating random positive Decimal amounts.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for generating account codes from a small pool so lines repeat accounts.
fn arb_account() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("1100".to_string()),
        Just("1300".to_string()),
        Just("2100".to_string()),
        Just("4100".to_string()),
        Just("5100".to_string()),
    ]
}

/// Strategy for generating balanced vouchers: debit lines plus one credit line.
fn arb_balanced_lines() -> impl Strategy<Value = Vec<PostingLine>> {
    (
        prop::collection::vec((arb_account(), arb_amount()), 1..=4),
        arb_account(),
        prop::option::of("[a-zA-Z ]{0,20}"),
    )
        .prop_map(|(debits, credit_account, memo)| {
            let total: Decimal = debits.iter().map(|(_, amount)| *amount).sum();
            let mut lines: Vec<PostingLine> = debits
                .into_iter()
                .map(|(account, amount)| PostingLine::debit(account, amount))
                .collect();
            let mut credit = PostingLine::credit(credit_account, total);
            credit.memo = memo;
            lines.push(credit);
            lines
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// **Property 2.1: Reversal nets every account to zero**
    ///
    /// *For any* voucher, original plus reversal SHALL leave every touched
    /// account with a zero net.
    #[test]
    fn prop_reversal_nets_to_zero(lines in arb_balanced_lines()) {
        let mut combined = lines.clone();
        combined.extend(ReversalService::mirror_lines("JV-1", &lines, "test"));

        for (account, net) in ReversalService::net_by_account(&combined) {
            prop_assert_eq!(net, Decimal::ZERO, "account {} not zeroed", account);
        }
    }

    /// **Property 2.2: Reversal preserves accounts, amounts, and line count**
    #[test]
    fn prop_reversal_mirrors_lines(lines in arb_balanced_lines()) {
        let mirrored = ReversalService::mirror_lines("JV-1", &lines, "test");

        prop_assert_eq!(mirrored.len(), lines.len());
        for (original, reversed) in lines.iter().zip(&mirrored) {
            prop_assert_eq!(&original.account_code, &reversed.account_code);
            prop_assert_eq!(original.amount, reversed.amount);
            prop_assert_eq!(original.entry_type.opposite(), reversed.entry_type);
        }
    }

    /// **Property 2.3: A reversal of a balanced voucher is balanced**
    #[test]
    fn prop_reversal_is_balanced(lines in arb_balanced_lines()) {
        let original = VoucherTotals::from_lines(&lines);
        let reversed = VoucherTotals::from_lines(&ReversalService::mirror_lines("JV-1", &lines, "x"));

        prop_assert_eq!(original.debit, reversed.credit);
        prop_assert_eq!(original.credit, reversed.debit);
        prop_assert!(reversed.is_balanced(Decimal::ZERO));
    }

    /// **Property 2.4: Every reversed line carries the reason**
    #[test]
    fn prop_reversal_memo_has_reason(lines in arb_balanced_lines(), reason in "[a-z]{1,12}") {
        let mirrored = ReversalService::mirror_lines("JV-9", &lines, &reason);
        let prefix = format!("Reversal of JV-9: {reason}");
        for line in &mirrored {
            prop_assert!(line.memo.as_deref().is_some_and(|m| m.starts_with(&prefix)));
        }
        prop_assert!(mirrored.iter().any(|l| l.entry_type == EntryType::Credit));
    }
}
