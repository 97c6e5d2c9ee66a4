//! Reversal service for undoing posted vouchers.
//!
//! A reversal is a new voucher with debits and credits swapped; the
//! original voucher is never touched.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::PostingLine;

/// Stateless service for building reversing vouchers.
pub struct ReversalService;

impl ReversalService {
    /// Checks that a voucher may be reversed.
    ///
    /// `reverses` is the voucher's own reversal marker; `reversed_by` is the
    /// existing reversal of it, if any.
    ///
    /// # Errors
    ///
    /// Returns `ReversalOfReversal` or `VoucherAlreadyReversed`.
    pub fn check_reversible(
        voucher_number: &str,
        reverses: Option<&str>,
        reversed_by: Option<&str>,
    ) -> Result<(), LedgerError> {
        if reverses.is_some() {
            return Err(LedgerError::ReversalOfReversal(voucher_number.to_string()));
        }
        if let Some(reversal) = reversed_by {
            return Err(LedgerError::VoucherAlreadyReversed {
                voucher: voucher_number.to_string(),
                reversal: reversal.to_string(),
            });
        }
        Ok(())
    }

    /// Mirror lines: same accounts and amounts, sides swapped.
    ///
    /// Each memo reads `Reversal of <voucher>: <reason>`, followed by the
    /// original memo when there was one.
    #[must_use]
    pub fn mirror_lines(voucher_number: &str, lines: &[PostingLine], reason: &str) -> Vec<PostingLine> {
        lines
            .iter()
            .map(|line| {
                let memo = match line.memo.as_deref() {
                    Some(original) if !original.is_empty() => {
                        format!("Reversal of {voucher_number}: {reason} - {original}")
                    }
                    _ => format!("Reversal of {voucher_number}: {reason}"),
                };
                PostingLine {
                    account_code: line.account_code.clone(),
                    entry_type: line.entry_type.opposite(),
                    amount: line.amount,
                    memo: Some(memo),
                }
            })
            .collect()
    }

    /// Description of the reversing voucher.
    #[must_use]
    pub fn description(voucher_number: &str, reason: &str) -> String {
        format!("Reversal of voucher {voucher_number}. Reason: {reason}")
    }

    /// Signed net (debit − credit) per account.
    #[must_use]
    pub fn net_by_account(lines: &[PostingLine]) -> BTreeMap<String, Decimal> {
        let mut net = BTreeMap::new();
        for line in lines {
            *net.entry(line.account_code.clone()).or_insert(Decimal::ZERO) += line.signed_amount();
        }
        net
    }
}
