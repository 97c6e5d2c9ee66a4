//! Period closing: zero revenue and expense accounts into retained earnings.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::chart::AccountType;
use crate::ledger::PostingLine;

/// Unclosed debit and credit totals of one account within the period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemporaryBalance {
    /// Account code.
    pub account_code: String,
    /// Account type; only revenue and expense are closed.
    pub account_type: AccountType,
    /// Total debits dated within the period.
    pub debit: Decimal,
    /// Total credits dated within the period.
    pub credit: Decimal,
}

/// Closing voucher lines and the figures behind them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClosingPlan {
    /// Lines of the closing voucher; empty when every balance is zero.
    pub lines: Vec<PostingLine>,
    /// Net revenue (credit balance) closed.
    pub total_revenue: Decimal,
    /// Net expenses (debit balance) closed.
    pub total_expenses: Decimal,
    /// Revenue minus expenses.
    pub net_income: Decimal,
}

impl ClosingPlan {
    /// True when there is nothing to post.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Stateless closing entry builder.
pub struct ClosingService;

impl ClosingService {
    /// Builds the closing voucher.
    ///
    /// Each revenue account is debited by its credit balance and each expense
    /// account is credited by its debit balance; an account whose balance runs
    /// against its normal side gets the opposite line. The difference goes to
    /// retained earnings: credit for a profit, debit for a loss. Zero balances
    /// and permanent accounts produce no line.
    #[must_use]
    pub fn plan(balances: &[TemporaryBalance], retained_earnings_code: &str) -> ClosingPlan {
        let mut lines = Vec::new();
        let mut total_revenue = Decimal::ZERO;
        let mut total_expenses = Decimal::ZERO;

        for balance in balances.iter().filter(|b| b.account_type.is_temporary()) {
            let net = balance.account_type.balance(balance.debit, balance.credit);
            if net.is_zero() {
                continue;
            }

            let memo = format!("Close {}", balance.account_code);
            if balance.account_type == AccountType::Revenue {
                total_revenue += net;
            } else {
                total_expenses += net;
            }

            // Post against the normal side, or with it when the balance is negative.
            let closing_side = balance.account_type.normal_balance().opposite();
            let line = PostingLine {
                account_code: balance.account_code.clone(),
                entry_type: if net > Decimal::ZERO {
                    closing_side
                } else {
                    closing_side.opposite()
                },
                amount: net.abs(),
                memo: Some(memo),
            };
            lines.push(line);
        }

        let net_income = total_revenue - total_expenses;
        if net_income > Decimal::ZERO {
            lines.push(
                PostingLine::credit(retained_earnings_code, net_income).with_memo("Net income for the period"),
            );
        } else if net_income < Decimal::ZERO {
            lines.push(
                PostingLine::debit(retained_earnings_code, -net_income).with_memo("Net loss for the period"),
            );
        }

        ClosingPlan {
            lines,
            total_revenue,
            total_expenses,
            net_income,
        }
    }
}
