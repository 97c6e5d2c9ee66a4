//! Ledger service for voucher validation.
//!
//! This module provides the core business logic for validating vouchers
//! before they are persisted to the database.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tally_shared::types::FiscalPeriodId;

use super::error::LedgerError;
use super::types::{PostingLine, VoucherTotals};
use crate::chart::AccountInfo;
use crate::fiscal::PeriodState;

/// Fiscal period as seen by the posting check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostingPeriod {
    /// Period id.
    pub id: FiscalPeriodId,
    /// First day of the period.
    pub start_date: NaiveDate,
    /// Last day of the period.
    pub end_date: NaiveDate,
    /// Lifecycle state.
    pub state: PeriodState,
}

impl PostingPeriod {
    /// Returns true if the given date falls within this period.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}

/// Which period states a posting may bypass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostingGuard {
    /// Locked and closed periods reject the posting.
    #[default]
    Regular,
    /// The closing voucher of this period may post while it is locked.
    ClosingPeriod(FiscalPeriodId),
}

/// Ledger service for voucher validation.
///
/// This service contains pure business logic with no database dependencies.
pub struct LedgerService;

impl LedgerService {
    /// Validates voucher lines before persisting.
    ///
    /// Checks, in order:
    /// 1. At least two lines
    /// 2. Every amount is positive
    /// 3. Every account exists and is active
    /// 4. Debits equal credits within `tolerance`
    ///
    /// # Errors
    ///
    /// Returns the first `LedgerError` encountered.
    pub fn validate_lines<A>(
        lines: &[PostingLine],
        tolerance: Decimal,
        account_lookup: A,
    ) -> Result<VoucherTotals, LedgerError>
    where
        A: Fn(&str) -> Option<AccountInfo>,
    {
        if lines.len() < 2 {
            return Err(LedgerError::InsufficientEntries);
        }

        if let Some(line) = lines.iter().find(|l| l.amount <= Decimal::ZERO) {
            return Err(LedgerError::NonPositiveAmount {
                account_code: line.account_code.clone(),
                amount: line.amount,
            });
        }

        for line in lines {
            let account = account_lookup(&line.account_code)
                .ok_or_else(|| LedgerError::AccountNotFound(line.account_code.clone()))?;
            if !account.is_active {
                return Err(LedgerError::AccountInactive(line.account_code.clone()));
            }
        }

        let totals = VoucherTotals::from_lines(lines);
        if !totals.is_balanced(tolerance) {
            return Err(LedgerError::UnbalancedVoucher {
                debit: totals.debit,
                credit: totals.credit,
            });
        }

        Ok(totals)
    }

    /// Decides which period a voucher dated `date` lands in.
    ///
    /// `period` is the period loaded for `requested` when given, otherwise the
    /// period containing `date`. Returns `None` when no period applies and
    /// `require_period` is off.
    ///
    /// # Errors
    ///
    /// Returns an error if the requested period is missing or does not contain
    /// the date, if a period is required but absent, or if the period is
    /// locked or closed.
    pub fn check_posting_period(
        date: NaiveDate,
        requested: Option<FiscalPeriodId>,
        period: Option<&PostingPeriod>,
        require_period: bool,
        guard: PostingGuard,
    ) -> Result<Option<FiscalPeriodId>, LedgerError> {
        if let Some(requested) = requested {
            match period {
                Some(p) if p.id == requested => {
                    if !p.contains(date) {
                        return Err(LedgerError::DateOutsidePeriod {
                            date,
                            period: requested,
                        });
                    }
                }
                _ => return Err(LedgerError::PeriodNotFound(requested)),
            }
        }

        let Some(period) = period else {
            if require_period {
                return Err(LedgerError::NoFiscalPeriod(date));
            }
            return Ok(None);
        };

        match period.state {
            PeriodState::Open => {}
            PeriodState::Locked if guard == PostingGuard::ClosingPeriod(period.id) => {}
            PeriodState::Locked => {
                return Err(LedgerError::PeriodLocked {
                    period: period.id,
                    date,
                });
            }
            PeriodState::Closed => {
                return Err(LedgerError::PeriodClosed {
                    period: period.id,
                    date,
                });
            }
        }

        Ok(Some(period.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::AccountType;
    use rust_decimal_macros::dec;

    fn active_lookup(code: &str) -> Option<AccountInfo> {
        Some(AccountInfo {
            code: code.to_string(),
            account_type: AccountType::Asset,
            is_active: true,
        })
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, day).unwrap()
    }

    fn january(state: PeriodState) -> PostingPeriod {
        PostingPeriod {
            id: FiscalPeriodId::new(),
            start_date: date(1),
            end_date: date(31),
            state,
        }
    }

    #[test]
    fn test_validate_balanced_voucher() {
        let lines = vec![
            PostingLine::debit("1100", dec!(100)),
            PostingLine::credit("4100", dec!(100)),
        ];
        let totals = LedgerService::validate_lines(&lines, dec!(0.01), active_lookup).unwrap();
        assert_eq!(totals.debit, dec!(100));
        assert_eq!(totals.credit, dec!(100));
    }

    #[test]
    fn test_validate_within_tolerance() {
        let lines = vec![
            PostingLine::debit("1100", dec!(100.00)),
            PostingLine::credit("4100", dec!(99.99)),
        ];
        assert!(LedgerService::validate_lines(&lines, dec!(0.01), active_lookup).is_ok());
    }

    #[test]
    fn test_validate_unbalanced_voucher() {
        let lines = vec![
            PostingLine::debit("1100", dec!(100)),
            PostingLine::credit("4100", dec!(50)),
        ];
        assert!(matches!(
            LedgerService::validate_lines(&lines, dec!(0.01), active_lookup),
            Err(LedgerError::UnbalancedVoucher { .. })
        ));
    }

    #[test]
    fn test_validate_insufficient_entries() {
        let lines = vec![PostingLine::debit("1100", dec!(100))];
        assert!(matches!(
            LedgerService::validate_lines(&lines, dec!(0.01), active_lookup),
            Err(LedgerError::InsufficientEntries)
        ));
    }

    #[test]
    fn test_validate_zero_and_negative_amounts() {
        let zero = vec![
            PostingLine::debit("1100", dec!(0)),
            PostingLine::credit("4100", dec!(0)),
        ];
        assert!(matches!(
            LedgerService::validate_lines(&zero, dec!(0.01), active_lookup),
            Err(LedgerError::NonPositiveAmount { .. })
        ));

        let negative = vec![
            PostingLine::debit("1100", dec!(-100)),
            PostingLine::credit("4100", dec!(-100)),
        ];
        assert!(matches!(
            LedgerService::validate_lines(&negative, dec!(0.01), active_lookup),
            Err(LedgerError::NonPositiveAmount { .. })
        ));
    }

    #[test]
    fn test_validate_unknown_and_inactive_accounts() {
        let lines = vec![
            PostingLine::debit("1100", dec!(100)),
            PostingLine::credit("9999", dec!(100)),
        ];
        let lookup = |code: &str| (code != "9999").then(|| active_lookup(code)).flatten();
        assert!(matches!(
            LedgerService::validate_lines(&lines, dec!(0.01), lookup),
            Err(LedgerError::AccountNotFound(code)) if code == "9999"
        ));

        let inactive = |code: &str| {
            Some(AccountInfo {
                code: code.to_string(),
                account_type: AccountType::Asset,
                is_active: code != "1100",
            })
        };
        assert!(matches!(
            LedgerService::validate_lines(&lines, dec!(0.01), inactive),
            Err(LedgerError::AccountInactive(code)) if code == "1100"
        ));
    }

    #[test]
    fn test_amount_checked_before_accounts() {
        let lines = vec![
            PostingLine::debit("9999", dec!(0)),
            PostingLine::credit("9999", dec!(0)),
        ];
        assert!(matches!(
            LedgerService::validate_lines(&lines, dec!(0.01), |_| None),
            Err(LedgerError::NonPositiveAmount { .. })
        ));
    }

    #[test]
    fn test_open_period_accepts_posting() {
        let period = january(PeriodState::Open);
        let result = LedgerService::check_posting_period(
            date(15),
            None,
            Some(&period),
            false,
            PostingGuard::Regular,
        );
        assert_eq!(result.unwrap(), Some(period.id));
    }

    #[test]
    fn test_locked_period_rejects_posting() {
        let period = january(PeriodState::Locked);
        assert!(matches!(
            LedgerService::check_posting_period(
                date(15),
                None,
                Some(&period),
                false,
                PostingGuard::Regular
            ),
            Err(LedgerError::PeriodLocked { .. })
        ));
    }

    #[test]
    fn test_closing_guard_bypasses_own_lock_only() {
        let period = january(PeriodState::Locked);
        assert!(
            LedgerService::check_posting_period(
                date(31),
                None,
                Some(&period),
                false,
                PostingGuard::ClosingPeriod(period.id)
            )
            .is_ok()
        );
        assert!(matches!(
            LedgerService::check_posting_period(
                date(31),
                None,
                Some(&period),
                false,
                PostingGuard::ClosingPeriod(FiscalPeriodId::new())
            ),
            Err(LedgerError::PeriodLocked { .. })
        ));

        let closed = january(PeriodState::Closed);
        assert!(matches!(
            LedgerService::check_posting_period(
                date(31),
                None,
                Some(&closed),
                false,
                PostingGuard::ClosingPeriod(closed.id)
            ),
            Err(LedgerError::PeriodClosed { .. })
        ));
    }

    #[test]
    fn test_missing_period_policy() {
        assert_eq!(
            LedgerService::check_posting_period(date(15), None, None, false, PostingGuard::Regular)
                .unwrap(),
            None
        );
        assert!(matches!(
            LedgerService::check_posting_period(date(15), None, None, true, PostingGuard::Regular),
            Err(LedgerError::NoFiscalPeriod(_))
        ));
    }

    #[test]
    fn test_requested_period_must_match_and_contain_date() {
        let period = january(PeriodState::Open);
        assert!(matches!(
            LedgerService::check_posting_period(
                date(15),
                Some(FiscalPeriodId::new()),
                Some(&period),
                false,
                PostingGuard::Regular
            ),
            Err(LedgerError::PeriodNotFound(_))
        ));

        let february = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        assert!(matches!(
            LedgerService::check_posting_period(
                february,
                Some(period.id),
                Some(&period),
                false,
                PostingGuard::Regular
            ),
            Err(LedgerError::DateOutsidePeriod { .. })
        ));
    }
}
