//! Ledger error types for validation and state errors.
//!
//! This module defines all errors that can occur during posting and
//! reversal, including validation errors, account errors, fiscal period
//! errors, and reversal state errors.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tally_shared::{ErrorKind, types::FiscalPeriodId};
use thiserror::Error;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Voucher must have at least 2 entries.
    #[error("Voucher must have at least 2 entries")]
    InsufficientEntries,

    /// Entry amount must be positive.
    #[error("Entry amount for account {account_code} must be positive, got {amount}")]
    NonPositiveAmount {
        /// The offending line's account.
        account_code: String,
        /// The offending amount.
        amount: Decimal,
    },

    /// Voucher is not balanced (debits != credits).
    #[error("Voucher is not balanced. Debit: {debit}, Credit: {credit}")]
    UnbalancedVoucher {
        /// Total debit amount.
        debit: Decimal,
        /// Total credit amount.
        credit: Decimal,
    },

    /// Document type is not a valid sequence key.
    #[error("Invalid document type: {0:?}")]
    InvalidDocumentType(String),

    /// Sequence template cannot render distinct voucher numbers.
    #[error("Invalid sequence template: {0:?}")]
    InvalidSequenceTemplate(String),

    // ========== Account Errors ==========
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Account is inactive and cannot be used.
    #[error("Account {0} is inactive")]
    AccountInactive(String),

    // ========== Fiscal Period Errors ==========
    /// No fiscal period found for the voucher date.
    #[error("No fiscal period found for date {0}")]
    NoFiscalPeriod(NaiveDate),

    /// Explicit period does not exist.
    #[error("Fiscal period not found: {0}")]
    PeriodNotFound(FiscalPeriodId),

    /// Explicit period does not contain the voucher date.
    #[error("Date {date} is outside fiscal period {period}")]
    DateOutsidePeriod {
        /// Voucher date.
        date: NaiveDate,
        /// Requested period.
        period: FiscalPeriodId,
    },

    /// Fiscal period is locked.
    #[error("Fiscal period {period} is locked, no posting allowed on {date}")]
    PeriodLocked {
        /// The locked period.
        period: FiscalPeriodId,
        /// Voucher date.
        date: NaiveDate,
    },

    /// Fiscal period is closed.
    #[error("Fiscal period {period} is closed, no posting allowed on {date}")]
    PeriodClosed {
        /// The closed period.
        period: FiscalPeriodId,
        /// Voucher date.
        date: NaiveDate,
    },

    // ========== Voucher State Errors ==========
    /// Voucher number already used.
    #[error("Voucher number already exists: {0}")]
    DuplicateVoucherNumber(String),

    /// Voucher not found.
    #[error("Voucher not found: {0}")]
    VoucherNotFound(String),

    /// Voucher already has a reversal.
    #[error("Voucher {voucher} was already reversed by {reversal}")]
    VoucherAlreadyReversed {
        /// The original voucher.
        voucher: String,
        /// The existing reversal.
        reversal: String,
    },

    /// Reversing vouchers cannot themselves be reversed.
    #[error("Voucher {0} is a reversal and cannot be reversed")]
    ReversalOfReversal(String),

    // ========== Database Errors ==========
    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl LedgerError {
    /// Broad classification of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InsufficientEntries
            | Self::NonPositiveAmount { .. }
            | Self::UnbalancedVoucher { .. }
            | Self::InvalidDocumentType(_)
            | Self::InvalidSequenceTemplate(_)
            | Self::AccountNotFound(_)
            | Self::AccountInactive(_)
            | Self::NoFiscalPeriod(_)
            | Self::DateOutsidePeriod { .. } => ErrorKind::Validation,
            Self::PeriodNotFound(_) => ErrorKind::NotFound,
            Self::PeriodLocked { .. } | Self::PeriodClosed { .. } => ErrorKind::PeriodState,
            Self::VoucherNotFound(_)
            | Self::VoucherAlreadyReversed { .. }
            | Self::ReversalOfReversal(_) => ErrorKind::ReversalState,
            Self::DuplicateVoucherNumber(_) => ErrorKind::Conflict,
            Self::Database(_) => ErrorKind::Database,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientEntries => "INSUFFICIENT_ENTRIES",
            Self::NonPositiveAmount { .. } => "NON_POSITIVE_AMOUNT",
            Self::UnbalancedVoucher { .. } => "UNBALANCED_VOUCHER",
            Self::InvalidDocumentType(_) => "INVALID_DOCUMENT_TYPE",
            Self::InvalidSequenceTemplate(_) => "INVALID_SEQUENCE_TEMPLATE",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::AccountInactive(_) => "ACCOUNT_INACTIVE",
            Self::NoFiscalPeriod(_) => "NO_FISCAL_PERIOD",
            Self::PeriodNotFound(_) => "PERIOD_NOT_FOUND",
            Self::DateOutsidePeriod { .. } => "DATE_OUTSIDE_PERIOD",
            Self::PeriodLocked { .. } => "PERIOD_LOCKED",
            Self::PeriodClosed { .. } => "PERIOD_CLOSED",
            Self::DuplicateVoucherNumber(_) => "DUPLICATE_VOUCHER_NUMBER",
            Self::VoucherNotFound(_) => "VOUCHER_NOT_FOUND",
            Self::VoucherAlreadyReversed { .. } => "VOUCHER_ALREADY_REVERSED",
            Self::ReversalOfReversal(_) => "REVERSAL_OF_REVERSAL",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        self.kind().status_code()
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            LedgerError::InsufficientEntries.error_code(),
            "INSUFFICIENT_ENTRIES"
        );
        assert_eq!(
            LedgerError::UnbalancedVoucher {
                debit: Decimal::new(100, 2),
                credit: Decimal::new(50, 2),
            }
            .error_code(),
            "UNBALANCED_VOUCHER"
        );
        assert_eq!(
            LedgerError::ReversalOfReversal("REV-1".into()).error_code(),
            "REVERSAL_OF_REVERSAL"
        );
    }

    #[test]
    fn test_kinds() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        assert_eq!(
            LedgerError::AccountInactive("1100".into()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            LedgerError::PeriodLocked {
                period: FiscalPeriodId::new(),
                date,
            }
            .kind(),
            ErrorKind::PeriodState
        );
        assert_eq!(
            LedgerError::VoucherAlreadyReversed {
                voucher: "JV-1".into(),
                reversal: "REV-1".into(),
            }
            .kind(),
            ErrorKind::ReversalState
        );
        assert_eq!(
            LedgerError::DuplicateVoucherNumber("JV-1".into()).kind(),
            ErrorKind::Conflict
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(LedgerError::InsufficientEntries.http_status_code(), 400);
        assert_eq!(
            LedgerError::VoucherNotFound("JV-9".into()).http_status_code(),
            422
        );
        assert_eq!(LedgerError::Database("x".into()).http_status_code(), 500);
    }

    #[test]
    fn test_retryable_errors() {
        assert!(LedgerError::Database("deadlock".into()).is_retryable());
        assert!(!LedgerError::InsufficientEntries.is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = LedgerError::UnbalancedVoucher {
            debit: Decimal::new(10000, 2),
            credit: Decimal::new(5000, 2),
        };
        assert_eq!(
            err.to_string(),
            "Voucher is not balanced. Debit: 100.00, Credit: 50.00"
        );
    }
}
