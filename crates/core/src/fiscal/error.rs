//! Fiscal period errors.

use chrono::NaiveDate;
use tally_shared::{ErrorKind, types::FiscalPeriodId};
use thiserror::Error;

use crate::chart::ChartError;
use crate::ledger::LedgerError;

/// Errors raised by fiscal period operations.
#[derive(Debug, Error)]
pub enum FiscalError {
    /// Period not found.
    #[error("Fiscal period not found: {0}")]
    PeriodNotFound(FiscalPeriodId),

    /// Period is already locked.
    #[error("Fiscal period {0} is already locked")]
    AlreadyLocked(FiscalPeriodId),

    /// Period is not locked.
    #[error("Fiscal period {0} is not locked")]
    NotLocked(FiscalPeriodId),

    /// Period is closed; the state is terminal.
    #[error("Fiscal period {0} is already closed")]
    AlreadyClosed(FiscalPeriodId),

    /// Strict policy: lock the period before closing it.
    #[error("Fiscal period {0} must be locked before it can be closed")]
    LockRequiredBeforeClose(FiscalPeriodId),

    /// End date before start date.
    #[error("Invalid date range: {start} to {end}")]
    InvalidDateRange {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
    },

    /// New period overlaps an existing one.
    #[error("Period {start} to {end} overlaps existing period {existing}")]
    OverlappingPeriod {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
        /// Name of the overlapping period.
        existing: String,
    },

    /// Year outside chrono's range.
    #[error("Invalid fiscal year: {0}")]
    InvalidYear(i32),

    /// Closing voucher was rejected by the posting engine.
    #[error(transparent)]
    Posting(#[from] LedgerError),

    /// Retained earnings account could not be resolved.
    #[error(transparent)]
    Chart(#[from] ChartError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl FiscalError {
    /// Broad classification of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::PeriodNotFound(_) => ErrorKind::NotFound,
            Self::AlreadyLocked(_)
            | Self::NotLocked(_)
            | Self::AlreadyClosed(_)
            | Self::LockRequiredBeforeClose(_) => ErrorKind::PeriodState,
            Self::InvalidDateRange { .. } | Self::InvalidYear(_) => ErrorKind::Validation,
            Self::OverlappingPeriod { .. } => ErrorKind::Conflict,
            Self::Posting(e) => e.kind(),
            Self::Chart(e) => e.kind(),
            Self::Database(_) => ErrorKind::Database,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::PeriodNotFound(_) => "PERIOD_NOT_FOUND",
            Self::AlreadyLocked(_) => "PERIOD_ALREADY_LOCKED",
            Self::NotLocked(_) => "PERIOD_NOT_LOCKED",
            Self::AlreadyClosed(_) => "PERIOD_ALREADY_CLOSED",
            Self::LockRequiredBeforeClose(_) => "LOCK_REQUIRED_BEFORE_CLOSE",
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::OverlappingPeriod { .. } => "OVERLAPPING_PERIOD",
            Self::InvalidYear(_) => "INVALID_YEAR",
            Self::Posting(e) => e.error_code(),
            Self::Chart(e) => e.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        let id = FiscalPeriodId::new();
        assert_eq!(FiscalError::AlreadyClosed(id).kind(), ErrorKind::PeriodState);
        assert_eq!(FiscalError::PeriodNotFound(id).kind(), ErrorKind::NotFound);
        assert_eq!(
            FiscalError::Posting(LedgerError::InsufficientEntries).kind(),
            ErrorKind::Validation
        );
    }

    #[test]
    fn test_posting_error_keeps_code() {
        let err: FiscalError = LedgerError::UnbalancedVoucher {
            debit: rust_decimal::Decimal::ONE,
            credit: rust_decimal::Decimal::ZERO,
        }
        .into();
        assert_eq!(err.error_code(), "UNBALANCED_VOUCHER");
    }
}
