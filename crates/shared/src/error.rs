//! Error kinds shared by every engine error.
//!
//! Each domain error in `tally-core` maps onto exactly one `ErrorKind`, so
//! callers can decide how to surface a failure without matching on every
//! variant of every engine.

use serde::Serialize;

/// Broad classification of an engine failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Input rejected before any write (unbalanced voucher, bad amount, unknown account).
    Validation,
    /// Fiscal period lifecycle violation (locked, closed, already closed).
    PeriodState,
    /// Reversal of a missing, already reversed, or reversing voucher.
    ReversalState,
    /// FIFO consumption beyond the quantity held in unsold lots.
    InventoryShortage,
    /// Depreciation already recorded for the asset and period.
    DepreciationAlreadyPosted,
    /// Referenced record does not exist.
    NotFound,
    /// Uniqueness conflict (duplicate code or voucher number).
    Conflict,
    /// Storage failure.
    Database,
}

impl ErrorKind {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::PeriodState => "PERIOD_STATE_ERROR",
            Self::ReversalState => "REVERSAL_STATE_ERROR",
            Self::InventoryShortage => "INVENTORY_SHORTAGE",
            Self::DepreciationAlreadyPosted => "DEPRECIATION_ALREADY_POSTED",
            Self::NotFound => "NOT_FOUND",
            Self::Conflict => "CONFLICT",
            Self::Database => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code a caller exposing the engine over HTTP would use.
    #[must_use]
    pub const fn status_code(self) -> u16 {
        match self {
            Self::Validation => 400,
            Self::NotFound => 404,
            Self::Conflict | Self::DepreciationAlreadyPosted => 409,
            Self::PeriodState | Self::ReversalState | Self::InventoryShortage => 422,
            Self::Database => 500,
        }
    }

    /// Returns true if the failed call may succeed when retried unchanged.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Database)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.error_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ErrorKind::Validation.error_code(), "VALIDATION_ERROR");
        assert_eq!(ErrorKind::PeriodState.error_code(), "PERIOD_STATE_ERROR");
        assert_eq!(ErrorKind::ReversalState.error_code(), "REVERSAL_STATE_ERROR");
        assert_eq!(
            ErrorKind::InventoryShortage.error_code(),
            "INVENTORY_SHORTAGE"
        );
        assert_eq!(
            ErrorKind::DepreciationAlreadyPosted.error_code(),
            "DEPRECIATION_ALREADY_POSTED"
        );
        assert_eq!(ErrorKind::Database.error_code(), "DATABASE_ERROR");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ErrorKind::Validation.status_code(), 400);
        assert_eq!(ErrorKind::NotFound.status_code(), 404);
        assert_eq!(ErrorKind::Conflict.status_code(), 409);
        assert_eq!(ErrorKind::PeriodState.status_code(), 422);
        assert_eq!(ErrorKind::Database.status_code(), 500);
    }

    #[test]
    fn test_only_database_errors_are_retryable() {
        assert!(ErrorKind::Database.is_retryable());
        assert!(!ErrorKind::Validation.is_retryable());
        assert!(!ErrorKind::PeriodState.is_retryable());
        assert!(!ErrorKind::DepreciationAlreadyPosted.is_retryable());
    }

    #[test]
    fn test_display_uses_error_code() {
        assert_eq!(ErrorKind::Conflict.to_string(), "CONFLICT");
    }
}
