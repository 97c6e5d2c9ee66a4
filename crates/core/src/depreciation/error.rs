//! Depreciation errors.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tally_shared::{
    ErrorKind,
    types::{AssetId, FiscalPeriodId},
};
use thiserror::Error;

use crate::chart::ChartError;
use crate::ledger::LedgerError;

/// Errors raised by the depreciation engine.
#[derive(Debug, Error)]
pub enum DepreciationError {
    /// Asset already has a depreciation record for the period.
    #[error("Depreciation for asset {asset} already posted in period {period}")]
    AlreadyPosted {
        /// Asset.
        asset: AssetId,
        /// Fiscal period.
        period: FiscalPeriodId,
    },

    /// Asset not found.
    #[error("Asset not found: {0}")]
    AssetNotFound(AssetId),

    /// Asset is inactive.
    #[error("Asset {0} is inactive")]
    AssetInactive(AssetId),

    /// Acquisition value must be positive.
    #[error("Acquisition value must be positive, got {0}")]
    NonPositiveValue(Decimal),

    /// Monthly rate must lie in (0, 1].
    #[error("Monthly depreciation rate must be in (0, 1], got {0}")]
    InvalidRate(Decimal),

    /// Fiscal period not found.
    #[error("Fiscal period not found: {0}")]
    PeriodNotFound(FiscalPeriodId),

    /// Asset was acquired after the period ended.
    #[error("Asset {asset} acquired on {acquired}, after the period ending {period_end}")]
    NotYetAcquired {
        /// Asset.
        asset: AssetId,
        /// Acquisition date.
        acquired: NaiveDate,
        /// Last day of the period.
        period_end: NaiveDate,
    },

    /// Book value has reached zero.
    #[error("Asset {0} is fully depreciated")]
    FullyDepreciated(AssetId),

    /// Depreciation voucher was rejected by the posting engine.
    #[error(transparent)]
    Posting(#[from] LedgerError),

    /// Standard account could not be resolved.
    #[error(transparent)]
    Chart(#[from] ChartError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl DepreciationError {
    /// Broad classification of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::AlreadyPosted { .. } => ErrorKind::DepreciationAlreadyPosted,
            Self::AssetNotFound(_) | Self::PeriodNotFound(_) => ErrorKind::NotFound,
            Self::AssetInactive(_)
            | Self::NonPositiveValue(_)
            | Self::InvalidRate(_)
            | Self::NotYetAcquired { .. }
            | Self::FullyDepreciated(_) => ErrorKind::Validation,
            Self::Posting(e) => e.kind(),
            Self::Chart(e) => e.kind(),
            Self::Database(_) => ErrorKind::Database,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadyPosted { .. } => "DEPRECIATION_ALREADY_POSTED",
            Self::AssetNotFound(_) => "ASSET_NOT_FOUND",
            Self::AssetInactive(_) => "ASSET_INACTIVE",
            Self::NonPositiveValue(_) => "NON_POSITIVE_VALUE",
            Self::InvalidRate(_) => "INVALID_RATE",
            Self::PeriodNotFound(_) => "PERIOD_NOT_FOUND",
            Self::NotYetAcquired { .. } => "ASSET_NOT_YET_ACQUIRED",
            Self::FullyDepreciated(_) => "ASSET_FULLY_DEPRECIATED",
            Self::Posting(e) => e.error_code(),
            Self::Chart(e) => e.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}
