//! Chart of accounts errors.

use tally_shared::ErrorKind;
use thiserror::Error;

use super::account::AccountType;
use super::standard::StandardAccount;

/// Errors raised by chart of accounts operations.
#[derive(Debug, Error)]
pub enum ChartError {
    /// Account code does not exist.
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Account is inactive.
    #[error("Account {0} is inactive")]
    AccountInactive(String),

    /// Account code already taken.
    #[error("Account code already exists: {0}")]
    DuplicateCode(String),

    /// Account code is blank or too long.
    #[error("Invalid account code: {0:?}")]
    InvalidCode(String),

    /// Parent account does not exist.
    #[error("Parent account not found: {0}")]
    ParentNotFound(String),

    /// Child and parent accounts must share a type.
    #[error("Account {code} must have the same type as parent {parent}")]
    ParentTypeMismatch {
        /// Child account code.
        code: String,
        /// Parent account code.
        parent: String,
    },

    /// Key does not name a standard account role.
    #[error("Unknown standard account role: {0}")]
    UnknownRole(String),

    /// Account mapped to a role has the wrong type.
    #[error("Account {code} mapped to {role} must be {expected}, found {actual}")]
    RoleTypeMismatch {
        /// The role being resolved.
        role: StandardAccount,
        /// The mapped account code.
        code: String,
        /// Type the role requires.
        expected: AccountType,
        /// Type the account has.
        actual: AccountType,
    },

    /// Account has ledger entries and can only be deactivated.
    #[error("Account {0} has ledger history and cannot be removed")]
    HasLedgerHistory(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl ChartError {
    /// Broad classification of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::AccountNotFound(_)
            | Self::AccountInactive(_)
            | Self::InvalidCode(_)
            | Self::ParentNotFound(_)
            | Self::ParentTypeMismatch { .. }
            | Self::UnknownRole(_)
            | Self::RoleTypeMismatch { .. } => ErrorKind::Validation,
            Self::DuplicateCode(_) | Self::HasLedgerHistory(_) => ErrorKind::Conflict,
            Self::Database(_) => ErrorKind::Database,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::AccountInactive(_) => "ACCOUNT_INACTIVE",
            Self::DuplicateCode(_) => "DUPLICATE_ACCOUNT_CODE",
            Self::InvalidCode(_) => "INVALID_ACCOUNT_CODE",
            Self::ParentNotFound(_) => "PARENT_ACCOUNT_NOT_FOUND",
            Self::ParentTypeMismatch { .. } => "PARENT_TYPE_MISMATCH",
            Self::UnknownRole(_) => "UNKNOWN_ACCOUNT_ROLE",
            Self::RoleTypeMismatch { .. } => "ROLE_TYPE_MISMATCH",
            Self::HasLedgerHistory(_) => "ACCOUNT_HAS_HISTORY",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}
