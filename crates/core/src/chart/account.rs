//! Account types and account-level validation.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::ChartError;
use super::standard::StandardAccount;
use crate::ledger::types::EntryType;

/// Account classification.
///
/// The type fixes the normal balance side:
/// - Asset/Expense increase on debit
/// - Liability/Equity/Revenue increase on credit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Resources owned.
    Asset,
    /// Obligations owed.
    Liability,
    /// Owner's residual interest.
    Equity,
    /// Income earned in the period.
    Revenue,
    /// Costs incurred in the period.
    Expense,
}

impl AccountType {
    /// Every account type.
    pub const ALL: [Self; 5] = [
        Self::Asset,
        Self::Liability,
        Self::Equity,
        Self::Revenue,
        Self::Expense,
    ];

    /// Side on which the account increases.
    #[must_use]
    pub const fn normal_balance(self) -> EntryType {
        match self {
            Self::Asset | Self::Expense => EntryType::Debit,
            Self::Liability | Self::Equity | Self::Revenue => EntryType::Credit,
        }
    }

    /// Net balance of the given totals, signed so that a normal balance is positive.
    #[must_use]
    pub fn balance(self, debit: Decimal, credit: Decimal) -> Decimal {
        match self.normal_balance() {
            EntryType::Debit => debit - credit,
            EntryType::Credit => credit - debit,
        }
    }

    /// Revenue and expense accounts are zeroed into retained earnings at close.
    #[must_use]
    pub const fn is_temporary(self) -> bool {
        matches!(self, Self::Revenue | Self::Expense)
    }

    /// Storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Revenue => "revenue",
            Self::Expense => "expense",
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asset" => Ok(Self::Asset),
            "liability" => Ok(Self::Liability),
            "equity" => Ok(Self::Equity),
            "revenue" => Ok(Self::Revenue),
            "expense" => Ok(Self::Expense),
            _ => Err(format!("Unknown account type: {s}")),
        }
    }
}

/// Information about an account needed for validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    /// Account code.
    pub code: String,
    /// Account type.
    pub account_type: AccountType,
    /// Whether the account accepts postings.
    pub is_active: bool,
}

/// Stateless chart of accounts rules.
pub struct ChartService;

impl ChartService {
    /// Validates a new account against its (optional) parent.
    ///
    /// # Errors
    ///
    /// Returns an error for a blank code, a missing parent, or a parent of another type.
    pub fn validate_new_account(
        code: &str,
        account_type: AccountType,
        parent_code: Option<&str>,
        parent: Option<&AccountInfo>,
    ) -> Result<(), ChartError> {
        if code.trim().is_empty() || code.len() > 32 {
            return Err(ChartError::InvalidCode(code.to_string()));
        }

        if let Some(parent_code) = parent_code {
            let parent = parent.ok_or_else(|| ChartError::ParentNotFound(parent_code.to_string()))?;
            if parent.account_type != account_type {
                return Err(ChartError::ParentTypeMismatch {
                    code: code.to_string(),
                    parent: parent.code.clone(),
                });
            }
        }

        Ok(())
    }

    /// Checks that the account mapped to a standard role can be posted to.
    ///
    /// # Errors
    ///
    /// Returns an error if the account is missing, inactive, or of the wrong type.
    pub fn validate_role_account(
        role: StandardAccount,
        code: &str,
        account: Option<&AccountInfo>,
    ) -> Result<(), ChartError> {
        let account = account.ok_or_else(|| ChartError::AccountNotFound(code.to_string()))?;

        if !account.is_active {
            return Err(ChartError::AccountInactive(code.to_string()));
        }

        if account.account_type != role.account_type() {
            return Err(ChartError::RoleTypeMismatch {
                role,
                code: code.to_string(),
                expected: role.account_type(),
                actual: account.account_type,
            });
        }

        Ok(())
    }

    /// Accounts with ledger history can only be deactivated, never removed.
    ///
    /// # Errors
    ///
    /// Returns `HasLedgerHistory` when `entry_count` is non-zero.
    pub fn ensure_removable(code: &str, entry_count: u64) -> Result<(), ChartError> {
        if entry_count > 0 {
            return Err(ChartError::HasLedgerHistory(code.to_string()));
        }
        Ok(())
    }
}
