//! Account balance calculations.
//!
//! Balances are derived from ledger entries on every read; nothing here is
//! stored.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::EntryType;
use crate::chart::AccountType;

/// Debit and credit totals of one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    /// The account code.
    pub account_code: String,
    /// The account type, which fixes the balance sign.
    pub account_type: AccountType,
    /// Total debit amount.
    pub debit_total: Decimal,
    /// Total credit amount.
    pub credit_total: Decimal,
}

impl AccountBalance {
    /// Creates an empty balance.
    pub fn new(account_code: impl Into<String>, account_type: AccountType) -> Self {
        Self {
            account_code: account_code.into(),
            account_type,
            debit_total: Decimal::ZERO,
            credit_total: Decimal::ZERO,
        }
    }

    /// Adds one entry.
    pub fn add(&mut self, entry_type: EntryType, amount: Decimal) {
        match entry_type {
            EntryType::Debit => self.debit_total += amount,
            EntryType::Credit => self.credit_total += amount,
        }
    }

    /// Adds every entry of an iterator.
    #[must_use]
    pub fn with_entries<I>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (EntryType, Decimal)>,
    {
        for (entry_type, amount) in entries {
            self.add(entry_type, amount);
        }
        self
    }

    /// Net balance: debits − credits for Asset/Expense, credits − debits otherwise.
    #[must_use]
    pub fn balance(&self) -> Decimal {
        self.account_type.balance(self.debit_total, self.credit_total)
    }
}
