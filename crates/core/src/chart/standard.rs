//! Standard account roles and their mapping to account codes.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::account::AccountType;
use super::error::ChartError;

/// Semantic account slot used by the engines instead of hard-coded codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StandardAccount {
    /// Cash on hand and in bank.
    Cash,
    /// Amounts owed to suppliers.
    AccountsPayable,
    /// Amounts owed by customers.
    AccountsReceivable,
    /// Merchandise inventory at cost.
    Inventory,
    /// Cost of goods sold.
    Cogs,
    /// VAT paid on purchases.
    InputVat,
    /// VAT collected on sales.
    OutputVat,
    /// General operating expenses.
    OperatingExpenses,
    /// Sales revenue.
    SalesRevenue,
    /// Non-sales revenue.
    OtherRevenue,
    /// Accumulated profit absorbing each period's net income.
    RetainedEarnings,
    /// Periodic depreciation charge.
    DepreciationExpense,
    /// Contra-asset holding depreciation to date.
    AccumulatedDepreciation,
}

impl StandardAccount {
    /// Every standard role.
    pub const ALL: [Self; 13] = [
        Self::Cash,
        Self::AccountsPayable,
        Self::AccountsReceivable,
        Self::Inventory,
        Self::Cogs,
        Self::InputVat,
        Self::OutputVat,
        Self::OperatingExpenses,
        Self::SalesRevenue,
        Self::OtherRevenue,
        Self::RetainedEarnings,
        Self::DepreciationExpense,
        Self::AccumulatedDepreciation,
    ];

    /// Configuration key of the role.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::AccountsPayable => "accounts_payable",
            Self::AccountsReceivable => "accounts_receivable",
            Self::Inventory => "inventory",
            Self::Cogs => "cogs",
            Self::InputVat => "input_vat",
            Self::OutputVat => "output_vat",
            Self::OperatingExpenses => "operating_expenses",
            Self::SalesRevenue => "sales_revenue",
            Self::OtherRevenue => "other_revenue",
            Self::RetainedEarnings => "retained_earnings",
            Self::DepreciationExpense => "depreciation_expense",
            Self::AccumulatedDepreciation => "accumulated_depreciation",
        }
    }

    /// Code used when configuration does not override the role.
    #[must_use]
    pub const fn default_code(self) -> &'static str {
        match self {
            Self::Cash => "1100",
            Self::AccountsReceivable => "1200",
            Self::Inventory => "1300",
            Self::InputVat => "1400",
            Self::AccumulatedDepreciation => "1590",
            Self::AccountsPayable => "2100",
            Self::OutputVat => "2200",
            Self::RetainedEarnings => "3200",
            Self::SalesRevenue => "4100",
            Self::OtherRevenue => "4900",
            Self::Cogs => "5100",
            Self::OperatingExpenses => "6100",
            Self::DepreciationExpense => "6200",
        }
    }

    /// Display name for the seeded account.
    #[must_use]
    pub const fn default_name(self) -> &'static str {
        match self {
            Self::Cash => "Cash",
            Self::AccountsPayable => "Accounts Payable",
            Self::AccountsReceivable => "Accounts Receivable",
            Self::Inventory => "Merchandise Inventory",
            Self::Cogs => "Cost of Goods Sold",
            Self::InputVat => "Input VAT",
            Self::OutputVat => "Output VAT",
            Self::OperatingExpenses => "Operating Expenses",
            Self::SalesRevenue => "Sales Revenue",
            Self::OtherRevenue => "Other Revenue",
            Self::RetainedEarnings => "Retained Earnings",
            Self::DepreciationExpense => "Depreciation Expense",
            Self::AccumulatedDepreciation => "Accumulated Depreciation",
        }
    }

    /// Type the mapped account must have.
    #[must_use]
    pub const fn account_type(self) -> AccountType {
        match self {
            Self::Cash
            | Self::AccountsReceivable
            | Self::Inventory
            | Self::InputVat
            | Self::AccumulatedDepreciation => AccountType::Asset,
            Self::AccountsPayable | Self::OutputVat => AccountType::Liability,
            Self::RetainedEarnings => AccountType::Equity,
            Self::SalesRevenue | Self::OtherRevenue => AccountType::Revenue,
            Self::Cogs | Self::OperatingExpenses | Self::DepreciationExpense => AccountType::Expense,
        }
    }
}

impl std::fmt::Display for StandardAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for StandardAccount {
    type Err = ChartError;

    /// Accepts `accounts_payable`, `accountsPayable`, or `AccountsPayable`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();

        Self::ALL
            .into_iter()
            .find(|role| role.key().replace('_', "") == wanted)
            .ok_or_else(|| ChartError::UnknownRole(s.to_string()))
    }
}

/// Role to account code mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandardAccountMap {
    codes: HashMap<StandardAccount, String>,
}

impl Default for StandardAccountMap {
    fn default() -> Self {
        Self {
            codes: StandardAccount::ALL
                .into_iter()
                .map(|role| (role, role.default_code().to_string()))
                .collect(),
        }
    }
}

impl StandardAccountMap {
    /// Builds the map from defaults overlaid with `role_key -> code` overrides.
    ///
    /// # Errors
    ///
    /// Returns `UnknownRole` for a key that names no role, or `InvalidCode` for a blank code.
    pub fn from_overrides(overrides: &HashMap<String, String>) -> Result<Self, ChartError> {
        let mut map = Self::default();
        for (key, code) in overrides {
            let role: StandardAccount = key.parse()?;
            if code.trim().is_empty() {
                return Err(ChartError::InvalidCode(code.clone()));
            }
            map.codes.insert(role, code.trim().to_string());
        }
        Ok(map)
    }

    /// Account code mapped to `role`.
    #[must_use]
    pub fn code(&self, role: StandardAccount) -> &str {
        self.codes
            .get(&role)
            .map_or_else(|| role.default_code(), String::as_str)
    }

    /// Iterates roles in declaration order with their codes.
    pub fn iter(&self) -> impl Iterator<Item = (StandardAccount, &str)> {
        StandardAccount::ALL
            .into_iter()
            .map(move |role| (role, self.code(role)))
    }
}
