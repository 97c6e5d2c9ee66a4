//! Ledger domain types for voucher posting.
//!
//! This module defines the core types used for creating and validating
//! vouchers in the double-entry bookkeeping system.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{FiscalPeriodId, UserId, is_within_tolerance};

/// Entry type: either Debit or Credit.
///
/// In double-entry bookkeeping:
/// - Debits increase asset/expense accounts, decrease liability/equity/revenue accounts
/// - Credits decrease asset/expense accounts, increase liability/equity/revenue accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// Debit entry.
    Debit,
    /// Credit entry.
    Credit,
}

impl EntryType {
    /// The other side.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Debit => Self::Credit,
            Self::Credit => Self::Debit,
        }
    }

    /// Storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }
}

impl std::fmt::Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debit" => Ok(Self::Debit),
            "credit" => Ok(Self::Credit),
            _ => Err(format!("Unknown entry type: {s}")),
        }
    }
}

/// One line of a voucher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingLine {
    /// Account to post to.
    pub account_code: String,
    /// Debit or credit.
    pub entry_type: EntryType,
    /// Amount (must be positive).
    pub amount: Decimal,
    /// Free-text memo.
    pub memo: Option<String>,
}

impl PostingLine {
    /// Debit line.
    pub fn debit(account_code: impl Into<String>, amount: Decimal) -> Self {
        Self {
            account_code: account_code.into(),
            entry_type: EntryType::Debit,
            amount,
            memo: None,
        }
    }

    /// Credit line.
    pub fn credit(account_code: impl Into<String>, amount: Decimal) -> Self {
        Self {
            account_code: account_code.into(),
            entry_type: EntryType::Credit,
            amount,
            memo: None,
        }
    }

    /// Sets the memo.
    #[must_use]
    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    /// Debit positive, credit negative.
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        match self.entry_type {
            EntryType::Debit => self.amount,
            EntryType::Credit => -self.amount,
        }
    }
}

/// Originating business record, kept for traceability only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessReference {
    /// Source table name (e.g. `sales`).
    pub table: String,
    /// Source row id, if any.
    pub id: Option<String>,
}

impl BusinessReference {
    /// Reference to a specific row.
    pub fn new(table: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            id: Some(id.into()),
        }
    }

    /// Reference to a table without a row id (manual journals).
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            id: None,
        }
    }
}

impl std::fmt::Display for BusinessReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.id {
            Some(id) => write!(f, "{}/{id}", self.table),
            None => f.write_str(&self.table),
        }
    }
}

/// Input for posting a voucher.
#[derive(Debug, Clone)]
pub struct PostingRequest {
    /// The voucher lines (must have at least 2).
    pub lines: Vec<PostingLine>,
    /// Originating business record.
    pub reference: BusinessReference,
    /// Caller-chosen voucher number; issued from the sequence when absent.
    pub voucher_number: Option<String>,
    /// Voucher date; today when absent.
    pub voucher_date: Option<NaiveDate>,
    /// Document type for numbering; the configured default when absent.
    pub document_type: Option<String>,
    /// Voucher description.
    pub description: Option<String>,
    /// Explicit period; must contain the voucher date.
    pub fiscal_period_id: Option<FiscalPeriodId>,
    /// User posting the voucher.
    pub actor: UserId,
}

impl PostingRequest {
    /// Creates a request with everything optional left unset.
    #[must_use]
    pub fn new(lines: Vec<PostingLine>, reference: BusinessReference, actor: UserId) -> Self {
        Self {
            lines,
            reference,
            voucher_number: None,
            voucher_date: None,
            document_type: None,
            description: None,
            fiscal_period_id: None,
            actor,
        }
    }

    /// Uses a caller-chosen voucher number.
    #[must_use]
    pub fn with_voucher_number(mut self, number: impl Into<String>) -> Self {
        self.voucher_number = Some(number.into());
        self
    }

    /// Dates the voucher.
    #[must_use]
    pub fn dated(mut self, date: NaiveDate) -> Self {
        self.voucher_date = Some(date);
        self
    }

    /// Numbers the voucher from the given document type's sequence.
    #[must_use]
    pub fn with_document_type(mut self, document_type: impl Into<String>) -> Self {
        self.document_type = Some(document_type.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Pins the voucher to a fiscal period.
    #[must_use]
    pub fn in_period(mut self, period: FiscalPeriodId) -> Self {
        self.fiscal_period_id = Some(period);
        self
    }
}

/// Sum of debits and credits of a voucher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VoucherTotals {
    /// Total debit amount.
    pub debit: Decimal,
    /// Total credit amount.
    pub credit: Decimal,
}

impl VoucherTotals {
    /// Sums the given lines.
    #[must_use]
    pub fn from_lines(lines: &[PostingLine]) -> Self {
        lines.iter().fold(Self::default(), |mut totals, line| {
            match line.entry_type {
                EntryType::Debit => totals.debit += line.amount,
                EntryType::Credit => totals.credit += line.amount,
            }
            totals
        })
    }

    /// Debits minus credits.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        self.debit - self.credit
    }

    /// Whether debits and credits agree within `tolerance`.
    #[must_use]
    pub fn is_balanced(&self, tolerance: Decimal) -> bool {
        is_within_tolerance(self.debit, self.credit, tolerance)
    }
}

/// Result of a successful posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostedVoucher {
    /// Assigned voucher number.
    pub voucher_number: String,
    /// Voucher date.
    pub voucher_date: NaiveDate,
    /// Document type used.
    pub document_type: String,
    /// Period the voucher landed in, if any.
    pub fiscal_period_id: Option<FiscalPeriodId>,
    /// Debit and credit totals.
    pub totals: VoucherTotals,
    /// Number of ledger entries written.
    pub line_count: usize,
    /// Voucher reversed by this one.
    pub reverses: Option<String>,
}
