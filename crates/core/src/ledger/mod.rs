//! Double-entry posting logic.
//!
//! This module implements the core ledger functionality:
//! - Posting requests and voucher results
//! - Voucher validation (entry count, amounts, accounts, balance)
//! - Posting period checks
//! - Account balance calculation
//! - Reversal mirroring
//! - Error types for ledger operations

pub mod balance;
pub mod error;
pub mod reversal;
pub mod service;
pub mod types;

#[cfg(test)]
mod reversal_props;
#[cfg(test)]
mod service_props;

pub use balance::AccountBalance;
pub use error::LedgerError;
pub use reversal::ReversalService;
pub use service::{LedgerService, PostingGuard, PostingPeriod};
pub use types::{
    BusinessReference, EntryType, PostedVoucher, PostingLine, PostingRequest, VoucherTotals,
};
