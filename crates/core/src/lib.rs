//! Core posting engine logic for Tally.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here; `tally-db`
//! loads rows, calls into these services, and persists the outcome.
//!
//! # Modules
//!
//! - `chart` - Account types, normal balances, and standard account roles
//! - `ledger` - Voucher validation, balances, and reversal mirroring
//! - `sequence` - Document type validation and voucher number formatting
//! - `fiscal` - Period lifecycle and closing entries
//! - `inventory` - FIFO lots, moving weighted-average cost, count adjustments
//! - `depreciation` - Straight-line monthly depreciation

pub mod chart;
pub mod depreciation;
pub mod fiscal;
pub mod inventory;
pub mod ledger;
pub mod sequence;
