//! Repository abstractions for data access.
//!
//! Repositories load rows, call the pure services in `tally-core`, and write
//! the outcome. Every writing operation runs in one transaction; the `*_in`
//! variants take a connection so engines compose inside a caller's
//! transaction.

pub mod account;
pub mod depreciation;
pub mod fiscal;
pub mod inventory;
pub mod ledger;
pub mod sequence;

pub use account::{AccountRepository, NewAccount};
pub use depreciation::{DepreciationPosting, DepreciationRepository, DepreciationRun, NewAsset};
pub use fiscal::{CloseOutcome, FiscalRepository};
pub use inventory::{InventoryRepository, NewPurchase, PeriodicCount, SaleCost, SaleCostOutcome};
pub use ledger::{LedgerRepository, VoucherWithEntries};
pub use sequence::SequenceRepository;
