//! Entity re-exports.

pub use super::accounts::Entity as Accounts;
pub use super::depreciation_records::Entity as DepreciationRecords;
pub use super::document_sequences::Entity as DocumentSequences;
pub use super::fiscal_periods::Entity as FiscalPeriods;
pub use super::fixed_assets::Entity as FixedAssets;
pub use super::inventory_lots::Entity as InventoryLots;
pub use super::ledger_entries::Entity as LedgerEntries;
pub use super::product_costs::Entity as ProductCosts;
pub use super::vouchers::Entity as Vouchers;
