//! `SeaORM` entity definitions.

pub mod prelude;

pub mod accounts;
pub mod depreciation_records;
pub mod document_sequences;
pub mod fiscal_periods;
pub mod fixed_assets;
pub mod inventory_lots;
pub mod ledger_entries;
pub mod product_costs;
pub mod sea_orm_active_enums;
pub mod vouchers;
