//! Ledger core schema.
//!
//! Creates accounts, vouchers, ledger entries, fiscal periods, document
//! sequences, inventory lots and costs, fixed assets, and depreciation records.
//! Built with the schema builder so the same migration runs on PostgreSQL and
//! SQLite.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let precision = money_precision(manager.get_database_backend());

        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Accounts::Code).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Accounts::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Accounts::AccountType).string_len(16).not_null())
                    .col(ColumnDef::new(Accounts::ParentCode).string_len(32).null())
                    .col(ColumnDef::new(Accounts::IsActive).boolean().not_null().default(true))
                    .col(timestamp(Accounts::CreatedAt))
                    .col(timestamp(Accounts::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_accounts_parent")
                            .from(Accounts::Table, Accounts::ParentCode)
                            .to(Accounts::Table, Accounts::Code)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FiscalPeriods::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(FiscalPeriods::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(FiscalPeriods::Name).string_len(64).not_null())
                    .col(ColumnDef::new(FiscalPeriods::StartDate).date().not_null())
                    .col(ColumnDef::new(FiscalPeriods::EndDate).date().not_null())
                    .col(ColumnDef::new(FiscalPeriods::IsLocked).boolean().not_null().default(false))
                    .col(ColumnDef::new(FiscalPeriods::IsClosed).boolean().not_null().default(false))
                    .col(ColumnDef::new(FiscalPeriods::LockedBy).uuid().null())
                    .col(ColumnDef::new(FiscalPeriods::LockedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(FiscalPeriods::ClosedBy).uuid().null())
                    .col(ColumnDef::new(FiscalPeriods::ClosedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(FiscalPeriods::NetIncome).decimal_len(precision, 4).null())
                    .col(ColumnDef::new(FiscalPeriods::ClosingVoucherNumber).string_len(64).null())
                    .col(timestamp(FiscalPeriods::CreatedAt))
                    .col(timestamp(FiscalPeriods::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_fiscal_periods_dates")
                    .table(FiscalPeriods::Table)
                    .col(FiscalPeriods::StartDate)
                    .col(FiscalPeriods::EndDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Vouchers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Vouchers::VoucherNumber).string_len(64).not_null().primary_key())
                    .col(ColumnDef::new(Vouchers::VoucherDate).date().not_null())
                    .col(ColumnDef::new(Vouchers::DocumentType).string_len(16).not_null())
                    .col(ColumnDef::new(Vouchers::Description).text().null())
                    .col(ColumnDef::new(Vouchers::ReferenceTable).string_len(64).not_null())
                    .col(ColumnDef::new(Vouchers::ReferenceId).string_len(64).null())
                    .col(ColumnDef::new(Vouchers::FiscalPeriodId).uuid().null())
                    .col(
                        ColumnDef::new(Vouchers::ReversesVoucherNumber)
                            .string_len(64)
                            .null()
                            .unique_key(),
                    )
                    .col(money(Vouchers::TotalAmount, precision))
                    .col(ColumnDef::new(Vouchers::CreatedBy).uuid().not_null())
                    .col(timestamp(Vouchers::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vouchers_fiscal_period")
                            .from(Vouchers::Table, Vouchers::FiscalPeriodId)
                            .to(FiscalPeriods::Table, FiscalPeriods::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LedgerEntries::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(LedgerEntries::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(LedgerEntries::VoucherNumber).string_len(64).not_null())
                    .col(ColumnDef::new(LedgerEntries::AccountCode).string_len(32).not_null())
                    .col(ColumnDef::new(LedgerEntries::EntryType).string_len(8).not_null())
                    .col(money(LedgerEntries::Amount, precision))
                    .col(ColumnDef::new(LedgerEntries::Memo).text().null())
                    .col(ColumnDef::new(LedgerEntries::ReferenceTable).string_len(64).not_null())
                    .col(ColumnDef::new(LedgerEntries::ReferenceId).string_len(64).null())
                    .col(ColumnDef::new(LedgerEntries::VoucherDate).date().not_null())
                    .col(ColumnDef::new(LedgerEntries::FiscalPeriodId).uuid().null())
                    .col(ColumnDef::new(LedgerEntries::IsClosed).boolean().not_null().default(false))
                    .col(ColumnDef::new(LedgerEntries::CreatedBy).uuid().not_null())
                    .col(timestamp(LedgerEntries::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ledger_entries_voucher")
                            .from(LedgerEntries::Table, LedgerEntries::VoucherNumber)
                            .to(Vouchers::Table, Vouchers::VoucherNumber)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ledger_entries_account")
                            .from(LedgerEntries::Table, LedgerEntries::AccountCode)
                            .to(Accounts::Table, Accounts::Code)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Balance reads and period aggregation
        manager
            .create_index(
                Index::create()
                    .name("idx_ledger_entries_account_date")
                    .table(LedgerEntries::Table)
                    .col(LedgerEntries::AccountCode)
                    .col(LedgerEntries::VoucherDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ledger_entries_voucher")
                    .table(LedgerEntries::Table)
                    .col(LedgerEntries::VoucherNumber)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DocumentSequences::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DocumentSequences::DocumentType)
                            .string_len(16)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DocumentSequences::Prefix).string_len(32).not_null())
                    .col(ColumnDef::new(DocumentSequences::Counter).big_integer().not_null().default(0))
                    .col(ColumnDef::new(DocumentSequences::FormatTemplate).string_len(64).not_null())
                    .col(timestamp(DocumentSequences::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(InventoryLots::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(InventoryLots::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(InventoryLots::ProductId).uuid().not_null())
                    .col(ColumnDef::new(InventoryLots::PurchaseReference).string_len(64).not_null())
                    .col(money(InventoryLots::Quantity, precision))
                    .col(money(InventoryLots::RemainingQuantity, precision))
                    .col(money(InventoryLots::UnitCost, precision))
                    .col(money(InventoryLots::TotalCost, precision))
                    .col(ColumnDef::new(InventoryLots::PurchasedOn).date().not_null())
                    .col(ColumnDef::new(InventoryLots::IsSold).boolean().not_null().default(false))
                    .col(timestamp(InventoryLots::CreatedAt))
                    .to_owned(),
            )
            .await?;

        // FIFO walk: unsold lots of one product in purchase order
        manager
            .create_index(
                Index::create()
                    .name("idx_inventory_lots_fifo")
                    .table(InventoryLots::Table)
                    .col(InventoryLots::ProductId)
                    .col(InventoryLots::IsSold)
                    .col(InventoryLots::PurchasedOn)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProductCosts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ProductCosts::ProductId).uuid().not_null().primary_key())
                    .col(money(ProductCosts::AverageCost, precision))
                    .col(money(ProductCosts::QuantityOnHand, precision))
                    .col(timestamp(ProductCosts::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FixedAssets::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(FixedAssets::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(FixedAssets::Name).string_len(255).not_null())
                    .col(money(FixedAssets::AcquisitionValue, precision))
                    .col(ColumnDef::new(FixedAssets::MonthlyRate).decimal_len(9, 6).not_null())
                    .col(ColumnDef::new(FixedAssets::AcquiredOn).date().not_null())
                    .col(ColumnDef::new(FixedAssets::IsActive).boolean().not_null().default(true))
                    .col(timestamp(FixedAssets::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DepreciationRecords::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(DepreciationRecords::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(DepreciationRecords::AssetId).uuid().not_null())
                    .col(ColumnDef::new(DepreciationRecords::FiscalPeriodId).uuid().not_null())
                    .col(ColumnDef::new(DepreciationRecords::RecordDate).date().not_null())
                    .col(money(DepreciationRecords::Amount, precision))
                    .col(money(DepreciationRecords::Accumulated, precision))
                    .col(money(DepreciationRecords::BookValue, precision))
                    .col(ColumnDef::new(DepreciationRecords::VoucherNumber).string_len(64).not_null())
                    .col(ColumnDef::new(DepreciationRecords::CreatedBy).uuid().not_null())
                    .col(timestamp(DepreciationRecords::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_depreciation_records_asset")
                            .from(DepreciationRecords::Table, DepreciationRecords::AssetId)
                            .to(FixedAssets::Table, FixedAssets::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_depreciation_records_period")
                            .from(DepreciationRecords::Table, DepreciationRecords::FiscalPeriodId)
                            .to(FiscalPeriods::Table, FiscalPeriods::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // One depreciation charge per asset per period
        manager
            .create_index(
                Index::create()
                    .name("uq_depreciation_records_asset_period")
                    .table(DepreciationRecords::Table)
                    .col(DepreciationRecords::AssetId)
                    .col(DepreciationRecords::FiscalPeriodId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DepreciationRecords::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FixedAssets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProductCosts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(InventoryLots::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DocumentSequences::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LedgerEntries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Vouchers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FiscalPeriods::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await
    }
}

/// SQLite caps declared decimal precision at 16 digits.
const fn money_precision(backend: sea_orm::DbBackend) -> u32 {
    match backend {
        sea_orm::DbBackend::Sqlite => 16,
        _ => 19,
    }
}

fn money<T: IntoIden>(column: T, precision: u32) -> ColumnDef {
    ColumnDef::new(column).decimal_len(precision, 4).not_null().to_owned()
}

fn timestamp<T: IntoIden>(column: T) -> ColumnDef {
    ColumnDef::new(column)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

#[derive(DeriveIden)]
enum Accounts {
    Table,
    Code,
    Name,
    AccountType,
    ParentCode,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum FiscalPeriods {
    Table,
    Id,
    Name,
    StartDate,
    EndDate,
    IsLocked,
    IsClosed,
    LockedBy,
    LockedAt,
    ClosedBy,
    ClosedAt,
    NetIncome,
    ClosingVoucherNumber,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Vouchers {
    Table,
    VoucherNumber,
    VoucherDate,
    DocumentType,
    Description,
    ReferenceTable,
    ReferenceId,
    FiscalPeriodId,
    ReversesVoucherNumber,
    TotalAmount,
    CreatedBy,
    CreatedAt,
}

#[derive(DeriveIden)]
enum LedgerEntries {
    Table,
    Id,
    VoucherNumber,
    AccountCode,
    EntryType,
    Amount,
    Memo,
    ReferenceTable,
    ReferenceId,
    VoucherDate,
    FiscalPeriodId,
    IsClosed,
    CreatedBy,
    CreatedAt,
}

#[derive(DeriveIden)]
enum DocumentSequences {
    Table,
    DocumentType,
    Prefix,
    Counter,
    FormatTemplate,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum InventoryLots {
    Table,
    Id,
    ProductId,
    PurchaseReference,
    Quantity,
    RemainingQuantity,
    UnitCost,
    TotalCost,
    PurchasedOn,
    IsSold,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ProductCosts {
    Table,
    ProductId,
    AverageCost,
    QuantityOnHand,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum FixedAssets {
    Table,
    Id,
    Name,
    AcquisitionValue,
    MonthlyRate,
    AcquiredOn,
    IsActive,
    CreatedAt,
}

#[derive(DeriveIden)]
enum DepreciationRecords {
    Table,
    Id,
    AssetId,
    FiscalPeriodId,
    RecordDate,
    Amount,
    Accumulated,
    BookValue,
    VoucherNumber,
    CreatedBy,
    CreatedAt,
}
