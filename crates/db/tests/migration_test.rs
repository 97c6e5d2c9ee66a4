//! Schema migration tests.

mod common;

use sea_orm_migration::{MigratorTrait, SchemaManager};
use tally_db::migration::Migrator;

const TABLES: [&str; 9] = [
    "accounts",
    "fiscal_periods",
    "vouchers",
    "ledger_entries",
    "document_sequences",
    "inventory_lots",
    "product_costs",
    "fixed_assets",
    "depreciation_records",
];

#[tokio::test]
async fn test_migration_creates_every_table_on_sqlite() {
    let db = common::connect().await;
    let manager = SchemaManager::new(&db);

    for table in TABLES {
        assert!(manager.has_table(table).await.expect("has_table"), "{table} missing");
    }
}

#[tokio::test]
async fn test_migration_down_and_up_again() {
    let db = common::connect().await;

    Migrator::down(&db, None).await.expect("down");
    let manager = SchemaManager::new(&db);
    assert!(!manager.has_table("ledger_entries").await.expect("has_table"));

    Migrator::up(&db, None).await.expect("up again");
    assert!(manager.has_table("ledger_entries").await.expect("has_table"));
}
