//! Shared setup for the integration suite.
//!
//! Each test gets its own in-memory SQLite database with the real migration
//! applied and the standard chart seeded.

#![allow(dead_code)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tally_core::ledger::{BusinessReference, PostingLine, PostingRequest};
use tally_db::Engines;
use tally_db::migration::Migrator;
use tally_shared::LedgerConfig;
use tally_shared::types::UserId;

pub async fn connect() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    // One connection: every pooled connection would open its own empty database.
    options.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(options).await.expect("Failed to open SQLite");
    Migrator::up(&db, None).await.expect("Failed to run migration");
    db
}

pub async fn setup_with(config: &LedgerConfig) -> Engines {
    let db = connect().await;
    let engines = Engines::new(db, config).expect("Failed to build engines");
    engines
        .accounts
        .seed_standard_chart()
        .await
        .expect("Failed to seed chart");
    engines
}

pub async fn setup() -> Engines {
    setup_with(&LedgerConfig::default()).await
}

pub fn actor() -> UserId {
    UserId::new()
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub fn journal(lines: Vec<PostingLine>, on: NaiveDate) -> PostingRequest {
    PostingRequest::new(lines, BusinessReference::table("manual_journals"), actor()).dated(on)
}

/// Debit `debit_code`, credit `credit_code`, same amount.
pub fn simple(debit_code: &str, credit_code: &str, amount: Decimal, on: NaiveDate) -> PostingRequest {
    journal(
        vec![
            PostingLine::debit(debit_code, amount),
            PostingLine::credit(credit_code, amount),
        ],
        on,
    )
}
