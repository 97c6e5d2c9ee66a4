//! Bootstraps a Tally database.
//!
//! Runs the migration, then seeds the standard chart of accounts, a sequence
//! for every configured document type, and the current year's monthly
//! fiscal periods. Anything already present is left alone, so the seeder can
//! be rerun.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use chrono::{Datelike, Utc};
use sea_orm_migration::MigratorTrait;
use tally_core::fiscal::FiscalError;
use tally_core::sequence::{DEFAULT_TEMPLATE, default_prefix};
use tally_db::migration::Migrator;
use tally_db::{Engines, connect_with};
use tally_shared::{AppConfig, LedgerConfig, LogConfig};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.log);

    let db = connect_with(&config.database)
        .await
        .context("Failed to connect to database")?;
    Migrator::up(&db, None).await.context("Failed to run migrations")?;
    info!("Schema up to date");

    let engines = Engines::new(db, &config.ledger)?;

    let created = engines.accounts.seed_standard_chart().await?;
    info!(count = created.len(), accounts = ?created, "Standard chart seeded");

    seed_sequences(&engines, &config.ledger).await?;
    seed_periods(&engines, Utc::now().year()).await?;

    info!("Seeding complete");
    Ok(())
}

fn init_tracing(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    let registry = tracing_subscriber::registry().with(filter);
    if log.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn seed_sequences(engines: &Engines, ledger: &LedgerConfig) -> anyhow::Result<()> {
    let document_types = [
        &ledger.default_document_type,
        &ledger.reversal_document_type,
        &ledger.closing_document_type,
        &ledger.depreciation_document_type,
        &ledger.cogs_document_type,
        &ledger.adjustment_document_type,
    ];
    for document_type in document_types {
        if engines.sequences.find_sequence(document_type).await?.is_some() {
            continue;
        }
        engines
            .sequences
            .configure(document_type, &default_prefix(document_type), DEFAULT_TEMPLATE)
            .await?;
    }
    Ok(())
}

async fn seed_periods(engines: &Engines, year: i32) -> anyhow::Result<()> {
    match engines.fiscal.create_monthly_periods(year).await {
        Ok(periods) => info!(year, count = periods.len(), "Fiscal periods seeded"),
        Err(FiscalError::OverlappingPeriod { existing, .. }) => {
            info!(year, existing = %existing, "Fiscal periods already present, skipping");
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
