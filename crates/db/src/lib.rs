//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - The schema migration
//! - Transactional repositories for the posting engine and the engines that
//!   post through it

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{
    AccountRepository, DepreciationRepository, FiscalRepository, InventoryRepository,
    LedgerRepository, SequenceRepository,
};

use std::time::Duration;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use tally_core::chart::{ChartError, StandardAccountMap};
use tally_shared::{DatabaseConfig, LedgerConfig};
use tracing::info;

/// Every engine wired to one connection pool and one configuration.
#[derive(Debug, Clone)]
pub struct Engines {
    /// Shared connection pool.
    pub db: DatabaseConnection,
    /// Chart of accounts.
    pub accounts: AccountRepository,
    /// Document sequences.
    pub sequences: SequenceRepository,
    /// Posting engine.
    pub ledger: LedgerRepository,
    /// Fiscal periods.
    pub fiscal: FiscalRepository,
    /// Inventory costing.
    pub inventory: InventoryRepository,
    /// Depreciation.
    pub depreciation: DepreciationRepository,
}

impl Engines {
    /// Builds every repository.
    ///
    /// # Errors
    ///
    /// Returns `UnknownRole` if `config.accounts` names a role that does not
    /// exist.
    pub fn new(db: DatabaseConnection, config: &LedgerConfig) -> Result<Self, ChartError> {
        let standard = StandardAccountMap::from_overrides(&config.accounts)?;
        let accounts = AccountRepository::new(db.clone(), standard);
        let ledger = LedgerRepository::new(db.clone(), config);

        Ok(Self {
            sequences: SequenceRepository::new(db.clone()),
            fiscal: FiscalRepository::new(db.clone(), ledger.clone(), accounts.clone(), config),
            inventory: InventoryRepository::new(db.clone(), ledger.clone(), accounts.clone(), config),
            depreciation: DepreciationRepository::new(db.clone(), ledger.clone(), accounts.clone(), config),
            db,
            accounts,
            ledger,
        })
    }
}

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}

/// Opens a pool sized by `config`.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect_with(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    let db = Database::connect(options).await?;
    info!(
        backend = ?db.get_database_backend(),
        max_connections = config.max_connections,
        "Database connected"
    );
    Ok(db)
}
