//! Application configuration management.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use crate::types::BALANCE_TOLERANCE;

/// Environment variable prefix, e.g. `TALLY__DATABASE__URL`.
pub const ENV_PREFIX: &str = "TALLY";

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Sources could not be read or deserialized.
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// Balance tolerance must not be negative.
    #[error("ledger.balance_tolerance must not be negative, got {0}")]
    NegativeTolerance(Decimal),

    /// A document type setting is blank.
    #[error("ledger.{0} must not be empty")]
    EmptyDocumentType(&'static str),
}

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Posting engine configuration.
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Logging configuration.
    #[serde(default)]
    pub log: LogConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Posting engine policy and document numbering.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Largest accepted gap between voucher debits and credits.
    pub balance_tolerance: Decimal,
    /// Document type used when a posting names none.
    pub default_document_type: String,
    /// Document type for reversing vouchers.
    pub reversal_document_type: String,
    /// Document type for period closing vouchers.
    pub closing_document_type: String,
    /// Document type for depreciation vouchers.
    pub depreciation_document_type: String,
    /// Document type for cost-of-goods-sold vouchers.
    pub cogs_document_type: String,
    /// Document type for stock count adjustments.
    pub adjustment_document_type: String,
    /// Reject postings dated outside every fiscal period.
    pub require_fiscal_period: bool,
    /// Only close periods that were explicitly locked first.
    pub require_lock_before_close: bool,
    /// Standard account role key to account code overrides.
    pub accounts: HashMap<String, String>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            balance_tolerance: BALANCE_TOLERANCE,
            default_document_type: "JV".to_string(),
            reversal_document_type: "REV".to_string(),
            closing_document_type: "CLS".to_string(),
            depreciation_document_type: "DEP".to_string(),
            cogs_document_type: "COGS".to_string(),
            adjustment_document_type: "ADJ".to_string(),
            require_fiscal_period: false,
            require_lock_before_close: false,
            accounts: HashMap::new(),
        }
    }
}

impl LedgerConfig {
    /// Checks values serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns an error for a negative tolerance or a blank document type.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.balance_tolerance.is_sign_negative() {
            return Err(ConfigError::NegativeTolerance(self.balance_tolerance));
        }

        let document_types = [
            ("default_document_type", &self.default_document_type),
            ("reversal_document_type", &self.reversal_document_type),
            ("closing_document_type", &self.closing_document_type),
            ("depreciation_document_type", &self.depreciation_document_type),
            ("cogs_document_type", &self.cogs_document_type),
            ("adjustment_document_type", &self.adjustment_document_type),
        ];
        for (field, value) in document_types {
            if value.trim().is_empty() {
                return Err(ConfigError::EmptyDocumentType(field));
            }
        }

        Ok(())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        let app: Self = config.try_deserialize()?;
        app.ledger.validate()?;
        Ok(app)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_ledger_defaults() {
        let ledger = LedgerConfig::default();
        assert_eq!(ledger.balance_tolerance, dec!(0.01));
        assert_eq!(ledger.default_document_type, "JV");
        assert_eq!(ledger.reversal_document_type, "REV");
        assert_eq!(ledger.closing_document_type, "CLS");
        assert!(!ledger.require_fiscal_period);
        assert!(!ledger.require_lock_before_close);
        assert!(ledger.validate().is_ok());
    }

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("RUN_MODE", Some("test")),
                ("TALLY__DATABASE__URL", Some("sqlite::memory:")),
                ("TALLY__DATABASE__MAX_CONNECTIONS", Some("4")),
                ("TALLY__LEDGER__REQUIRE_LOCK_BEFORE_CLOSE", Some("true")),
                ("TALLY__LOG__JSON", Some("true")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "sqlite::memory:");
                assert_eq!(config.database.max_connections, 4);
                assert_eq!(config.database.min_connections, 1);
                assert!(config.ledger.require_lock_before_close);
                assert_eq!(config.ledger.default_document_type, "JV");
                assert!(config.log.json);
                assert_eq!(config.log.filter, "info");
            },
        );
    }

    #[test]
    fn test_load_requires_database_url() {
        temp_env::with_vars(
            [
                ("RUN_MODE", Some("test")),
                ("TALLY__DATABASE__URL", None::<&str>),
            ],
            || {
                assert!(matches!(AppConfig::load(), Err(ConfigError::Load(_))));
            },
        );
    }

    #[test]
    fn test_negative_tolerance_rejected() {
        let ledger = LedgerConfig {
            balance_tolerance: dec!(-0.01),
            ..LedgerConfig::default()
        };
        assert!(matches!(
            ledger.validate(),
            Err(ConfigError::NegativeTolerance(_))
        ));
    }

    #[test]
    fn test_blank_document_type_rejected() {
        let ledger = LedgerConfig {
            closing_document_type: "  ".to_string(),
            ..LedgerConfig::default()
        };
        assert!(matches!(
            ledger.validate(),
            Err(ConfigError::EmptyDocumentType("closing_document_type"))
        ));
    }
}
