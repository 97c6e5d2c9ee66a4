//! Inventory costing errors.

use rust_decimal::Decimal;
use tally_shared::{ErrorKind, types::ProductId};
use thiserror::Error;

use crate::chart::ChartError;
use crate::ledger::LedgerError;

/// Errors raised by inventory costing operations.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// Requested quantity exceeds unsold stock.
    #[error("Insufficient stock for product {product}: requested {requested}, available {available}")]
    Shortage {
        /// Product.
        product: ProductId,
        /// Quantity requested.
        requested: Decimal,
        /// Quantity on hand.
        available: Decimal,
    },

    /// Quantity must be greater than zero.
    #[error("Quantity must be positive, got {0}")]
    NonPositiveQuantity(Decimal),

    /// Unit cost must not be negative.
    #[error("Unit cost must not be negative, got {0}")]
    NegativeUnitCost(Decimal),

    /// Counted quantity must not be negative.
    #[error("Counted quantity must not be negative, got {0}")]
    NegativeCount(Decimal),

    /// No cost record for the product.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// Cost voucher was rejected by the posting engine.
    #[error(transparent)]
    Posting(#[from] LedgerError),

    /// Standard account could not be resolved.
    #[error(transparent)]
    Chart(#[from] ChartError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl InventoryError {
    /// Broad classification of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Shortage { .. } => ErrorKind::InventoryShortage,
            Self::NonPositiveQuantity(_) | Self::NegativeUnitCost(_) | Self::NegativeCount(_) => {
                ErrorKind::Validation
            }
            Self::ProductNotFound(_) => ErrorKind::NotFound,
            Self::Posting(e) => e.kind(),
            Self::Chart(e) => e.kind(),
            Self::Database(_) => ErrorKind::Database,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Shortage { .. } => "INSUFFICIENT_STOCK",
            Self::NonPositiveQuantity(_) => "NON_POSITIVE_QUANTITY",
            Self::NegativeUnitCost(_) => "NEGATIVE_UNIT_COST",
            Self::NegativeCount(_) => "NEGATIVE_COUNT",
            Self::ProductNotFound(_) => "PRODUCT_NOT_FOUND",
            Self::Posting(e) => e.error_code(),
            Self::Chart(e) => e.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}
