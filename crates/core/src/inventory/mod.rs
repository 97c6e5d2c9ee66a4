//! Inventory costing.
//!
//! - FIFO consumption across purchase lots
//! - Moving weighted-average cost per product
//! - Period-end physical count adjustments

pub mod adjustment;
pub mod average;
pub mod error;
pub mod fifo;

#[cfg(test)]
mod fifo_props;

pub use adjustment::{adjustment_lines, periodic_adjustment, sale_cost_lines};
pub use average::{moving_average_cost, validate_purchase};
pub use error::InventoryError;
pub use fifo::{FifoConsumption, FifoCosting, LotBalance, LotDraw};
