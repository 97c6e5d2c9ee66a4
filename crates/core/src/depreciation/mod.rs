//! Fixed asset depreciation.
//!
//! Straight-line: each month charges `acquisition_value * monthly_rate` until
//! the book value reaches zero. At most one charge per asset per period.

pub mod error;
pub mod service;

#[cfg(test)]
mod service_props;

pub use error::DepreciationError;
pub use service::{DepreciationCharge, DepreciationService};
