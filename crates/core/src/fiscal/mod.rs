//! Fiscal period management.
//!
//! - Period lifecycle: open → locked ⇄ open → closed
//! - Date range and overlap rules
//! - Monthly period generation
//! - Closing entries into retained earnings

pub mod closing;
pub mod error;
pub mod period;

#[cfg(test)]
mod closing_props;

pub use closing::{ClosingPlan, ClosingService, TemporaryBalance};
pub use error::FiscalError;
pub use period::{PeriodDraft, PeriodState, date_ranges_overlap, monthly_periods, validate_date_range};
