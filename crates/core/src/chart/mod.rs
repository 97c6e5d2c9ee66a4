//! Chart of accounts: account types and standard account roles.

pub mod account;
pub mod error;
pub mod standard;

pub use account::{AccountInfo, AccountType, ChartService};
pub use error::ChartError;
pub use standard::{StandardAccount, StandardAccountMap};
