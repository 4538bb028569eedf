pub mod error;
pub mod money;
pub mod types;

#[cfg(feature = "schedule")]
pub mod schedule;

#[cfg(feature = "reconcile")]
pub mod reconcile;

#[cfg(feature = "posting")]
pub mod posting;

#[cfg(feature = "reporting")]
pub mod reporting;

pub use error::LedgerError;
pub use types::*;

/// Standard result type for all ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
