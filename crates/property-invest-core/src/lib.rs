pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "mortgage")]
pub mod mortgage;

#[cfg(feature = "ratios")]
pub mod ratios;

#[cfg(feature = "analysis")]
pub mod analysis;

pub use error::PropertyInvestError;
pub use types::*;

/// Standard result type for all property-invest operations
pub type PropertyInvestResult<T> = Result<T, PropertyInvestError>;
