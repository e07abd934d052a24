//! Investment consolidation.

pub mod consolidate;
pub mod types;


pub use consolidate::consolidate;
pub use types::{performance, ConsolidatedInvestment};
