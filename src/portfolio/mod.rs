//! Stock holding valuation.

mod models;
mod valuation;

pub use models::*;
pub use valuation::*;
