//! Credit-weighted rollup of subject grades into teaching-unit averages.
//!
//! Units and coefficients come from the parsed curriculum; grades come from
//! the grade store. Flat record files are supported as a second source.

pub mod aggregate;
pub mod records;
pub mod standing;
pub mod types;

pub use aggregate::{build_title_index, compute_rollups};
pub use standing::{Standing, standing};
pub use types::{TitleIndex, UnitId, UnitResult, WeightedSum};
