//! Resolved datasets (noun module)
//!
//! What a dataset model produces: resolved dimensions for presentation and
//! the indexed points returned by the region queries.

mod dimension;
mod indexed;

pub use dimension::{Dimension, DimensionSegment, DimensionValue};
pub use indexed::{assignment, Assignment, Dataset, Point};
