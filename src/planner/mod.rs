//! Region planner (verb module)
//!
//! Enumerates the regions of a dataset model, builds one aggregate query per
//! region and turns the returned rows into points.

mod extract;
mod query;
mod region;

pub use extract::extract;
pub use query::{construct_query, RegionQuery};
pub use region::{region_for, region_indexes};
