//! Spatial partitioning data structures
//!
//! Broad-phase indexing of placed bodies: a uniform hash grid behind the
//! [`SpatialQuery`] interface.

mod grid;
pub mod spatial_query;

pub use grid::{CellKey, SpatialGrid};
pub use spatial_query::SpatialQuery;
