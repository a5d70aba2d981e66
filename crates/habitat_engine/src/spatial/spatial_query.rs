//! Abstract spatial query interface for broad-phase collision detection
//!
//! This abstraction allows swapping different spatial partitioning schemes
//! (uniform grid, BVH, ...) without changing the placement world.

use std::any::Any;

use crate::scene::{BodyKey, AABB};

/// Abstract interface for spatial partitioning used in broad-phase collision detection.
///
/// Implementations may return false positives from queries but never false
/// negatives: every registered body whose last registered box intersects the
/// query box must be returned.
pub trait SpatialQuery: Send + Sync {
    /// Register a body with its current world-space box
    fn insert(&mut self, key: BodyKey, bounds: &AABB);

    /// Remove a body; unknown keys are ignored
    fn remove(&mut self, key: BodyKey);

    /// Re-register a body after its transform changed
    fn update(&mut self, key: BodyKey, bounds: &AABB);

    /// Candidate bodies whose registered region overlaps `bounds`, minus `exclude`
    fn query_aabb(&self, bounds: &AABB, exclude: Option<BodyKey>) -> Vec<BodyKey>;

    /// Whether a body is registered
    fn contains(&self, key: BodyKey) -> bool;

    /// Clear all bodies from the spatial structure
    fn clear(&mut self);

    /// Get the number of bodies in the structure
    fn entity_count(&self) -> usize;

    /// Downcast to Any for type-specific access (e.g., `SpatialGrid`)
    fn as_any(&self) -> &dyn Any;
}
