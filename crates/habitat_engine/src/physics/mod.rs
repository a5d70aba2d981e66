//! Collision detection and placement
//!
//! Broad phase lives in [`crate::spatial`]; this module holds the bounding
//! volumes, the narrow-phase test, the placement searches, magnetic snapping,
//! and the [`PlacementWorld`] that ties them to a scene's bodies.

pub mod attachment;
pub mod bounds;
pub mod collision;
pub mod narrow_phase;
pub mod placement;
mod world;

pub use attachment::{
    are_points_compatible,
    calculate_magnetic_force,
    calculate_snap_transform,
    find_closest_attachment_point,
    get_attachment_points,
    AttachmentMatch,
    Connection,
    ConnectionError,
    SnapTransform,
    WorldAttachmentPoint,
};
pub use bounds::{compute_aabb, compute_aabb_at, compute_bounding_sphere, compute_bounding_sphere_at};
pub use collision::{BoundingSphere, Ray, Triangle};
pub use narrow_phase::{boxes_intersect, check_collision, spheres_intersect, CollisionInfo};
pub use placement::get_safe_position;
pub use world::PlacementWorld;
