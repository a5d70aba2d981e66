//! Narrow-phase overlap tests
//!
//! Candidates from the broad phase are confirmed here with a sphere reject
//! followed by an exact box test. Hypothetical placements are evaluated by
//! computing the box for the candidate transform directly; the body's own
//! transform is never touched, so checks are re-entrant.

use crate::foundation::math::Transform;
use crate::physics::bounds::compute_aabb_at;
use crate::physics::collision::BoundingSphere;
use crate::scene::{BodyKey, Geometry, RigidBody, AABB};

/// First confirmed overlap found by [`check_collision`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionInfo {
    /// The body that was hit
    pub other: BodyKey,
    /// Distance between the two box centers
    pub center_distance: f32,
    /// Smallest per-axis overlap of the two boxes
    pub penetration_depth: f32,
}

/// Exact sphere-sphere test (touching counts)
pub fn spheres_intersect(a: &BoundingSphere, b: &BoundingSphere) -> bool {
    a.intersects(b)
}

/// Exact box-box test: `a.max >= b.min && a.min <= b.max` on every axis
pub fn boxes_intersect(a: &AABB, b: &AABB) -> bool {
    a.intersects(b)
}

/// Would `body` overlap any candidate if it were placed at `hypothetical`?
///
/// Candidates are tested in the order given and the first confirmed hit is
/// returned, not the deepest. The body itself is skipped if it appears in the
/// list, and bodies without geometry never collide.
pub fn check_collision(
    body: &RigidBody,
    hypothetical: &Transform,
    candidates: &[&RigidBody],
) -> Option<CollisionInfo> {
    check_geometry_collision(&body.geometry, hypothetical, Some(body.key), candidates)
}

/// [`check_collision`] for geometry that is not (yet) a registered body
pub fn check_geometry_collision(
    geometry: &Geometry,
    transform: &Transform,
    exclude: Option<BodyKey>,
    candidates: &[&RigidBody],
) -> Option<CollisionInfo> {
    let aabb = compute_aabb_at(geometry, transform)?;
    let sphere = BoundingSphere::from_aabb(&aabb);

    candidates
        .iter()
        .filter(|other| Some(other.key) != exclude)
        .find_map(|other| {
            let other_aabb = compute_aabb_at(&other.geometry, &other.transform)?;
            let other_sphere = BoundingSphere::from_aabb(&other_aabb);

            if !spheres_intersect(&sphere, &other_sphere) || !boxes_intersect(&aabb, &other_aabb) {
                return None;
            }

            let depths = aabb.overlap_depths(&other_aabb);
            Some(CollisionInfo {
                other: other.key,
                center_distance: (sphere.center - other_sphere.center).magnitude(),
                penetration_depth: depths.min().max(0.0),
            })
        })
}
