//! Bounding volumes for placed bodies
//!
//! Pure functions of geometry + transform. Nothing is cached: every call reads
//! the transform it is given, so callers never see a stale box.

use crate::foundation::math::Transform;
use crate::physics::collision::BoundingSphere;
use crate::scene::{Geometry, RigidBody, AABB};

/// World-space AABB of a body at its current transform.
///
/// Returns `None` if the body has no geometry.
pub fn compute_aabb(body: &RigidBody) -> Option<AABB> {
    compute_aabb_at(&body.geometry, &body.transform)
}

/// World-space AABB of `geometry` as if placed at `transform`.
///
/// The eight corners of the model-space box are pushed through the world
/// matrix, so rotated bodies get the box enclosing their rotated extents.
pub fn compute_aabb_at(geometry: &Geometry, transform: &Transform) -> Option<AABB> {
    geometry
        .local_bounds()
        .map(|local| local.transformed(&transform.to_matrix()))
}

/// Bounding sphere of a body at its current transform (derived from the AABB)
pub fn compute_bounding_sphere(body: &RigidBody) -> Option<BoundingSphere> {
    compute_aabb(body).map(|aabb| BoundingSphere::from_aabb(&aabb))
}

/// Bounding sphere of `geometry` as if placed at `transform`
pub fn compute_bounding_sphere_at(geometry: &Geometry, transform: &Transform) -> Option<BoundingSphere> {
    compute_aabb_at(geometry, transform).map(|aabb| BoundingSphere::from_aabb(&aabb))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Quat, Vec3};
    use approx::assert_relative_eq;
    use std::sync::Arc;

    #[test]
    fn test_aabb_follows_transform() {
        let body = RigidBody::new(
            Arc::new(Geometry::cuboid(2.0, 2.0, 2.0)),
            Transform {
                position: Vec3::new(5.0, 1.0, 0.0),
                rotation: Quat::identity(),
                scale: Vec3::new(2.0, 1.0, 1.0),
            },
        );
        let aabb = compute_aabb(&body).unwrap();
        assert_relative_eq!(aabb.min, Vec3::new(3.0, 0.0, -1.0), epsilon = 1e-6);
        assert_relative_eq!(aabb.max, Vec3::new(7.0, 2.0, 1.0), epsilon = 1e-6);
    }

    #[test]
    fn test_missing_geometry_yields_none() {
        let body = RigidBody::new(Arc::new(Geometry::empty()), Transform::identity());
        assert!(compute_aabb(&body).is_none());
        assert!(compute_bounding_sphere(&body).is_none());
    }

    #[test]
    fn test_sphere_is_derived_from_box() {
        let geometry = Geometry::cuboid(2.0, 4.0, 4.0);
        let sphere = compute_bounding_sphere_at(&geometry, &Transform::from_position(Vec3::x())).unwrap();
        assert_eq!(sphere.center, Vec3::x());
        assert_relative_eq!(sphere.radius, 3.0, epsilon = 1e-6);
    }
}
