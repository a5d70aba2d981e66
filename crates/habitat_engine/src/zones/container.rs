//! Parent volumes that zones must stay inside

use crate::foundation::math::{Transform, Unit, Vec3};
use crate::physics::collision::{Ray, Triangle};
use crate::scene::{Geometry, AABB};

use super::zone::{get_zone_corners, Zone};

/// Slack for points lying on the container surface
const SURFACE_EPSILON: f32 = 1.0e-4;

/// Shape of a container beyond its bounding box
#[derive(Debug, Clone, PartialEq)]
pub enum ContainerShape {
    /// The bounding box itself
    Box,
    /// A capped cylinder
    Cylinder {
        /// Center of the cylinder
        center: Vec3,
        /// Unit axis direction
        axis: Unit<Vec3>,
        /// Inner radius
        radius: f32,
        /// Length along the axis
        length: f32,
    },
    /// An arbitrary closed shell in world space
    Mesh {
        /// Shell triangles
        triangles: Vec<Triangle>,
    },
}

/// The parent shape zones are fitted into, usually the habitat hull
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    /// Exact shape
    pub shape: ContainerShape,
    /// World-space bounding box
    pub bounds: AABB,
}

impl Container {
    /// Box-shaped container
    pub fn cuboid(bounds: AABB) -> Self {
        Self {
            shape: ContainerShape::Box,
            bounds,
        }
    }

    /// Cylinder container; a zero axis falls back to +Y
    pub fn cylinder(center: Vec3, axis: Vec3, radius: f32, length: f32) -> Self {
        let axis = Unit::try_new(axis, f32::EPSILON).unwrap_or_else(Vec3::y_axis);
        let half_length = length * 0.5;
        // Per-axis extent of a disc cap plus the axial half-length
        let extents = Vec3::from_fn(|i, _| {
            let a = axis[i];
            a.abs() * half_length + radius * (1.0 - a * a).max(0.0).sqrt()
        });

        Self {
            shape: ContainerShape::Cylinder {
                center,
                axis,
                radius,
                length,
            },
            bounds: AABB::from_center_extents(center, extents),
        }
    }

    /// Mesh container from geometry placed at `transform`; `None` without vertices
    pub fn from_mesh(geometry: &Geometry, transform: &Transform) -> Option<Self> {
        let world: Vec<Vec3> = geometry.vertices.iter().map(|v| transform.transform_point(v)).collect();
        let bounds = AABB::from_points(&world)?;
        let triangles = geometry
            .triangles()
            .map(|triangle| triangle.map(|v| transform.transform_point(v)))
            .collect();

        Some(Self {
            shape: ContainerShape::Mesh { triangles },
            bounds,
        })
    }

    /// Whether a point is inside.
    ///
    /// For meshes this casts a ray from the point away from the container
    /// center and requires it to hit the shell. That is exact for convex
    /// shells seen from their center and only a heuristic otherwise.
    pub fn contains_point(&self, point: &Vec3) -> bool {
        let slack = AABB::from_center_extents(
            self.bounds.center(),
            self.bounds.extents() + Vec3::repeat(SURFACE_EPSILON),
        );
        if !slack.contains_point(*point) {
            return false;
        }

        match &self.shape {
            ContainerShape::Box => true,
            ContainerShape::Cylinder {
                center,
                axis,
                radius,
                length,
            } => {
                let offset = point - center;
                let along = offset.dot(axis.as_ref());
                let radial = (offset - axis.into_inner() * along).magnitude();
                along.abs() <= length * 0.5 + SURFACE_EPSILON && radial <= radius + SURFACE_EPSILON
            }
            ContainerShape::Mesh { triangles } => {
                let outward = (point - self.bounds.center())
                    .try_normalize(f32::EPSILON)
                    .unwrap_or_else(Vec3::y);
                let ray = Ray::new(*point, outward);
                triangles.iter().any(|triangle| triangle.intersect_ray(&ray).is_some())
            }
        }
    }

    /// Center of the container's bounding box
    pub fn center(&self) -> Vec3 {
        self.bounds.center()
    }
}

/// Whether all eight corners of the zone lie inside the container
pub fn is_zone_contained(zone: &Zone, container: &Container) -> bool {
    get_zone_corners(zone)
        .iter()
        .all(|corner| container.contains_point(corner))
}
