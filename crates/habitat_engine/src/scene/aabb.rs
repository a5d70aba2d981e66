//! Axis-aligned bounding boxes

use crate::foundation::math::{Mat4, Point3, Vec3};

/// Axis-Aligned Bounding Box for spatial queries
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl AABB {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB centered at a point with given extents (half-size)
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Create an AABB centered at a point with given full size
    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        Self::from_center_extents(center, size * 0.5)
    }

    /// Smallest box enclosing all points, `None` for an empty slice
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut min = *first;
        let mut max = *first;
        for p in rest {
            min = min.inf(p);
            max = max.sup(p);
        }
        Some(Self { min, max })
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the extents (half-size) of the AABB
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Get the full size of the AABB
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// The eight corners, ordered by (x, y, z) bit pattern
    pub fn corners(&self) -> [Vec3; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Vec3::new(lo.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(lo.x, hi.y, hi.z),
            Vec3::new(hi.x, hi.y, hi.z),
        ]
    }

    /// Enclosing box of this box after an affine transform
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        let mut min = Vec3::repeat(f32::INFINITY);
        let mut max = Vec3::repeat(f32::NEG_INFINITY);
        for corner in self.corners() {
            let p = matrix.transform_point(&Point3::from(corner)).coords;
            min = min.inf(&p);
            max = max.sup(&p);
        }
        Self { min, max }
    }

    /// Check if this AABB contains a point
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y &&
        point.z >= self.min.z && point.z <= self.max.z
    }

    /// Check if this AABB intersects another AABB (touching counts)
    pub fn intersects(&self, other: &AABB) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y &&
        self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// Per-axis overlap lengths; non-positive components mean separated on that axis
    pub fn overlap_depths(&self, other: &AABB) -> Vec3 {
        self.max.inf(&other.max) - self.min.sup(&other.min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Transform;
    use approx::assert_relative_eq;

    #[test]
    fn test_aabb_contains_point() {
        let aabb = AABB::new(
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, 1.0, 1.0),
        );

        assert!(aabb.contains_point(Vec3::zeros()));
        assert!(aabb.contains_point(Vec3::new(0.5, 0.5, 0.5)));
        assert!(!aabb.contains_point(Vec3::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn test_aabb_intersects() {
        let aabb1 = AABB::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(2.0, 2.0, 2.0),
        );

        let aabb2 = AABB::new(
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(3.0, 3.0, 3.0),
        );

        let aabb3 = AABB::new(
            Vec3::new(5.0, 5.0, 5.0),
            Vec3::new(7.0, 7.0, 7.0),
        );

        // Shares only the face x = 2
        let touching = AABB::new(
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(4.0, 2.0, 2.0),
        );

        assert!(aabb1.intersects(&aabb2));
        assert!(!aabb1.intersects(&aabb3));
        assert!(aabb1.intersects(&touching));
    }

    #[test]
    fn test_from_points_and_corners() {
        assert!(AABB::from_points(&[]).is_none());

        let aabb = AABB::from_points(&[
            Vec3::new(1.0, -2.0, 0.5),
            Vec3::new(-1.0, 3.0, 0.0),
            Vec3::new(0.0, 0.0, 4.0),
        ])
        .unwrap();
        assert_eq!(aabb.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 3.0, 4.0));
        assert_eq!(AABB::from_points(&aabb.corners()), Some(aabb));
    }

    #[test]
    fn test_transformed_encloses_rotated_box() {
        let unit = AABB::from_center_extents(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
        let transform = Transform {
            position: Vec3::new(10.0, 0.0, 0.0),
            rotation: crate::foundation::math::Quat::from_axis_angle(
                &Vec3::y_axis(),
                std::f32::consts::FRAC_PI_4,
            ),
            scale: Vec3::new(1.0, 1.0, 1.0),
        };
        let world = unit.transformed(&transform.to_matrix());
        let half_diag = 2.0_f32.sqrt();
        assert_relative_eq!(world.min.x, 10.0 - half_diag, epsilon = 1e-5);
        assert_relative_eq!(world.max.z, half_diag, epsilon = 1e-5);
        assert_relative_eq!(world.max.y, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_overlap_depths() {
        let a = AABB::from_center_size(Vec3::zeros(), Vec3::new(2.0, 2.0, 2.0));
        let b = AABB::from_center_size(Vec3::new(1.5, 0.5, 0.0), Vec3::new(2.0, 2.0, 2.0));
        assert_relative_eq!(a.overlap_depths(&b), Vec3::new(0.5, 1.5, 2.0), epsilon = 1e-6);
    }
}
