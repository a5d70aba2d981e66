//! Oriented-box overlap via the separating axis theorem

use crate::foundation::math::Vec3;

use super::zone::Zone;

/// A box with its own orthonormal axes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedBox {
    /// World-space center
    pub center: Vec3,
    /// Local X, Y, Z axes in world space
    pub axes: [Vec3; 3],
    /// Half extents along each local axis
    pub half_extents: Vec3,
}

impl OrientedBox {
    /// The zone's box in world space
    pub fn from_zone(zone: &Zone) -> Self {
        let rotation = zone.orientation();
        Self {
            center: zone.center(),
            axes: [rotation * Vec3::x(), rotation * Vec3::y(), rotation * Vec3::z()],
            half_extents: zone.half_extents(),
        }
    }

    /// Projection interval onto a unit axis
    fn project(&self, axis: &Vec3) -> (f32, f32) {
        let center = axis.dot(&self.center);
        let radius = (0..3)
            .map(|i| axis.dot(&self.axes[i]).abs() * self.half_extents[i])
            .sum::<f32>();
        (center - radius, center + radius)
    }

    /// Whether the boxes interpenetrate by more than `tolerance`.
    ///
    /// Tests the 15 candidate axes: 3 face normals of each box and the 9 edge
    /// cross products. Boxes whose projections overlap by no more than
    /// `tolerance` on some axis are only touching.
    pub fn intersects(&self, other: &OrientedBox, tolerance: f32) -> bool {
        const EPSILON: f32 = 0.000001;

        // Returns false if `axis` separates the boxes
        let test_axis = |axis: Vec3| {
            let length_sq = axis.magnitude_squared();
            if length_sq < EPSILON {
                return true; // Parallel edges, covered by the face axes
            }

            let axis = axis / length_sq.sqrt();
            let (min1, max1) = self.project(&axis);
            let (min2, max2) = other.project(&axis);
            max1.min(max2) - min1.max(min2) > tolerance
        };

        if !self.axes.iter().chain(other.axes.iter()).all(|axis| test_axis(*axis)) {
            return false;
        }

        self.axes
            .iter()
            .all(|a| other.axes.iter().all(|b| test_axis(a.cross(b))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::constants::QUARTER_PI;
    use crate::zones::zone::ZoneSize;

    fn zone(center: Vec3, size: f32, rotation: [f32; 3]) -> OrientedBox {
        OrientedBox::from_zone(
            &Zone::new("z", "test", center, ZoneSize::new(size, size, size)).with_rotation(rotation),
        )
    }

    #[test]
    fn test_axis_aligned_overlap_and_contact() {
        let a = zone(Vec3::zeros(), 2.0, [0.0; 3]);
        assert!(a.intersects(&zone(Vec3::new(1.5, 0.0, 0.0), 2.0, [0.0; 3]), 1e-4));
        assert!(!a.intersects(&zone(Vec3::new(2.0, 0.0, 0.0), 2.0, [0.0; 3]), 1e-4));
        assert!(!a.intersects(&zone(Vec3::new(0.0, 3.0, 0.0), 2.0, [0.0; 3]), 1e-4));
    }

    #[test]
    fn test_rotated_boxes_with_overlapping_aabbs_can_be_separate() {
        // Diamond next to a cube: enclosing boxes overlap, the solids do not
        let cube = zone(Vec3::zeros(), 2.0, [0.0; 3]);
        let diamond = zone(Vec3::new(2.0, 2.0, 0.0), 2.0, [0.0, 0.0, QUARTER_PI]);
        assert!(!cube.intersects(&diamond, 1e-4));

        let closer = zone(Vec3::new(1.5, 1.5, 0.0), 2.0, [0.0, 0.0, QUARTER_PI]);
        assert!(cube.intersects(&closer, 1e-4));
    }

    #[test]
    fn test_boxes_turned_about_different_axes() {
        let a = zone(Vec3::zeros(), 2.0, [QUARTER_PI, 0.0, 0.0]);
        let b = zone(Vec3::new(0.0, 2.2, 2.2), 2.0, [0.0, QUARTER_PI, 0.0]);
        let far = zone(Vec3::new(0.0, 4.0, 4.0), 2.0, [0.0, QUARTER_PI, 0.0]);
        let near = zone(Vec3::new(0.0, 1.0, 1.0), 2.0, [0.0, QUARTER_PI, 0.0]);
        assert!(!a.intersects(&far, 1e-4));
        assert!(a.intersects(&near, 1e-4));
        assert_eq!(a.intersects(&b, 1e-4), b.intersects(&a, 1e-4));
    }
}
