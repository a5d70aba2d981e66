//! Math utilities and types
//!
//! Provides the fundamental math types used by the bounding-volume, collision,
//! snapping and zone code.

pub use nalgebra::{
    Vector3,
    Matrix4,
    Quaternion,
    Unit,
};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// World transform of a placed object: position, rotation, and scale
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Same rotation and scale, different position
    pub fn with_position(&self, position: Vec3) -> Self {
        Self {
            position,
            rotation: self.rotation,
            scale: self.scale,
        }
    }

    /// Convert to a transformation matrix (TRS order)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Apply this transform to a point
    pub fn transform_point(&self, point: &Vec3) -> Vec3 {
        self.position + self.rotation * self.scale.component_mul(point)
    }

    /// Apply this transform to a vector (no translation)
    pub fn transform_vector(&self, vector: &Vec3) -> Vec3 {
        self.rotation * self.scale.component_mul(vector)
    }

    /// Transform a surface direction and renormalize it.
    ///
    /// Returns `None` when the direction collapses (zero input or zero scale).
    pub fn transform_direction(&self, direction: &Vec3) -> Option<Vec3> {
        self.transform_vector(direction).try_normalize(f32::EPSILON)
    }
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// 2 * Pi
    pub const TAU: f32 = 2.0 * PI;

    /// Pi / 4
    pub const QUARTER_PI: f32 = PI * 0.25;
}

/// Math utility functions
pub mod utils {
    use super::*;

    /// Compose three per-axis angles (radians) into a single rotation.
    ///
    /// Intrinsic `XYZ` order, i.e. `R = Rx * Ry * Rz`, the convention used by
    /// most scene editors for stored per-axis angles.
    pub fn quat_from_euler_xyz(angles: [f32; 3]) -> Quat {
        let qx = Quat::from_axis_angle(&Vec3::x_axis(), angles[0]);
        let qy = Quat::from_axis_angle(&Vec3::y_axis(), angles[1]);
        let qz = Quat::from_axis_angle(&Vec3::z_axis(), angles[2]);
        qx * qy * qz
    }

    /// Any unit vector perpendicular to `v`
    pub fn any_perpendicular(v: &Vec3) -> Unit<Vec3> {
        // Cross with the axis least aligned with v
        let helper = if v.x.abs() < 0.9 { Vec3::x() } else { Vec3::y() };
        Unit::new_normalize(v.cross(&helper))
    }

    /// Vector from a `[x, y, z]` array
    pub fn vec3_from_array(a: [f32; 3]) -> Vec3 {
        Vec3::new(a[0], a[1], a[2])
    }

    /// `[x, y, z]` array from a vector
    pub fn vec3_to_array(v: &Vec3) -> [f32; 3] {
        [v.x, v.y, v.z]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_transform_point_applies_scale_rotation_translation() {
        let transform = Transform {
            position: Vec3::new(1.0, 0.0, 0.0),
            rotation: Quat::from_axis_angle(&Vec3::y_axis(), constants::PI * 0.5),
            scale: Vec3::new(2.0, 2.0, 2.0),
        };

        // (0,0,1) scaled to (0,0,2), rotated +90 deg about Y to (2,0,0), moved by (1,0,0)
        let p = transform.transform_point(&Vec3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(p, Vec3::new(3.0, 0.0, 0.0), epsilon = EPSILON);

        let m = transform.to_matrix();
        let pm = m.transform_point(&Point3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(pm.coords, p, epsilon = EPSILON);
    }

    #[test]
    fn test_transform_direction_is_normalized_and_ignores_translation() {
        let transform = Transform {
            position: Vec3::new(100.0, -4.0, 7.0),
            rotation: Quat::identity(),
            scale: Vec3::new(3.0, 1.0, 1.0),
        };
        let n = transform.transform_direction(&Vec3::x()).unwrap();
        assert_relative_eq!(n, Vec3::x(), epsilon = EPSILON);

        let degenerate = Transform {
            scale: Vec3::zeros(),
            ..Transform::identity()
        };
        assert!(degenerate.transform_direction(&Vec3::x()).is_none());
    }

    #[test]
    fn test_euler_composition_matches_single_axis() {
        let q = utils::quat_from_euler_xyz([0.0, constants::PI * 0.5, 0.0]);
        let rotated = q * Vec3::z();
        assert_relative_eq!(rotated, Vec3::x(), epsilon = EPSILON);
    }

    #[test]
    fn test_any_perpendicular() {
        for v in [Vec3::x(), Vec3::y(), Vec3::new(1.0, 2.0, 3.0).normalize()] {
            let p = utils::any_perpendicular(&v);
            assert!(p.dot(&v).abs() < EPSILON);
            assert_relative_eq!(p.norm(), 1.0, epsilon = EPSILON);
        }
    }
}
