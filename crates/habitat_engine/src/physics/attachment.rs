//! Attachment points and magnetic snapping
//!
//! Modules declare docking ports in model space ([`AttachmentPoint`]). While a
//! module is dragged, the editor asks for the closest port on other bodies,
//! pulls the dragged module towards it with a distance-scaled force, and on
//! release computes the transform that puts the two ports face to face.
//! Committed snaps are recorded as [`Connection`]s on both bodies.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::config::SnapConfig;
use crate::foundation::math::{constants::PI, utils::any_perpendicular, Quat, Vec3};
use crate::scene::{AttachmentPoint, BodyKey, RigidBody};

/// An attachment point resolved into world space
#[derive(Debug, Clone, PartialEq)]
pub struct WorldAttachmentPoint {
    /// Owning body
    pub body: BodyKey,
    /// Name of the point within the body's geometry
    pub name: String,
    /// World-space position
    pub position: Vec3,
    /// World-space unit normal
    pub normal: Vec3,
    /// Nominal diameter, copied from the model-space point
    pub diameter: Option<f32>,
}

/// Result of [`find_closest_attachment_point`]
#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentMatch {
    /// The matched point
    pub point: WorldAttachmentPoint,
    /// Distance from the query position
    pub distance: f32,
}

/// Body transform that docks a source point onto a target point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapTransform {
    /// Body position
    pub position: Vec3,
    /// Body rotation
    pub rotation: Quat,
}

/// A committed snap between two attachment points on different bodies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    /// Body that was snapped
    pub source_body: BodyKey,
    /// Attachment point name on the source body
    pub source_point: String,
    /// Body it was snapped onto
    pub target_body: BodyKey,
    /// Attachment point name on the target body
    pub target_point: String,
}

impl Connection {
    /// The body on the other end, if `body` takes part in this connection
    pub fn other_body(&self, body: BodyKey) -> Option<BodyKey> {
        if self.source_body == body {
            Some(self.target_body)
        } else if self.target_body == body {
            Some(self.source_body)
        } else {
            None
        }
    }

    /// Whether `body` is either end of this connection
    pub fn involves(&self, body: BodyKey) -> bool {
        self.source_body == body || self.target_body == body
    }
}

/// Reasons a connection cannot be recorded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    /// Source and target are the same body
    #[error("Cannot connect a body to itself")]
    SameBody,

    /// A key does not resolve to a body
    #[error("Body {0:?} is not part of this world")]
    UnknownBody(BodyKey),

    /// The named point is not declared on the body's geometry
    #[error("Body {body:?} has no attachment point named '{name}'")]
    UnknownPoint {
        /// Body that was searched
        body: BodyKey,
        /// Requested point name
        name: String,
    },
}

/// World-space attachment points of a body.
///
/// Positions go through the full transform; normals through rotation and scale
/// only, then renormalized. Points whose normal collapses under a degenerate
/// scale keep a zero normal and are never compatible with anything.
pub fn get_attachment_points(body: &RigidBody) -> Vec<WorldAttachmentPoint> {
    body.geometry
        .attachment_points
        .iter()
        .map(|point| WorldAttachmentPoint {
            body: body.key,
            name: point.name.clone(),
            position: body.transform.transform_point(&point.local_position),
            normal: body
                .transform
                .transform_direction(&point.local_normal)
                .unwrap_or_else(Vec3::zeros),
            diameter: point.diameter,
        })
        .collect()
}

/// Nearest candidate point strictly closer than the snap distance.
///
/// Points on `exclude` (normally the dragged body) are ignored. Compatibility
/// is not checked here; see [`are_points_compatible`].
pub fn find_closest_attachment_point<'a, I>(
    position: &Vec3,
    candidates: I,
    exclude: Option<BodyKey>,
    config: &SnapConfig,
) -> Option<AttachmentMatch>
where
    I: IntoIterator<Item = &'a WorldAttachmentPoint>,
{
    candidates
        .into_iter()
        .filter(|point| Some(point.body) != exclude)
        .map(|point| (point, (point.position - position).magnitude()))
        .filter(|(_, distance)| *distance < config.snap_distance)
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(point, distance)| AttachmentMatch {
            point: point.clone(),
            distance,
        })
}

/// Whether two points can dock: normals facing each other and similar diameters.
///
/// The diameter check is skipped when either side does not declare one.
pub fn are_points_compatible(a: &WorldAttachmentPoint, b: &WorldAttachmentPoint, config: &SnapConfig) -> bool {
    if a.normal.dot(&b.normal) >= config.antiparallel_threshold {
        return false;
    }

    match (a.diameter, b.diameter) {
        (Some(da), Some(db)) => (da - db).abs() <= config.diameter_tolerance,
        _ => true,
    }
}

/// Transform that places `source` (a point on the moving body) onto `target`.
///
/// The rotation turns the source's local normal onto the reversed target
/// normal. After applying it, the source point lands exactly on the target
/// position and the two normals are antiparallel.
pub fn calculate_snap_transform(
    source: &AttachmentPoint,
    source_scale: &Vec3,
    target: &WorldAttachmentPoint,
) -> SnapTransform {
    let from = source.local_normal;
    let to = -target.normal;

    let rotation = Quat::rotation_between(&from, &to).unwrap_or_else(|| {
        if from.dot(&to) < 0.0 {
            // Opposite directions: any half turn about a perpendicular works
            Quat::from_axis_angle(&any_perpendicular(&from), PI)
        } else {
            Quat::identity()
        }
    });

    let offset = rotation * source_scale.component_mul(&source.local_position);
    SnapTransform {
        position: target.position - offset,
        rotation,
    }
}

/// Magnetic pull towards `target`.
///
/// Zero at or beyond the snap distance; otherwise points at the target with
/// magnitude `strength * ((threshold - distance) / threshold)^1.5`.
pub fn calculate_magnetic_force(position: &Vec3, target: &Vec3, distance: f32, config: &SnapConfig) -> Vec3 {
    let threshold = config.snap_distance;
    if distance.is_nan() || distance >= threshold {
        return Vec3::zeros();
    }

    let Some(direction) = (target - position).try_normalize(f32::EPSILON) else {
        return Vec3::zeros();
    };

    let falloff = ((threshold - distance.max(0.0)) / threshold).powf(1.5);
    direction * config.magnetic_strength * falloff
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{utils::quat_from_euler_xyz, Transform};
    use crate::scene::Geometry;
    use approx::assert_relative_eq;
    use slotmap::SlotMap;
    use std::sync::Arc;

    fn point(body: BodyKey, position: Vec3, normal: Vec3) -> WorldAttachmentPoint {
        WorldAttachmentPoint {
            body,
            name: "port".to_string(),
            position,
            normal: normal.normalize(),
            diameter: None,
        }
    }

    fn keys(n: usize) -> Vec<BodyKey> {
        let mut map: SlotMap<BodyKey, ()> = SlotMap::with_key();
        (0..n).map(|_| map.insert(())).collect()
    }

    #[test]
    fn test_world_points_follow_body_transform() {
        let geometry = Geometry::cuboid(2.0, 2.0, 4.0).with_attachment_points(vec![
            AttachmentPoint::new("fore", Vec3::new(0.0, 0.0, 2.0), Vec3::z()),
        ]);
        let rotation = Quat::from_axis_angle(&Vec3::y_axis(), PI / 2.0);
        let mut transform = Transform::from_position_rotation(Vec3::new(10.0, 0.0, 0.0), rotation);
        transform.scale = Vec3::new(1.0, 1.0, 2.0);
        let body = RigidBody::new(Arc::new(geometry), transform);

        let points = get_attachment_points(&body);
        assert_eq!(points.len(), 1);
        // Scaled to z = 4, then +Z turns to +X
        assert_relative_eq!(points[0].position, Vec3::new(14.0, 0.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(points[0].normal, Vec3::x(), epsilon = 1e-5);
        assert_eq!(points[0].name, "fore");
    }

    #[test]
    fn test_closest_point_respects_threshold_and_exclusion() {
        let k = keys(3);
        let config = SnapConfig::default();
        let candidates = vec![
            point(k[0], Vec3::new(1.0, 0.0, 0.0), Vec3::x()),
            point(k[1], Vec3::new(3.0, 0.0, 0.0), Vec3::x()),
            point(k[2], Vec3::new(0.0, 4.5, 0.0), Vec3::y()),
        ];

        let found = find_closest_attachment_point(&Vec3::zeros(), &candidates, None, &config).unwrap();
        assert_eq!(found.point.body, k[0]);
        assert_relative_eq!(found.distance, 1.0);

        let found = find_closest_attachment_point(&Vec3::zeros(), &candidates, Some(k[0]), &config).unwrap();
        assert_eq!(found.point.body, k[1]);

        // Exactly at the snap distance is out of range
        let far = [candidates[2].clone()];
        assert!(find_closest_attachment_point(&Vec3::zeros(), &far, None, &config).is_none());
    }

    #[test]
    fn test_compatibility_needs_facing_normals_and_matching_diameters() {
        let k = keys(2);
        let config = SnapConfig::default();
        let a = point(k[0], Vec3::zeros(), Vec3::x());
        let facing = point(k[1], Vec3::zeros(), -Vec3::x());
        let perpendicular = point(k[1], Vec3::zeros(), Vec3::y());
        let slightly_off = point(k[1], Vec3::zeros(), Vec3::new(-1.0, 0.5, 0.0));

        assert!(are_points_compatible(&a, &facing, &config));
        assert!(!are_points_compatible(&a, &perpendicular, &config));
        // dot = -0.894 < -0.8
        assert!(are_points_compatible(&a, &slightly_off, &config));

        let wide = WorldAttachmentPoint { diameter: Some(3.0), ..a.clone() };
        let narrow = WorldAttachmentPoint { diameter: Some(2.0), ..facing.clone() };
        let close = WorldAttachmentPoint { diameter: Some(2.6), ..facing.clone() };
        assert!(!are_points_compatible(&wide, &narrow, &config));
        assert!(are_points_compatible(&wide, &close, &config));
        assert!(are_points_compatible(&wide, &facing, &config));
    }

    #[test]
    fn test_snap_transform_docks_points_face_to_face() {
        let k = keys(1);
        let source = AttachmentPoint::new("aft", Vec3::new(0.0, 0.0, -2.0), -Vec3::z());
        let target = point(k[0], Vec3::new(5.0, 1.0, 0.0), Vec3::new(1.0, 1.0, 0.0));
        let scale = Vec3::new(1.0, 1.0, 1.5);

        let snap = calculate_snap_transform(&source, &scale, &target);
        let placed = Transform {
            position: snap.position,
            rotation: snap.rotation,
            scale,
        };

        let world_position = placed.transform_point(&source.local_position);
        let world_normal = placed.transform_direction(&source.local_normal).unwrap();
        assert_relative_eq!(world_position, target.position, epsilon = 1e-4);
        assert_relative_eq!(world_normal.dot(&target.normal), -1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_snap_transform_onto_facing_port() {
        let k = keys(1);
        let source = AttachmentPoint::new("fore", Vec3::new(0.0, 0.0, 1.0), Vec3::z());
        let target = point(k[0], Vec3::new(5.0, 0.0, 0.0), -Vec3::x());

        let snap = calculate_snap_transform(&source, &Vec3::repeat(1.0), &target);
        let placed = Transform::from_position_rotation(snap.position, snap.rotation);

        assert_relative_eq!(placed.transform_point(&source.local_position), target.position, epsilon = 1e-4);
        assert_relative_eq!(snap.position, Vec3::new(4.0, 0.0, 0.0), epsilon = 1e-4);
        assert_relative_eq!(snap.rotation * Vec3::z(), Vec3::x(), epsilon = 1e-4);
    }

    #[test]
    fn test_snap_transform_handles_parallel_normals() {
        let k = keys(1);
        // Source normal already equals the target normal: needs a half turn
        let source = AttachmentPoint::new("fore", Vec3::new(1.0, 0.0, 0.0), Vec3::x());
        let target = point(k[0], Vec3::new(0.0, 2.0, 0.0), Vec3::x());

        let snap = calculate_snap_transform(&source, &Vec3::repeat(1.0), &target);
        let rotated_normal = snap.rotation * source.local_normal;
        assert_relative_eq!(rotated_normal, -Vec3::x(), epsilon = 1e-5);
        assert_relative_eq!(snap.position + snap.rotation * source.local_position, target.position, epsilon = 1e-5);
    }

    #[test]
    fn test_snap_transform_with_rotated_target() {
        let k = keys(1);
        let source = AttachmentPoint::new("port", Vec3::new(0.5, -1.0, 0.25), Vec3::new(0.2, -1.0, 0.1));
        let normal = quat_from_euler_xyz([0.3, -1.1, 0.7]) * Vec3::z();
        let target = point(k[0], Vec3::new(-3.0, 7.5, 2.0), normal);

        let snap = calculate_snap_transform(&source, &Vec3::repeat(1.0), &target);
        assert_relative_eq!((snap.rotation * source.local_normal).dot(&target.normal), -1.0, epsilon = 1e-4);
        assert_relative_eq!(snap.position + snap.rotation * source.local_position, target.position, epsilon = 1e-4);
    }

    #[test]
    fn test_magnetic_force_falls_off_with_distance() {
        let config = SnapConfig::default();
        let target = Vec3::new(0.0, 0.0, 10.0);

        let mut previous = f32::INFINITY;
        for distance in [0.0_f32, 0.5, 1.0, 2.0, 3.0, 4.0, 4.4] {
            let position = Vec3::new(0.0, 0.0, 10.0 - distance.max(0.1));
            let force = calculate_magnetic_force(&position, &target, distance, &config);
            let magnitude = force.magnitude();
            assert!(magnitude < previous || distance == 0.0);
            assert!(force.z > 0.0);
            previous = magnitude;
        }

        let position = Vec3::new(0.0, 0.0, 8.0);
        assert_relative_eq!(
            calculate_magnetic_force(&position, &target, 0.0, &config).magnitude(),
            config.magnetic_strength,
            epsilon = 1e-6
        );
        assert_eq!(calculate_magnetic_force(&position, &target, 4.5, &config), Vec3::zeros());
        assert_eq!(calculate_magnetic_force(&position, &target, 9.0, &config), Vec3::zeros());
    }

    #[test]
    fn test_connection_other_body() {
        let k = keys(3);
        let connection = Connection {
            source_body: k[0],
            source_point: "fore".to_string(),
            target_body: k[1],
            target_point: "aft".to_string(),
        };
        assert_eq!(connection.other_body(k[0]), Some(k[1]));
        assert_eq!(connection.other_body(k[1]), Some(k[0]));
        assert_eq!(connection.other_body(k[2]), None);
        assert!(!connection.involves(k[2]));
    }
}
