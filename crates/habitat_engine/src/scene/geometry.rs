//! Static module geometry
//!
//! Geometry is stored in MODEL SPACE and shared between every body that uses
//! it. World-space data (bounds, attachment points) is derived per query from a
//! body's transform and is never written back here.

use serde::{Deserialize, Serialize};

use super::aabb::AABB;
use crate::foundation::math::Vec3;
use crate::physics::collision::Triangle;

/// A declared docking location on a module, in model space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachmentPoint {
    /// Name unique within the owning geometry (e.g. "fore", "aft")
    pub name: String,
    /// Position relative to the geometry origin
    pub local_position: Vec3,
    /// Outward-facing unit normal
    pub local_normal: Vec3,
    /// Nominal port diameter used for compatibility matching
    pub diameter: Option<f32>,
}

impl AttachmentPoint {
    /// Create a point; the normal is normalized (zero normals stay zero)
    pub fn new(name: impl Into<String>, local_position: Vec3, local_normal: Vec3) -> Self {
        Self {
            name: name.into(),
            local_position,
            local_normal: local_normal.try_normalize(f32::EPSILON).unwrap_or_else(Vec3::zeros),
            diameter: None,
        }
    }

    /// Set the nominal diameter
    pub fn with_diameter(mut self, diameter: f32) -> Self {
        self.diameter = Some(diameter);
        self
    }
}

/// Vertex/triangle buffer plus precomputed local bounds and attachment metadata
#[derive(Debug, Clone, Default)]
pub struct Geometry {
    /// Vertices in model space
    pub vertices: Vec<Vec3>,
    /// Triangle list indices (three per triangle)
    pub indices: Vec<u32>,
    /// Model-space bounds, `None` when there are no vertices
    local_bounds: Option<AABB>,
    /// Declared attachment points
    pub attachment_points: Vec<AttachmentPoint>,
}

impl Geometry {
    /// Build geometry from model-space vertices and indices
    pub fn from_vertices(vertices: Vec<Vec3>, indices: Vec<u32>) -> Self {
        let local_bounds = AABB::from_points(&vertices);
        Self {
            vertices,
            indices,
            local_bounds,
            attachment_points: Vec::new(),
        }
    }

    /// Geometry with no vertices; every bounds query on it yields `None`
    pub fn empty() -> Self {
        Self::default()
    }

    /// Axis-aligned box centered on the origin
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        let corners = AABB::from_center_size(Vec3::zeros(), Vec3::new(width, height, depth)).corners();
        // Corner index bits: x = 1, y = 2, z = 4
        let indices = vec![
            0, 2, 1, 1, 2, 3, // -z
            4, 5, 6, 5, 7, 6, // +z
            0, 1, 4, 1, 5, 4, // -y
            2, 6, 3, 3, 6, 7, // +y
            0, 4, 2, 2, 4, 6, // -x
            1, 3, 5, 3, 7, 5, // +x
        ];
        Self::from_vertices(corners.to_vec(), indices)
    }

    /// Closed cylinder along the local Y axis, centered on the origin
    pub fn cylinder(radius: f32, length: f32, segments: u32) -> Self {
        let segments = segments.max(3);
        let half = length * 0.5;
        let mut vertices = Vec::with_capacity(segments as usize * 2 + 2);
        for i in 0..segments {
            let angle = i as f32 / segments as f32 * std::f32::consts::TAU;
            let (s, c) = angle.sin_cos();
            vertices.push(Vec3::new(radius * c, -half, radius * s));
            vertices.push(Vec3::new(radius * c, half, radius * s));
        }
        let bottom_center = vertices.len() as u32;
        vertices.push(Vec3::new(0.0, -half, 0.0));
        vertices.push(Vec3::new(0.0, half, 0.0));
        let top_center = bottom_center + 1;

        let mut indices = Vec::with_capacity(segments as usize * 12);
        for i in 0..segments {
            let b0 = i * 2;
            let t0 = b0 + 1;
            let b1 = ((i + 1) % segments) * 2;
            let t1 = b1 + 1;
            indices.extend_from_slice(&[b0, t0, b1, b1, t0, t1]);
            indices.extend_from_slice(&[bottom_center, b0, b1]);
            indices.extend_from_slice(&[top_center, t1, t0]);
        }
        Self::from_vertices(vertices, indices)
    }

    /// Attach declared attachment points
    pub fn with_attachment_points(mut self, points: Vec<AttachmentPoint>) -> Self {
        self.attachment_points = points;
        self
    }

    /// Model-space bounds
    pub fn local_bounds(&self) -> Option<AABB> {
        self.local_bounds
    }

    /// Look up an attachment point by name
    pub fn attachment_point(&self, name: &str) -> Option<&AttachmentPoint> {
        self.attachment_points.iter().find(|p| p.name == name)
    }

    /// Model-space triangles; trailing indices that do not form a triangle are ignored
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.indices.chunks_exact(3).filter_map(|chunk| {
            let v0 = *self.vertices.get(chunk[0] as usize)?;
            let v1 = *self.vertices.get(chunk[1] as usize)?;
            let v2 = *self.vertices.get(chunk[2] as usize)?;
            Some(Triangle::new(v0, v1, v2))
        })
    }
}
