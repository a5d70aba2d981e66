//! Functional zones
//!
//! A zone is a free-floating box inside a habitat (crew quarters, galley,
//! storage). It is stored the way the editor persists it: plain arrays for
//! position and per-axis angles, and a named size.

use serde::{Deserialize, Serialize};

use crate::foundation::math::{
    utils::{quat_from_euler_xyz, vec3_from_array, vec3_to_array},
    Quat, Vec3,
};
use crate::scene::AABB;

/// Zone dimensions along its local X (width), Y (height) and Z (depth)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneSize {
    /// Extent along local X
    pub width: f32,
    /// Extent along local Y
    pub height: f32,
    /// Extent along local Z
    pub depth: f32,
}

impl ZoneSize {
    /// Create a size
    pub fn new(width: f32, height: f32, depth: f32) -> Self {
        Self { width, height, depth }
    }

    /// Size as a vector (width, height, depth)
    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.width, self.height, self.depth)
    }

    /// Size from a vector (width, height, depth)
    pub fn from_vec3(v: Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }

    /// Enclosed volume
    pub fn volume(self) -> f32 {
        self.width * self.height * self.depth
    }
}

/// A coordinate axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// X axis
    X,
    /// Y axis
    Y,
    /// Z axis
    Z,
}

impl Axis {
    /// All three axes in order
    pub const ALL: [Self; 3] = [Self::X, Self::Y, Self::Z];

    /// Component index (0, 1, 2)
    pub fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    /// Unit vector along this axis
    pub fn unit(self) -> Vec3 {
        let mut v = Vec3::zeros();
        v[self.index()] = 1.0;
        v
    }

    /// Axis of the largest-magnitude component of `v` (ties go to the earlier axis)
    pub fn dominant(v: &Vec3) -> Self {
        Self::ALL
            .into_iter()
            .reduce(|best, axis| if v[axis.index()].abs() > v[best.index()].abs() { axis } else { best })
            .unwrap_or(Self::X)
    }

    /// Axis of the smallest component of `v` (ties go to the earlier axis)
    pub fn smallest(v: &Vec3) -> Self {
        Self::ALL
            .into_iter()
            .reduce(|best, axis| if v[axis.index()] < v[best.index()] { axis } else { best })
            .unwrap_or(Self::X)
    }
}

/// A functional zone as stored in a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    /// Unique identifier
    pub id: String,
    /// Zone category, used to look up [`ZoneRequirements`]
    #[serde(rename = "type")]
    pub zone_type: String,
    /// Center in world space
    pub position: [f32; 3],
    /// Per-axis angles in radians, composed in XYZ order
    pub rotation: [f32; 3],
    /// Box dimensions
    pub size: ZoneSize,
    /// Locked zones are never moved by collision resolution
    #[serde(default)]
    pub locked: bool,
    /// Editor visibility; has no effect on constraints
    #[serde(default = "default_visible")]
    pub visible: bool,
}

fn default_visible() -> bool {
    true
}

impl Zone {
    /// Unrotated, unlocked, visible zone
    pub fn new(id: impl Into<String>, zone_type: impl Into<String>, position: Vec3, size: ZoneSize) -> Self {
        Self {
            id: id.into(),
            zone_type: zone_type.into(),
            position: vec3_to_array(&position),
            rotation: [0.0; 3],
            size,
            locked: false,
            visible: true,
        }
    }

    /// Set the per-axis angles
    pub fn with_rotation(mut self, rotation: [f32; 3]) -> Self {
        self.rotation = rotation;
        self
    }

    /// Mark the zone locked
    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    /// Center as a vector
    pub fn center(&self) -> Vec3 {
        vec3_from_array(self.position)
    }

    /// Move the center
    pub fn set_center(&mut self, center: Vec3) {
        self.position = vec3_to_array(&center);
    }

    /// Same zone at a different center
    pub fn with_center(&self, center: Vec3) -> Self {
        let mut zone = self.clone();
        zone.set_center(center);
        zone
    }

    /// The three stored angles composed into one orientation
    pub fn orientation(&self) -> Quat {
        quat_from_euler_xyz(self.rotation)
    }

    /// Half of the size along each local axis
    pub fn half_extents(&self) -> Vec3 {
        self.size.to_vec3() * 0.5
    }
}

/// Per-type placement requirements supplied by the host's zone catalog
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneRequirements {
    /// Volume a zone of this type must keep after shrinking
    pub min_volume: f32,
}

/// World-space corners, ordered by (x, y, z) sign bits like [`AABB::corners`]
pub fn get_zone_corners(zone: &Zone) -> [Vec3; 8] {
    let center = zone.center();
    let rotation = zone.orientation();
    let half = zone.half_extents();

    std::array::from_fn(|i| {
        let sign = |bit: usize| if i & bit == 0 { -1.0 } else { 1.0 };
        let local = Vec3::new(sign(1) * half.x, sign(2) * half.y, sign(4) * half.z);
        center + rotation * local
    })
}

/// World-space box enclosing the rotated zone
pub fn zone_aabb(zone: &Zone) -> AABB {
    let corners = get_zone_corners(zone);
    let (min, max) = corners[1..]
        .iter()
        .fold((corners[0], corners[0]), |(min, max), c| (min.inf(c), max.sup(c)));
    AABB::new(min, max)
}
