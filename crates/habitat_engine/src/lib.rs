//! # Habitat Engine
//!
//! Collision and placement-constraint engine for a space-habitat layout
//! editor.
//!
//! ## Features
//!
//! - **Bounding volumes**: world boxes and spheres derived from geometry and transform
//! - **Broad phase**: uniform hash grid behind a swappable [`spatial::SpatialQuery`]
//! - **Placement**: safe-move bisection, overlap spiral and spawn ring searches
//! - **Magnetic snapping**: attachment points, snap transforms and connections
//! - **Zones**: containment, adaptive fitting and separation of functional zones
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use habitat_engine::prelude::*;
//!
//! let mut world = PlacementWorld::new(EngineConfig::default());
//! let module = Arc::new(Geometry::cuboid(2.0, 2.0, 4.0));
//!
//! let spawn = world.find_free_spawn_position(&module, Vec3::zeros(), 50.0);
//! let key = world.insert_body(RigidBody::new(module, Transform::from_position(spawn)));
//!
//! let reached = world.move_body(key, Vec3::new(10.0, 0.0, 0.0));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Shared configuration
pub mod config;
pub mod core;

pub mod foundation;
pub mod physics;
pub mod scene;
pub mod spatial;
pub mod zones;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        core::{Config, ConfigError, EngineConfig, PlacementConfig, SnapConfig, SpatialConfig, ZoneConfig},
        foundation::math::{Quat, Transform, Vec3},
        physics::{
            are_points_compatible, calculate_magnetic_force, calculate_snap_transform, check_collision,
            find_closest_attachment_point, get_attachment_points, CollisionInfo, Connection, ConnectionError,
            PlacementWorld, SnapTransform, WorldAttachmentPoint,
        },
        scene::{AttachmentPoint, BodyKey, Geometry, RigidBody, AABB},
        spatial::{SpatialGrid, SpatialQuery},
        zones::{
            constrain_to_container, find_safe_position, fit_zone_to_container, is_zone_contained,
            resolve_zone_collisions, zones_overlap, Container, Zone, ZoneRequirements, ZoneSize,
        },
    };
}
