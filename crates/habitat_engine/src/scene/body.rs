//! Placed objects

use std::sync::Arc;

use slotmap::new_key_type;

use super::geometry::Geometry;
use crate::foundation::math::Transform;
use crate::physics::attachment::Connection;

new_key_type! {
    /// Identity of a body inside a [`crate::physics::PlacementWorld`]
    pub struct BodyKey;
}

/// A placed object: shared geometry, world transform, and its connections.
///
/// The scene owns the transform; whenever it changes the world's spatial index
/// must be updated before the next query (see
/// [`crate::physics::PlacementWorld::set_transform`]).
#[derive(Debug, Clone)]
pub struct RigidBody {
    /// Identity key, assigned when the body is inserted into a world
    pub key: BodyKey,
    /// Model-space geometry, shared with other bodies of the same module type
    pub geometry: Arc<Geometry>,
    /// Current world transform
    pub transform: Transform,
    /// Committed snaps this body takes part in
    pub connections: Vec<Connection>,
}

impl RigidBody {
    /// Create an unregistered body (null key)
    pub fn new(geometry: Arc<Geometry>, transform: Transform) -> Self {
        Self {
            key: BodyKey::default(),
            geometry,
            transform,
            connections: Vec::new(),
        }
    }

    /// Whether this body takes part in a connection with `other`
    pub fn is_connected_to(&self, other: BodyKey) -> bool {
        self.connections.iter().any(|c| c.other_body(self.key) == Some(other))
    }
}
