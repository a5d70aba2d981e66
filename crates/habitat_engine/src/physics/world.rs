//! Placement world
//!
//! One [`PlacementWorld`] per open scene. It owns the bodies and the broad-phase
//! index, and is the only place where search results are committed back to a
//! body's transform. Every mutation of a transform goes through
//! [`PlacementWorld::set_transform`], which keeps the index in step.

use slotmap::SlotMap;

use crate::core::config::EngineConfig;
use crate::foundation::math::{Transform, Vec3};
use crate::physics::attachment::{Connection, ConnectionError};
use crate::physics::bounds::{compute_aabb, compute_aabb_at, compute_bounding_sphere_at};
use crate::physics::narrow_phase::{check_collision, check_geometry_collision, CollisionInfo};
use crate::physics::placement::{get_safe_position, ring_offsets, square_spiral_offsets};
use crate::scene::{BodyKey, Geometry, RigidBody, AABB};
use crate::spatial::{SpatialGrid, SpatialQuery};

/// Bodies of one scene plus their broad-phase index
pub struct PlacementWorld {
    bodies: SlotMap<BodyKey, RigidBody>,
    spatial_query: Box<dyn SpatialQuery>,
    config: EngineConfig,
}

impl PlacementWorld {
    /// Create an empty world indexed by a [`SpatialGrid`]
    pub fn new(config: EngineConfig) -> Self {
        let grid = SpatialGrid::new(&config.spatial);
        Self::with_spatial_query(config, Box::new(grid))
    }

    /// Create an empty world with a custom broad phase
    pub fn with_spatial_query(config: EngineConfig, spatial_query: Box<dyn SpatialQuery>) -> Self {
        Self {
            bodies: SlotMap::with_key(),
            spatial_query,
            config,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The broad-phase index
    pub fn spatial_query(&self) -> &dyn SpatialQuery {
        self.spatial_query.as_ref()
    }

    /// Add a body, assigning its key and registering it with the index
    pub fn insert_body(&mut self, body: RigidBody) -> BodyKey {
        let key = self.bodies.insert_with_key(|key| RigidBody { key, ..body });
        self.update_index(key);
        log::debug!("Inserted body {:?}", key);
        key
    }

    /// Remove a body, unregister it and drop every connection to it
    pub fn remove_body(&mut self, key: BodyKey) -> Option<RigidBody> {
        let body = self.bodies.remove(key)?;
        self.spatial_query.remove(key);

        for other in body.connections.iter().filter_map(|c| c.other_body(key)) {
            if let Some(other) = self.bodies.get_mut(other) {
                other.connections.retain(|c| !c.involves(key));
            }
        }

        log::debug!("Removed body {:?}", key);
        Some(body)
    }

    /// Look up a body
    pub fn body(&self, key: BodyKey) -> Option<&RigidBody> {
        self.bodies.get(key)
    }

    /// Mutable access to a body.
    ///
    /// Changing the transform this way leaves the index stale; call
    /// [`Self::update_index`] afterwards, or use [`Self::set_transform`].
    pub fn body_mut(&mut self, key: BodyKey) -> Option<&mut RigidBody> {
        self.bodies.get_mut(key)
    }

    /// All bodies, in key order
    pub fn bodies(&self) -> impl Iterator<Item = &RigidBody> {
        self.bodies.values()
    }

    /// Number of bodies
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Replace a body's transform and re-register it; `false` for unknown keys
    pub fn set_transform(&mut self, key: BodyKey, transform: Transform) -> bool {
        let Some(body) = self.bodies.get_mut(key) else {
            return false;
        };
        body.transform = transform;
        self.update_index(key);
        true
    }

    /// Re-register a body's current box with the index.
    ///
    /// Bodies without geometry are kept out of the index.
    pub fn update_index(&mut self, key: BodyKey) {
        match self.bodies.get(key).and_then(compute_aabb) {
            Some(aabb) => self.spatial_query.update(key, &aabb),
            None => self.spatial_query.remove(key),
        }
    }

    /// Broad-phase candidates overlapping `bounds`
    pub fn query_candidates(&self, bounds: &AABB, exclude: Option<BodyKey>) -> Vec<&RigidBody> {
        self.spatial_query
            .query_aabb(bounds, exclude)
            .into_iter()
            .filter_map(|key| self.bodies.get(key))
            .collect()
    }

    /// First overlap the body would have at `transform`
    pub fn collision_at(&self, key: BodyKey, transform: &Transform) -> Option<CollisionInfo> {
        let body = self.bodies.get(key)?;
        let aabb = compute_aabb_at(&body.geometry, transform)?;
        let candidates = self.query_candidates(&aabb, Some(key));
        check_collision(body, transform, &candidates)
    }

    /// Whether the body overlaps anything at its current transform
    pub fn is_overlapping(&self, key: BodyKey) -> bool {
        self.bodies
            .get(key)
            .is_some_and(|body| self.collision_at(key, &body.transform).is_some())
    }

    /// Furthest free point on the way from the body's position to `desired`.
    ///
    /// See [`get_safe_position`]. Obstacles are gathered over the box swept
    /// between the two positions. Nothing is committed.
    pub fn safe_position(&self, key: BodyKey, desired: Vec3) -> Option<Vec3> {
        let body = self.bodies.get(key)?;
        let current = body.transform.position;

        let Some(sweep) = sweep_bounds(&body.geometry, &body.transform, desired) else {
            return Some(desired);
        };
        let obstacles = self.query_candidates(&sweep, Some(key));

        Some(get_safe_position(body, desired, current, &obstacles, &self.config.placement))
    }

    /// Move a body towards `desired`, stopping before the first obstacle.
    ///
    /// Returns the committed position.
    pub fn move_body(&mut self, key: BodyKey, desired: Vec3) -> Option<Vec3> {
        let position = self.safe_position(key, desired)?;
        let transform = self.bodies.get(key)?.transform.with_position(position);
        self.set_transform(key, transform);
        Some(position)
    }

    /// Push an overlapping body out along a horizontal square spiral.
    ///
    /// Returns `true` if the body is free afterwards (including when it was
    /// free to begin with). When no candidate within `max_radius` is free the
    /// body is left where it was and `false` is returned.
    pub fn resolve_initial_overlap(&mut self, key: BodyKey, max_radius: f32, step: f32) -> bool {
        let Some(body) = self.bodies.get(key) else {
            return false;
        };
        if !self.is_overlapping(key) {
            return true;
        }

        let origin = body.transform.clone();
        let found = square_spiral_offsets(step, max_radius).find_map(|(dx, dz)| {
            let candidate = origin.with_position(origin.position + Vec3::new(dx, 0.0, dz));
            self.collision_at(key, &candidate).is_none().then_some(candidate)
        });

        match found {
            Some(transform) => {
                log::debug!(
                    "Resolved overlap of {:?}: {:?} -> {:?}",
                    key,
                    origin.position,
                    transform.position
                );
                self.set_transform(key, transform);
                true
            }
            None => {
                log::debug!("No free spot for {:?} within radius {}", key, max_radius);
                false
            }
        }
    }

    /// A position near `preferred` where `geometry` would not overlap anything.
    ///
    /// Tries `preferred` first, then horizontal rings spaced by the geometry's
    /// bounding radius. Falls back to `preferred` when the search is exhausted.
    pub fn find_free_spawn_position(&self, geometry: &Geometry, preferred: Vec3, max_radius: f32) -> Vec3 {
        let is_free = |position: Vec3| {
            let transform = Transform::from_position(position);
            let Some(aabb) = compute_aabb_at(geometry, &transform) else {
                return true;
            };
            let candidates = self.query_candidates(&aabb, None);
            check_geometry_collision(geometry, &transform, None, &candidates).is_none()
        };

        if is_free(preferred) {
            return preferred;
        }

        let spacing = compute_bounding_sphere_at(geometry, &Transform::identity())
            .map_or(0.0, |sphere| sphere.radius)
            .max(self.config.placement.spawn_min_ring_spacing);

        let found = ring_offsets(spacing, max_radius)
            .map(|(dx, dz)| preferred + Vec3::new(dx, 0.0, dz))
            .find(|position| is_free(*position));

        found.unwrap_or_else(|| {
            log::debug!("No free spawn position within {} of {:?}", max_radius, preferred);
            preferred
        })
    }

    /// Record a snap between two named attachment points on both bodies
    pub fn create_connection(
        &mut self,
        source: BodyKey,
        source_point: &str,
        target: BodyKey,
        target_point: &str,
    ) -> Result<Connection, ConnectionError> {
        if source == target {
            return Err(ConnectionError::SameBody);
        }
        for (key, point) in [(source, source_point), (target, target_point)] {
            let body = self.bodies.get(key).ok_or(ConnectionError::UnknownBody(key))?;
            if body.geometry.attachment_point(point).is_none() {
                return Err(ConnectionError::UnknownPoint {
                    body: key,
                    name: point.to_string(),
                });
            }
        }

        let connection = Connection {
            source_body: source,
            source_point: source_point.to_string(),
            target_body: target,
            target_point: target_point.to_string(),
        };
        for key in [source, target] {
            if let Some(body) = self.bodies.get_mut(key) {
                body.connections.push(connection.clone());
            }
        }

        log::debug!(
            "Connected {:?}.{} -> {:?}.{}",
            source,
            source_point,
            target,
            target_point
        );
        Ok(connection)
    }

    /// Remove a connection from both bodies; `false` if it was not recorded
    pub fn disconnect(&mut self, connection: &Connection) -> bool {
        let mut removed = false;
        for key in [connection.source_body, connection.target_body] {
            if let Some(body) = self.bodies.get_mut(key) {
                let before = body.connections.len();
                body.connections.retain(|c| c != connection);
                removed |= body.connections.len() != before;
            }
        }
        removed
    }

    /// Remove every body
    pub fn clear(&mut self) {
        self.bodies.clear();
        self.spatial_query.clear();
    }
}

impl Default for PlacementWorld {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

/// Box covering the geometry at both ends of a straight move
fn sweep_bounds(geometry: &Geometry, from: &Transform, to: Vec3) -> Option<AABB> {
    let start = compute_aabb_at(geometry, from)?;
    let end = compute_aabb_at(geometry, &from.with_position(to))?;
    Some(AABB::new(start.min.inf(&end.min), start.max.sup(&end.max)))
}
