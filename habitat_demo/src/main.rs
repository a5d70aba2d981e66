//! Habitat Layout Demo
//!
//! Headless walk through one editing session:
//! - Spawns habitat modules around a docking node without overlaps
//! - Drags a module towards the node, stopping short of contact
//! - Snaps the module's aft port onto the node and records the connection
//! - Fits crew zones inside a module and pushes overlapping zones apart
//!
//! Usage: `habitat_demo [engine.toml | engine.ron]`

use std::collections::HashMap;
use std::f32::consts::PI;
use std::sync::Arc;

use habitat_engine::foundation::logging;
use habitat_engine::foundation::math::utils::quat_from_euler_xyz;
use habitat_engine::prelude::*;
use habitat_engine::zones::ZoneFit;
use log::{info, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};

// Scene layout
const NUM_MODULES: usize = 5;
const MODULE_RADIUS: f32 = 2.0;
const MODULE_LENGTH: f32 = 6.0;
const NODE_SIZE: f32 = 3.0;
const PORT_DIAMETER: f32 = 1.2;
const SCATTER_RADIUS: f32 = 12.0;
const RNG_SEED: u64 = 7;

// Gap left between the dragged port and its target before snapping
const DRAG_STANDOFF: f32 = 1.0;

/// Docking node: a cube with a port on every face
fn node_geometry() -> Geometry {
    let half = NODE_SIZE * 0.5;
    let ports = [
        ("+x", Vec3::x()),
        ("-x", -Vec3::x()),
        ("+y", Vec3::y()),
        ("-y", -Vec3::y()),
        ("+z", Vec3::z()),
        ("-z", -Vec3::z()),
    ]
    .into_iter()
    .map(|(name, normal)| AttachmentPoint::new(name, normal * half, normal).with_diameter(PORT_DIAMETER))
    .collect();

    Geometry::cuboid(NODE_SIZE, NODE_SIZE, NODE_SIZE).with_attachment_points(ports)
}

/// Habitat module: a cylinder along local Y with ports at both ends
fn module_geometry() -> Geometry {
    let half = MODULE_LENGTH * 0.5;
    Geometry::cylinder(MODULE_RADIUS, MODULE_LENGTH, 24).with_attachment_points(vec![
        AttachmentPoint::new("fore", Vec3::new(0.0, half, 0.0), Vec3::y()).with_diameter(PORT_DIAMETER),
        AttachmentPoint::new("aft", Vec3::new(0.0, -half, 0.0), -Vec3::y()).with_diameter(PORT_DIAMETER),
    ])
}

struct LayoutSession {
    world: PlacementWorld,
    rng: StdRng,
    node: BodyKey,
    modules: Vec<BodyKey>,
    module_geometry: Arc<Geometry>,
}

impl LayoutSession {
    fn new(config: EngineConfig) -> Self {
        let mut world = PlacementWorld::new(config);
        let node = world.insert_body(RigidBody::new(Arc::new(node_geometry()), Transform::identity()));

        Self {
            world,
            rng: StdRng::seed_from_u64(RNG_SEED),
            node,
            modules: Vec::new(),
            module_geometry: Arc::new(module_geometry()),
        }
    }

    /// Drop modules at random spots on the deck, each moved to the nearest free place
    fn spawn_modules(&mut self) {
        let max_radius = self.world.config().placement.spawn_max_radius;
        // Lying down: local +Y turns to world -X
        let lying = quat_from_euler_xyz([0.0, 0.0, PI / 2.0]);

        for i in 0..NUM_MODULES {
            let preferred = Vec3::new(
                self.rng.gen_range(-SCATTER_RADIUS..SCATTER_RADIUS),
                0.0,
                self.rng.gen_range(-SCATTER_RADIUS..SCATTER_RADIUS),
            );

            // Spawn search runs on unrotated geometry; lying modules get a second check
            let spawn = self.world.find_free_spawn_position(&self.module_geometry, preferred, max_radius);
            let key = self.world.insert_body(RigidBody::new(
                Arc::clone(&self.module_geometry),
                Transform::from_position_rotation(spawn, lying),
            ));

            let placement = self.world.config().placement.clone();
            if !self.world.resolve_initial_overlap(key, placement.spiral_max_radius, placement.spiral_step) {
                warn!("Module {} still overlaps at {:?}", i, spawn);
            }

            if let Some(body) = self.world.body(key) {
                info!("Module {} placed at {:?} (asked for {:?})", i, body.transform.position, preferred);
            }
            self.modules.push(key);
        }
    }

    /// Drag the first module towards a node port, then snap and connect it
    fn drag_and_snap(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let Some(&module) = self.modules.first() else {
            return Ok(());
        };
        let snap_config = self.world.config().snap.clone();

        let node = self.world.body(self.node).ok_or("node missing")?;
        let target_port = get_attachment_points(node)
            .into_iter()
            .find(|p| p.name == "+x")
            .ok_or("node has no +x port")?;

        // Aim so the aft port ends up just in front of the target port
        let body = self.world.body(module).ok_or("module missing")?;
        let aft_local = body
            .geometry
            .attachment_point("aft")
            .ok_or("module has no aft port")?
            .clone();
        let aft_offset = body.transform.transform_vector(&aft_local.local_position);
        let desired = target_port.position + target_port.normal * DRAG_STANDOFF - aft_offset;

        let reached = self.world.move_body(module, desired).ok_or("module missing")?;
        info!("Dragged module towards {:?}, stopped at {:?}", desired, reached);

        // Look for a port near the dragged aft port
        let body = self.world.body(module).ok_or("module missing")?;
        let aft = get_attachment_points(body)
            .into_iter()
            .find(|p| p.name == "aft")
            .ok_or("module has no aft port")?;
        let candidates: Vec<WorldAttachmentPoint> = self
            .world
            .bodies()
            .filter(|b| b.key != module)
            .flat_map(get_attachment_points)
            .collect();

        let Some(found) = find_closest_attachment_point(&aft.position, &candidates, Some(module), &snap_config) else {
            info!("No port within {} of the aft port, nothing to snap", snap_config.snap_distance);
            return Ok(());
        };

        let pull = calculate_magnetic_force(&aft.position, &found.point.position, found.distance, &snap_config);
        info!(
            "Closest port {:?}.{} at distance {:.2}, magnetic pull {:?}",
            found.point.body, found.point.name, found.distance, pull
        );

        let snap = calculate_snap_transform(&aft_local, &body.transform.scale, &found.point);
        let snapped = Transform {
            position: snap.position,
            rotation: snap.rotation,
            scale: body.transform.scale,
        };
        self.world.set_transform(module, snapped);

        if self.world.is_overlapping(module) {
            warn!("Snapped module overlaps a neighbour");
        }

        let body = self.world.body(module).ok_or("module missing")?;
        let docked = get_attachment_points(body)
            .into_iter()
            .find(|p| p.name == "aft")
            .ok_or("module has no aft port")?;
        if !are_points_compatible(&docked, &found.point, &snap_config) {
            warn!("Ports {} and {} are not compatible, leaving them unconnected", docked.name, found.point.name);
            return Ok(());
        }

        let connection = self
            .world
            .create_connection(module, &docked.name, found.point.body, &found.point.name)?;
        info!("Connected {:?}", connection);
        Ok(())
    }

    /// Place a few crew zones inside the first module and keep them apart
    fn layout_zones(&mut self) -> Vec<Zone> {
        let Some(body) = self.modules.first().and_then(|key| self.world.body(*key)) else {
            return Vec::new();
        };
        let zone_config = self.world.config().zones.clone();

        let axis = body.transform.rotation * Vec3::y();
        let container = Container::cylinder(body.transform.position, axis, MODULE_RADIUS, MODULE_LENGTH);

        let catalog: HashMap<&str, ZoneRequirements> = HashMap::from([
            ("crew_quarters", ZoneRequirements { min_volume: 2.0 }),
            ("galley", ZoneRequirements { min_volume: 1.5 }),
            ("storage", ZoneRequirements { min_volume: 0.5 }),
        ]);

        let center = body.transform.position;
        let zones: Vec<Zone> = ["crew_quarters", "galley", "storage"]
            .into_iter()
            .enumerate()
            .map(|(i, zone_type)| {
                let offset = Vec3::new(self.rng.gen_range(-1.0..1.0), 0.0, self.rng.gen_range(-1.0..1.0));
                let size = ZoneSize::new(
                    self.rng.gen_range(1.0..3.0),
                    self.rng.gen_range(1.0..3.0),
                    self.rng.gen_range(1.0..3.0),
                );
                Zone::new(format!("zone-{i}"), zone_type, center + offset, size)
            })
            .map(|zone| {
                let requirements = catalog.get(zone.zone_type.as_str()).copied().unwrap_or_default();
                let ZoneFit {
                    zone,
                    contained,
                    meets_min_volume,
                } = fit_zone_to_container(&zone, &container, &requirements, &zone_config);
                info!(
                    "Fitted {} ({}): size {:?}, contained {}, minimum volume met {}",
                    zone.id, zone.zone_type, zone.size, contained, meets_min_volume
                );
                zone
            })
            .collect();

        let mut zones = resolve_zone_collisions(&zones, zone_config.max_collision_iterations, &zone_config);

        for i in 0..zones.len() {
            let still_bad = !is_zone_contained(&zones[i], &container)
                || zones
                    .iter()
                    .enumerate()
                    .any(|(j, other)| i != j && zones_overlap(&zones[i], other, &zone_config));
            if !still_bad {
                continue;
            }

            let placement = find_safe_position(
                &zones[i],
                &zones,
                Some(&container),
                zone_config.safe_position_attempts,
                zone_config.safe_position_step,
                &zone_config,
            );
            if placement.found {
                zones[i].set_center(placement.position);
                info!("Moved {} to {:?}", zones[i].id, placement.position);
            } else {
                warn!("No valid spot for {}", zones[i].id);
            }
        }

        zones
    }

    fn report(&self, zones: &[Zone]) {
        let connections: usize = self.world.bodies().map(|b| b.connections.len()).sum::<usize>() / 2;
        info!(
            "Session done: {} bodies, {} connections, {} zones",
            self.world.body_count(),
            connections,
            zones.len()
        );

        let index = self.world.spatial_query();
        if let Some(grid) = index.as_any().downcast_ref::<SpatialGrid>() {
            info!(
                "Grid: {} bodies in {} cells of size {}",
                index.entity_count(),
                grid.occupied_cell_count(),
                grid.cell_size()
            );
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading engine configuration from {}", path);
            EngineConfig::load_from_file(&path)?
        }
        None => EngineConfig::default(),
    };
    config.validate()?;

    let mut session = LayoutSession::new(config);
    session.spawn_modules();
    session.drag_and_snap()?;
    let zones = session.layout_zones();
    session.report(&zones);

    Ok(())
}
