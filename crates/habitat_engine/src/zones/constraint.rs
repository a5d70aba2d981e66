//! Keeping zones inside their container and apart from each other

use crate::core::config::ZoneConfig;
use crate::foundation::math::{Vec3, constants::TAU};

use super::container::{is_zone_contained, Container, ContainerShape};
use super::obb::OrientedBox;
use super::zone::{zone_aabb, Axis, Zone, ZoneRequirements, ZoneSize};

// Relative slack when comparing a rescaled volume against its minimum
const VOLUME_TOLERANCE: f32 = 1.0e-4;

/// Result of [`fit_zone_to_container`]
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneFit {
    /// The adapted and constrained zone
    pub zone: Zone,
    /// Whether the zone ended up fully inside the container
    pub contained: bool,
    /// Whether the zone kept at least its type's minimum volume
    pub meets_min_volume: bool,
}

/// Result of [`find_safe_position`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZonePlacement {
    /// Chosen center, or the original one when nothing was found
    pub position: Vec3,
    /// Whether `position` satisfies every constraint
    pub found: bool,
}

/// Whether two zones interpenetrate (exact oriented-box test).
///
/// Zones that only touch, up to `contact_tolerance`, do not overlap.
pub fn zones_overlap(a: &Zone, b: &Zone, config: &ZoneConfig) -> bool {
    // Cheap reject on the enclosing boxes first
    if !zone_aabb(a).intersects(&zone_aabb(b)) {
        return false;
    }
    OrientedBox::from_zone(a).intersects(&OrientedBox::from_zone(b), config.contact_tolerance)
}

/// Move the zone by the smallest per-axis offset that puts its box inside the
/// container's box. Axes where the zone is larger than the container are
/// centered instead. The size is never changed.
pub fn constrain_to_container(zone: &Zone, container: &Container) -> Zone {
    let aabb = zone_aabb(zone);
    let bounds = &container.bounds;

    let offset = Vec3::from_fn(|i, _| {
        if aabb.max[i] - aabb.min[i] > bounds.max[i] - bounds.min[i] {
            bounds.center()[i] - aabb.center()[i]
        } else if aabb.min[i] < bounds.min[i] {
            bounds.min[i] - aabb.min[i]
        } else if aabb.max[i] > bounds.max[i] {
            bounds.max[i] - aabb.max[i]
        } else {
            0.0
        }
    });

    zone.with_center(zone.center() + offset)
}

/// Shrink the zone to what the container can hold around its position, then
/// grow it back uniformly if it fell below the type's minimum volume.
///
/// For cylinders, the zone axis closest to the cylinder axis is limited to
/// `cylinder_length_fraction` of the length and the two cross-section axes to
/// the square that fits in the remaining radial clearance. Other containers
/// limit each size to `size_fraction` of the container extent.
pub fn adapt_zone_to_container(
    zone: &Zone,
    container: &Container,
    requirements: &ZoneRequirements,
    config: &ZoneConfig,
) -> Zone {
    let current = zone.size.to_vec3();

    let limits = match &container.shape {
        ContainerShape::Cylinder {
            center,
            axis,
            radius,
            length,
        } => {
            let offset = zone.center() - center;
            let along = offset.dot(axis.as_ref());
            let radial_distance = (offset - axis.into_inner() * along).magnitude();
            let clearance = (radius - radial_distance).max(0.0);
            let cross_section = std::f32::consts::SQRT_2 * clearance;

            let local_axis = zone.orientation().inverse() * axis.into_inner();
            let axial = Axis::dominant(&local_axis);
            let mut limits = Vec3::repeat(cross_section);
            limits[axial.index()] = length * config.cylinder_length_fraction;
            limits
        }
        ContainerShape::Box | ContainerShape::Mesh { .. } => container.bounds.size() * config.size_fraction,
    };

    let mut size = current.inf(&limits);

    let volume = size.x * size.y * size.z;
    if volume < requirements.min_volume {
        if volume > 0.0 {
            size *= (requirements.min_volume / volume).cbrt();
        } else {
            log::debug!("Zone {} has no room to grow back to its minimum volume", zone.id);
        }
    }

    let mut adapted = zone.clone();
    adapted.size = ZoneSize::from_vec3(size);
    adapted
}

/// Adapt, then constrain, repeated up to `fit_passes` times until the zone is
/// contained.
///
/// The zone is first moved inside the container's box so clearance is measured
/// where it will end up, and every pass adapts from the original size.
/// Restoring the minimum volume can undo containment, and a zone with no room
/// can stay below its minimum volume, so both outcomes are reported rather
/// than assumed.
pub fn fit_zone_to_container(
    zone: &Zone,
    container: &Container,
    requirements: &ZoneRequirements,
    config: &ZoneConfig,
) -> ZoneFit {
    let passes = config.fit_passes.max(1);
    let mut center = constrain_to_container(zone, container).center();
    let mut pass = 1;

    let (current, contained) = loop {
        let adapted = adapt_zone_to_container(&zone.with_center(center), container, requirements, config);
        let fitted = constrain_to_container(&adapted, container);
        let contained = is_zone_contained(&fitted, container);
        if contained || pass >= passes {
            break (fitted, contained);
        }
        center = fitted.center();
        pass += 1;
    };

    let meets_min_volume = current.size.volume() >= requirements.min_volume * (1.0 - VOLUME_TOLERANCE);

    if !contained {
        log::warn!(
            "Zone {} ({}) does not fit its container after {} passes",
            current.id,
            current.zone_type,
            passes
        );
    }
    if !meets_min_volume {
        log::warn!(
            "Zone {} ({}) volume {} is below its minimum {}",
            current.id,
            current.zone_type,
            current.size.volume(),
            requirements.min_volume
        );
    }

    ZoneFit {
        zone: current,
        contained,
        meets_min_volume,
    }
}

/// Push overlapping zones apart along their axis of least penetration.
///
/// Each pass handles every overlapping pair once. Both zones move half the
/// penetration (plus the contact tolerance) in opposite directions; a locked
/// zone stays put and its partner takes the whole push; two locked zones are
/// left as they are. Stops after a pass with nothing to fix or after
/// `max_iterations` passes. Three or more zones overlapping each other may
/// still overlap when the passes run out.
pub fn resolve_zone_collisions(zones: &[Zone], max_iterations: u32, config: &ZoneConfig) -> Vec<Zone> {
    let mut zones = zones.to_vec();

    for iteration in 0..max_iterations {
        let mut pushed = false;

        for i in 0..zones.len() {
            for j in (i + 1)..zones.len() {
                if zones[i].locked && zones[j].locked {
                    continue;
                }
                if !zones_overlap(&zones[i], &zones[j], config) {
                    continue;
                }

                let a = zone_aabb(&zones[i]);
                let b = zone_aabb(&zones[j]);
                let depths = a.overlap_depths(&b);
                let axis = Axis::smallest(&depths);
                let k = axis.index();

                let sign = if b.center()[k] >= a.center()[k] { 1.0 } else { -1.0 };
                let push = axis.unit() * (sign * (depths[k] + config.contact_tolerance));

                match (zones[i].locked, zones[j].locked) {
                    (true, _) => {
                        let center = zones[j].center() + push;
                        zones[j].set_center(center);
                    }
                    (_, true) => {
                        let center = zones[i].center() - push;
                        zones[i].set_center(center);
                    }
                    _ => {
                        let (ca, cb) = (zones[i].center(), zones[j].center());
                        zones[i].set_center(ca - push * 0.5);
                        zones[j].set_center(cb + push * 0.5);
                    }
                }

                log::trace!("Separated zones {} and {} along {:?}", zones[i].id, zones[j].id, axis);
                pushed = true;
            }
        }

        if !pushed {
            log::debug!("Zone collisions resolved after {} passes", iteration);
            return zones;
        }
    }

    log::debug!("Zone collision passes exhausted ({})", max_iterations);
    zones
}

/// Compass directions on the horizontal plane, starting at +X
fn compass_directions() -> [Vec3; 8] {
    std::array::from_fn(|i| {
        let angle = TAU * i as f32 / 8.0;
        Vec3::new(angle.cos(), 0.0, angle.sin())
    })
}

/// A center for `zone` where it is contained and overlaps none of `others`.
///
/// Tries the current center, then the 8 compass directions at radius
/// `step`, `2 * step`, ... up to `max_attempts` rings. Zones in `others` with
/// the same id as `zone` are ignored.
pub fn find_safe_position(
    zone: &Zone,
    others: &[Zone],
    container: Option<&Container>,
    max_attempts: u32,
    step: f32,
    config: &ZoneConfig,
) -> ZonePlacement {
    let is_valid = |center: Vec3| {
        let candidate = zone.with_center(center);
        container.map_or(true, |c| is_zone_contained(&candidate, c))
            && others
                .iter()
                .filter(|other| other.id != zone.id)
                .all(|other| !zones_overlap(&candidate, other, config))
    };

    let start = zone.center();
    if is_valid(start) {
        return ZonePlacement {
            position: start,
            found: true,
        };
    }

    let directions = compass_directions();
    for attempt in 1..=max_attempts {
        let radius = step * attempt as f32;
        if let Some(position) = directions
            .iter()
            .map(|direction| start + direction * radius)
            .find(|position| is_valid(*position))
        {
            return ZonePlacement { position, found: true };
        }
    }

    log::debug!("No safe position for zone {} within {} rings", zone.id, max_attempts);
    ZonePlacement {
        position: start,
        found: false,
    }
}
