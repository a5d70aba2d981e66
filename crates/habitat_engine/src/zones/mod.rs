//! Zone constraint system
//!
//! Functional zones are boxes the crew-layout tools place inside a habitat.
//! This module keeps them inside their container (box, cylinder or hull mesh),
//! shrinks them to what the container can hold, and pushes overlapping zones
//! apart.

mod constraint;
mod container;
mod obb;
mod zone;

pub use constraint::{
    adapt_zone_to_container,
    constrain_to_container,
    find_safe_position,
    fit_zone_to_container,
    resolve_zone_collisions,
    zones_overlap,
    ZoneFit,
    ZonePlacement,
};
pub use container::{is_zone_contained, Container, ContainerShape};
pub use obb::OrientedBox;
pub use zone::{get_zone_corners, zone_aabb, Axis, Zone, ZoneRequirements, ZoneSize};
