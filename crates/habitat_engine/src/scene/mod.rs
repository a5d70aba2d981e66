//! Scene-side data consumed by the engine
//!
//! Bodies, their shared model-space geometry, and the bounding boxes derived
//! from them. The owning scene creates and mutates these; the engine only
//! reads them (and writes corrected transforms through the world).

mod aabb;
mod body;
mod geometry;

pub use aabb::AABB;
pub use body::{BodyKey, RigidBody};
pub use geometry::{AttachmentPoint, Geometry};
