//! Geometric primitives used by the collision code
//!
//! - [`primitives`] - Basic geometric primitives (rays, spheres, triangles)

pub mod primitives;

pub use primitives::{BoundingSphere, Ray, Triangle};
