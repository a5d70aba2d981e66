//! Placement resolver
//!
//! Pure search routines used when the editor moves, spawns or loads bodies.
//! They only evaluate hypothetical transforms against a list of obstacles;
//! committing the result is left to [`crate::physics::PlacementWorld`].

use crate::core::config::PlacementConfig;
use crate::foundation::math::{constants::TAU, Vec3};
use crate::physics::narrow_phase::check_collision;
use crate::scene::RigidBody;

/// Furthest collision-free point on the straight path from `current` to `desired`.
///
/// Returns `desired` unchanged when it is free and `current` when the move is
/// shorter than `min_move_distance`. Otherwise the first contact along the path
/// is bisected and the result backed off by `safety_margin` in the direction of
/// travel. The backed-off point is checked again; if it collides, the last
/// verified free point is used, and if none was found `current` is returned.
pub fn get_safe_position(
    body: &RigidBody,
    desired: Vec3,
    current: Vec3,
    obstacles: &[&RigidBody],
    config: &PlacementConfig,
) -> Vec3 {
    let is_free = |position: Vec3| {
        check_collision(body, &body.transform.with_position(position), obstacles).is_none()
    };

    if is_free(desired) {
        return desired;
    }

    let travel = desired - current;
    let distance = travel.magnitude();
    if distance < config.min_move_distance {
        return current;
    }

    // Invariant: `lo` is free (or 0), `hi` collides
    let mut lo = 0.0_f32;
    let mut hi = 1.0_f32;
    let mut found_free = false;
    for _ in 0..config.binary_search_iterations {
        let mid = (lo + hi) * 0.5;
        if is_free(current + travel * mid) {
            lo = mid;
            found_free = true;
        } else {
            hi = mid;
        }
    }

    let direction = travel / distance;
    let backed_off = (lo * distance - config.safety_margin).max(0.0);
    let candidate = current + direction * backed_off;
    if is_free(candidate) {
        return candidate;
    }

    if found_free {
        let last_safe = current + travel * lo;
        log::debug!("Safety margin collides, using last verified point {last_safe:?}");
        return last_safe;
    }

    log::debug!("No free point between {current:?} and {desired:?}, staying put");
    current
}

/// Horizontal offsets of a square spiral around the origin, one layer at a time.
///
/// Layer `n` is the ring of grid points at Chebyshev distance `n * step`; within
/// a layer points come nearest-first, ties in row-major order. The origin itself
/// is not included. Offsets are produced lazily, so a search that stops early
/// never visits the outer layers.
pub fn square_spiral_offsets(step: f32, max_radius: f32) -> impl Iterator<Item = (f32, f32)> {
    let layers = if step > 0.0 && max_radius.is_finite() {
        (max_radius / step).floor() as i32
    } else {
        0
    };

    (1..=layers)
        .flat_map(|layer| (0..=layer).flat_map(move |t| square_layer_group(layer, t)))
        .map(move |(i, j)| (i as f32 * step, j as f32 * step))
}

/// Points of a square layer `t` cells away from an edge midpoint, row-major
fn square_layer_group(layer: i32, t: i32) -> Vec<(i32, i32)> {
    let mut group = vec![
        (layer, t),
        (layer, -t),
        (-layer, t),
        (-layer, -t),
        (t, layer),
        (-t, layer),
        (t, -layer),
        (-t, -layer),
    ];
    group.sort_unstable();
    group.dedup();
    group
}

/// Horizontal offsets on concentric rings `spacing` apart, out to `max_radius`.
///
/// Each ring holds at least 8 samples and otherwise roughly one per `spacing`
/// of circumference. The origin is not included. Offsets are produced lazily.
pub fn ring_offsets(spacing: f32, max_radius: f32) -> impl Iterator<Item = (f32, f32)> {
    let valid = spacing > 0.0 && max_radius.is_finite();

    (1_u32..)
        .map(move |ring| ring as f32 * spacing)
        .take_while(move |radius| valid && *radius <= max_radius)
        .flat_map(move |radius| {
            let samples = ((TAU * radius / spacing).ceil() as usize).max(8);
            (0..samples).map(move |s| {
                let angle = TAU * s as f32 / samples as f32;
                (radius * angle.cos(), radius * angle.sin())
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Transform;
    use crate::scene::{BodyKey, Geometry};
    use approx::assert_relative_eq;
    use slotmap::SlotMap;
    use std::sync::Arc;

    fn cube_at(keys: &mut SlotMap<BodyKey, ()>, center: Vec3, size: f32) -> RigidBody {
        let mut body = RigidBody::new(
            Arc::new(Geometry::cuboid(size, size, size)),
            Transform::from_position(center),
        );
        body.key = keys.insert(());
        body
    }

    #[test]
    fn test_free_destination_is_returned_unchanged() {
        let mut keys = SlotMap::with_key();
        let moving = cube_at(&mut keys, Vec3::zeros(), 2.0);
        let wall = cube_at(&mut keys, Vec3::new(0.0, 0.0, 20.0), 2.0);
        let desired = Vec3::new(5.0, 1.0, -3.0);

        let result = get_safe_position(&moving, desired, Vec3::zeros(), &[&wall], &PlacementConfig::default());
        assert_eq!(result, desired);
    }

    #[test]
    fn test_tiny_move_into_collision_stays_put() {
        let mut keys = SlotMap::with_key();
        let moving = cube_at(&mut keys, Vec3::zeros(), 2.0);
        let wall = cube_at(&mut keys, Vec3::new(2.0, 0.0, 0.0), 2.0);
        let current = Vec3::new(-0.0005, 0.0, 0.0);

        let result = get_safe_position(
            &moving,
            Vec3::new(0.0001, 0.0, 0.0),
            current,
            &[&wall],
            &PlacementConfig::default(),
        );
        assert_eq!(result, current);
    }

    #[test]
    fn test_move_stops_short_of_obstacle() {
        let mut keys = SlotMap::with_key();
        let moving = cube_at(&mut keys, Vec3::zeros(), 2.0);
        let wall = cube_at(&mut keys, Vec3::new(10.0, 0.0, 0.0), 2.0);
        let config = PlacementConfig::default();

        let result = get_safe_position(&moving, Vec3::new(10.0, 0.0, 0.0), Vec3::zeros(), &[&wall], &config);

        // Contact begins at x = 8; bisection resolution is 10 / 2^10
        assert!(result.x < 8.0);
        assert!(result.x > 8.0 - config.safety_margin - 0.02);
        assert_relative_eq!(result.y, 0.0);
        assert_relative_eq!(result.z, 0.0);
        let placed = moving.transform.with_position(result);
        assert!(check_collision(&moving, &placed, &[&wall]).is_none());
    }

    #[test]
    fn test_result_never_collides_for_varied_moves() {
        let mut keys = SlotMap::with_key();
        let moving = cube_at(&mut keys, Vec3::zeros(), 1.0);
        let obstacles: Vec<RigidBody> = [
            Vec3::new(4.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 4.0),
            Vec3::new(-3.0, 0.5, -3.0),
        ]
        .into_iter()
        .map(|c| cube_at(&mut keys, c, 1.5))
        .collect();
        let refs: Vec<&RigidBody> = obstacles.iter().collect();
        let config = PlacementConfig::default();

        for desired in [
            Vec3::new(6.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 4.0),
            Vec3::new(-3.0, 0.0, -3.0),
            Vec3::new(3.5, 0.2, 0.3),
        ] {
            let result = get_safe_position(&moving, desired, Vec3::zeros(), &refs, &config);
            let placed = moving.transform.with_position(result);
            assert!(check_collision(&moving, &placed, &refs).is_none(), "{desired:?} -> {result:?}");
        }
    }

    #[test]
    fn test_blocked_start_falls_back_to_current() {
        let mut keys = SlotMap::with_key();
        let moving = cube_at(&mut keys, Vec3::zeros(), 2.0);
        let blob = cube_at(&mut keys, Vec3::new(2.0, 0.0, 0.0), 6.0);

        let result = get_safe_position(
            &moving,
            Vec3::new(3.0, 0.0, 0.0),
            Vec3::zeros(),
            &[&blob],
            &PlacementConfig::default(),
        );
        assert_eq!(result, Vec3::zeros());
    }

    #[test]
    fn test_square_spiral_is_deterministic_and_layered() {
        let offsets: Vec<_> = square_spiral_offsets(1.0, 2.0).collect();
        assert_eq!(offsets.len(), 8 + 16);
        assert_eq!(offsets, square_spiral_offsets(1.0, 2.0).collect::<Vec<_>>());

        // First layer: edge midpoints before corners
        let first_layer = &offsets[..8];
        assert!(first_layer[..4].iter().all(|(x, z)| x.abs() + z.abs() == 1.0));
        assert!(first_layer[4..].iter().all(|(x, z)| x.abs() == 1.0 && z.abs() == 1.0));
        assert!(offsets[8..].iter().all(|(x, z)| x.abs().max(z.abs()) == 2.0));
        assert!(!offsets.contains(&(0.0, 0.0)));

        // Second layer also runs nearest-first, ties row-major
        assert_eq!(&offsets[8..12], &[(-2.0, 0.0), (0.0, -2.0), (0.0, 2.0), (2.0, 0.0)]);
        let distances: Vec<f32> = offsets[8..].iter().map(|(x, z)| x * x + z * z).collect();
        assert!(distances.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_offset_generators_are_lazy() {
        // Far more layers and rings than could ever be built up front
        let first: Vec<_> = square_spiral_offsets(0.05, 1.0e6).take(8).collect();
        assert_eq!(first, square_spiral_offsets(0.05, 0.05).collect::<Vec<_>>());

        assert_eq!(ring_offsets(0.05, 1.0e6).take(20).count(), 20);
        assert_eq!(square_spiral_offsets(1.0, f32::NAN).count(), 0);
    }

    #[test]
    fn test_ring_offsets_spacing_and_counts() {
        let offsets: Vec<_> = ring_offsets(1.0, 2.0).collect();
        // Ring 1: ceil(2π) = 7 -> 8 samples; ring 2: ceil(4π) = 13
        assert_eq!(offsets.len(), 8 + 13);
        for (x, z) in &offsets[..8] {
            assert_relative_eq!((x * x + z * z).sqrt(), 1.0, epsilon = 1e-5);
        }
        assert_eq!(ring_offsets(0.0, 10.0).count(), 0);
    }
}
