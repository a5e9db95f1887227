//! Collision primitives
//!
//! Ray casting against block cells. Blocks are cubes aligned with their
//! vehicle's lattice, so every query is done in the vehicle's local frame
//! where each cell is an axis-aligned box and the slab method applies.

use glam::Vec3;

/// A ray with a normalized direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray. `direction` is normalized; a zero direction stays zero.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }
}

/// Slab-method ray / AABB test.
///
/// Returns the distance along the ray to the entry point, the exit point when
/// the origin is inside the box, or `None` for a miss or a box fully behind
/// the origin.
pub fn ray_aabb_intersect(
    ray_origin: Vec3,
    ray_dir: Vec3,
    aabb_min: Vec3,
    aabb_max: Vec3,
) -> Option<f32> {
    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;

    for axis in 0..3 {
        let o = ray_origin[axis];
        let d = ray_dir[axis];
        let lo = aabb_min[axis];
        let hi = aabb_max[axis];

        if d.abs() < 1e-10 {
            // Parallel to this slab: must already be between the planes
            if o < lo || o > hi {
                return None;
            }
            continue;
        }

        let inv = 1.0 / d;
        let t1 = (lo - o) * inv;
        let t2 = (hi - o) * inv;
        t_enter = t_enter.max(t1.min(t2));
        t_exit = t_exit.min(t1.max(t2));
    }

    if t_exit < t_enter || t_exit < 0.0 {
        return None;
    }
    Some(if t_enter >= 0.0 { t_enter } else { t_exit })
}

/// Outward normal of the AABB face closest to `point`.
pub fn aabb_surface_normal(point: Vec3, aabb_min: Vec3, aabb_max: Vec3) -> Vec3 {
    let center = (aabb_min + aabb_max) * 0.5;
    let half_extents = ((aabb_max - aabb_min) * 0.5).max(Vec3::splat(1e-6));
    let n = (point - center) / half_extents;
    let a = n.abs();

    if a.x >= a.y && a.x >= a.z {
        Vec3::new(n.x.signum(), 0.0, 0.0)
    } else if a.y >= a.z {
        Vec3::new(0.0, n.y.signum(), 0.0)
    } else {
        Vec3::new(0.0, 0.0, n.z.signum())
    }
}
