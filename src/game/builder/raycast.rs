//! Raycast Utilities
//!
//! Aim-ray hit testing against a vehicle's blocks.
//!
//! The cast runs in the vehicle's lattice frame, where every block cell is
//! the unit box `coord ± 0.5`, so a rotated vehicle needs no oriented-box
//! math: the ray is transformed once and tested against axis-aligned cells.

use glam::Vec3;

use crate::game::vehicle::{VehicleId, VehicleStructure};
use crate::physics::{Ray, aabb_surface_normal, ray_aabb_intersect};
use crate::world::LatticeCoord;

/// Where an aim ray struck a block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// World-space hit point on the block surface
    pub point: Vec3,
    /// World-space outward normal of the face that was hit
    pub normal: Vec3,
    /// Distance along the ray (meters)
    pub distance: f32,
    /// Cell of the block that was hit
    pub coord: LatticeCoord,
}

/// Hit-test collaborator: which block of `structure` does `ray` strike first?
pub trait HitTest<K> {
    fn hit_test(&self, structure: &VehicleStructure<K>, ray: &Ray) -> Option<RayHit>;
}

/// Hit test against the unit cells of registered blocks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatticeRaycaster {
    /// Hits farther than this are ignored (meters)
    pub max_distance: f32,
}

impl Default for LatticeRaycaster {
    fn default() -> Self {
        Self { max_distance: 50.0 }
    }
}

impl LatticeRaycaster {
    pub fn new(max_distance: f32) -> Self {
        Self { max_distance }
    }
}

impl<K: VehicleId> HitTest<K> for LatticeRaycaster {
    fn hit_test(&self, structure: &VehicleStructure<K>, ray: &Ray) -> Option<RayHit> {
        if ray.direction == Vec3::ZERO {
            return None;
        }
        let frame = structure.frame();

        // Lattice units: one cell per unit, root cell centered at the origin
        let origin = frame.world_point_to_lattice(ray.origin);
        let dir = frame.world_dir_to_local(ray.direction).normalize_or_zero();
        let max_t = self.max_distance / frame.cell_size;

        let mut best: Option<(f32, LatticeCoord)> = None;
        for block in structure.blocks() {
            let coord = block.coord();
            let center = coord.as_vec3();
            let Some(t) = ray_aabb_intersect(origin, dir, center - 0.5, center + 0.5) else {
                continue;
            };
            if t > max_t {
                continue;
            }
            let closer = match best {
                None => true,
                Some((best_t, best_coord)) => {
                    t < best_t - 1e-5 || ((t - best_t).abs() <= 1e-5 && coord < best_coord)
                }
            };
            if closer {
                best = Some((t, coord));
            }
        }

        let (t, coord) = best?;
        let local_point = origin + dir * t;
        let center = coord.as_vec3();
        let local_normal = aabb_surface_normal(local_point, center - 0.5, center + 0.5);

        Some(RayHit {
            point: frame.position + frame.rotation * (local_point * frame.cell_size),
            normal: frame.local_dir_to_world(local_normal),
            distance: t * frame.cell_size,
            coord,
        })
    }
}
