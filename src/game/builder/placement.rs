//! Block Placement
//!
//! Turns an aim ray and a selected block type into a mounted block:
//! inventory check, hit test, surface check, target cell, orientation,
//! inventory charge, body + registry, bonds.
//!
//! Every rejection happens before the first mutation, so a refused
//! placement leaves the vehicle, physics and inventory untouched. A block
//! that ends up with no agreeing neighbour is placed and charged, then
//! detached straight away by the closing validation.

use std::sync::Arc;

use glam::{IVec3, Vec3};

use super::inventory::Inventory;
use super::raycast::HitTest;
use crate::game::blocks::{BlockType, BlockTypeId, MountSurface, PlacedBlock};
use crate::game::config::StructureConfig;
use crate::game::vehicle::{StructureEvent, VehicleId, VehicleStructure};
use crate::physics::{BodyDesc, BodyService, Ray};
use crate::world::{LatticeCoord, LatticeRotation, snap_to_axis};

// ============================================================================
// REJECTIONS
// ============================================================================

/// Why a placement was refused. Nothing was changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementRejection {
    /// No units of the selected type left
    EmptyInventory(BlockTypeId),
    /// The aim ray did not strike a block of this vehicle
    NoHit,
    /// The block type may not be mounted on this kind of surface
    SurfaceNotAllowed(MountSurface),
    /// The target cell already holds a block
    Occupied(LatticeCoord),
}

impl std::fmt::Display for PlacementRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlacementRejection::EmptyInventory(_) => write!(f, "no blocks of that type left"),
            PlacementRejection::NoHit => write!(f, "not aiming at the vehicle"),
            PlacementRejection::SurfaceNotAllowed(surface) => {
                write!(f, "cannot mount this block on a {surface} surface")
            }
            PlacementRejection::Occupied(coord) => write!(f, "cell {coord} is occupied"),
        }
    }
}

impl std::error::Error for PlacementRejection {}

// ============================================================================
// ORIENTATION
// ============================================================================

/// Base rotation that lays a block onto the surface it is mounted on.
///
/// Top mounts keep the root orientation, bottom mounts flip upside down
/// about local X, side mounts swing the type's attach direction onto the
/// surface normal.
pub fn surface_alignment(
    block_type: &BlockType,
    surface: MountSurface,
    normal: IVec3,
) -> LatticeRotation {
    match surface {
        MountSurface::Top => LatticeRotation::IDENTITY,
        MountSurface::Bottom => LatticeRotation::half_turn(IVec3::X),
        MountSurface::Side => {
            LatticeRotation::from_rotation_arc(block_type.attach_direction, normal)
        }
    }
}

/// Fixed convention twist for side mounts: a half turn about vehicle up,
/// applied after alignment.
pub fn side_convention(surface: MountSurface) -> LatticeRotation {
    match surface {
        MountSurface::Side => LatticeRotation::half_turn(IVec3::Y),
        MountSurface::Top | MountSurface::Bottom => LatticeRotation::IDENTITY,
    }
}

/// Operator twist: `turns` quarter turns about the surface normal, for
/// rotatable types only.
pub fn operator_twist(block_type: &BlockType, normal: IVec3, turns: u8) -> LatticeRotation {
    if block_type.rotatable {
        LatticeRotation::quarter_turns(normal, turns % 4)
    } else {
        LatticeRotation::IDENTITY
    }
}

/// Final block orientation in the vehicle frame: `twist ∘ convention ∘ alignment`.
pub fn placement_orientation(
    block_type: &BlockType,
    surface: MountSurface,
    normal: IVec3,
    turns: u8,
) -> LatticeRotation {
    operator_twist(block_type, normal, turns)
        * side_convention(surface)
        * surface_alignment(block_type, surface, normal)
}

// ============================================================================
// PLACEMENT ENGINE
// ============================================================================

/// One placement attempt.
#[derive(Debug, Clone)]
pub struct PlacementRequest {
    pub ray: Ray,
    pub block_type: Arc<BlockType>,
    /// Quarter turns about the surface normal (rotatable types only)
    pub twist: u8,
}

impl PlacementRequest {
    pub fn new(ray: Ray, block_type: Arc<BlockType>) -> Self {
        Self {
            ray,
            block_type,
            twist: 0,
        }
    }

    pub fn with_twist(mut self, twist: u8) -> Self {
        self.twist = twist;
        self
    }
}

/// Mount rules for placing blocks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementEngine {
    /// Normals within this angle of up are "top" (degrees)
    pub top_max_angle_deg: f32,
    /// Normals beyond this angle from up are "bottom" (degrees)
    pub bottom_min_angle_deg: f32,
}

impl Default for PlacementEngine {
    fn default() -> Self {
        Self {
            top_max_angle_deg: 30.0,
            bottom_min_angle_deg: 150.0,
        }
    }
}

impl PlacementEngine {
    pub fn from_config(config: &StructureConfig) -> Self {
        Self {
            top_max_angle_deg: config.top_max_angle_deg,
            bottom_min_angle_deg: config.bottom_min_angle_deg,
        }
    }

    /// Classify a surface normal, given in the vehicle frame, against local up.
    pub fn classify_surface(&self, local_normal: Vec3) -> MountSurface {
        let cos = local_normal.normalize_or_zero().dot(Vec3::Y).clamp(-1.0, 1.0);
        let angle = cos.acos().to_degrees();
        if angle < self.top_max_angle_deg {
            MountSurface::Top
        } else if angle > self.bottom_min_angle_deg {
            MountSurface::Bottom
        } else {
            MountSurface::Side
        }
    }

    /// Place a block where the request's ray strikes the vehicle.
    ///
    /// # Arguments
    /// * `structure` - Vehicle to build on
    /// * `physics` - Body service that owns block bodies and bonds
    /// * `inventory` - Source of the block; charged one unit before the body is spawned
    /// * `hit_test` - Resolves the aim ray to a block face
    /// * `request` - Ray, block type and twist
    ///
    /// # Returns
    /// The coordinate of the new block, or why nothing was placed
    pub fn place_block<K: VehicleId>(
        &self,
        structure: &mut VehicleStructure<K>,
        physics: &mut impl BodyService,
        inventory: &mut impl Inventory,
        hit_test: &impl HitTest<K>,
        request: &PlacementRequest,
    ) -> Result<LatticeCoord, PlacementRejection> {
        let result = self.try_place(structure, physics, inventory, hit_test, request);
        if let Err(rejection) = &result {
            log::info!(
                "[Placement] {} '{}' refused: {rejection}",
                structure.key(),
                request.block_type.name
            );
        }
        result
    }

    fn try_place<K: VehicleId>(
        &self,
        structure: &mut VehicleStructure<K>,
        physics: &mut impl BodyService,
        inventory: &mut impl Inventory,
        hit_test: &impl HitTest<K>,
        request: &PlacementRequest,
    ) -> Result<LatticeCoord, PlacementRejection> {
        let block_type = &request.block_type;

        // 0. Something to place
        if inventory.count(block_type.id) == 0 {
            return Err(PlacementRejection::EmptyInventory(block_type.id));
        }

        // 1. Aimed at one of our blocks
        let hit = hit_test
            .hit_test(structure, &request.ray)
            .filter(|hit| structure.block_at(hit.coord).is_some())
            .ok_or(PlacementRejection::NoHit)?;

        // 2. Surface class allowed for this type
        let frame = *structure.frame();
        let local_normal = frame.world_dir_to_local(hit.normal);
        let surface = self.classify_surface(local_normal);
        if !block_type.mounting.allows(surface) {
            return Err(PlacementRejection::SurfaceNotAllowed(surface));
        }

        // 3. Target cell: half a cell out of the face, rounded
        let normal = snap_to_axis(local_normal);
        if normal == IVec3::ZERO {
            return Err(PlacementRejection::NoHit);
        }
        let outward = frame.local_dir_to_world(normal.as_vec3());
        let probe = hit.point + outward * (frame.cell_size * 0.5);
        let coord = frame.world_to_local(probe);
        if structure.block_at(coord).is_some() {
            return Err(PlacementRejection::Occupied(coord));
        }

        // 4. Orientation
        let orientation = placement_orientation(block_type, surface, normal, request.twist);

        // Charge one unit; nothing has been created yet if it is refused
        if !inventory.try_consume(block_type.id, 1) {
            return Err(PlacementRejection::EmptyInventory(block_type.id));
        }

        // 5. Body + registry
        let key = structure.key();
        let body = physics.spawn_body(BodyDesc {
            position: frame.local_to_world(coord),
            rotation: frame.local_rotation_to_world(orientation),
            half_extents: block_type.body.half_extents * frame.cell_size,
            mass: block_type.body.mass,
        });
        let block = PlacedBlock::new(key, coord, orientation, block_type.clone(), body);
        let offsets: Vec<IVec3> = block.world_offsets().collect();
        structure.add_block(block);

        // 6. Bonds where both sides' offsets agree
        let mut bonded = 0;
        for offset in offsets {
            let neighbor_coord = coord + offset;
            let (Some(placed), Some(neighbor)) =
                (structure.block_at(coord), structure.block_at(neighbor_coord))
            else {
                continue;
            };
            if !placed.agrees_with(neighbor, offset) {
                continue;
            }
            let strength = block_type.bond_strength_with(neighbor.block_type());
            if physics.create_bond(body, neighbor.body(), strength) {
                structure.add_connection(coord, neighbor_coord);
                bonded += 1;
            }
        }

        // 7. Announce
        structure.push_event(StructureEvent::BlockAdded {
            vehicle: key,
            coord,
            block_type: block_type.id,
            body,
        });
        log::info!(
            "[Placement] {key} placed '{}' at {coord} on {surface} surface ({bonded} bond(s))",
            block_type.name
        );

        // Nothing agreed to bond: the block cannot reach the root
        if bonded == 0 {
            structure.validate_structure(physics);
        }

        Ok(coord)
    }
}
