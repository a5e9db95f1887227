//! Block Removal
//!
//! Deliberate removal of a block by the operator: refund one unit, destroy
//! the body, unregister the block, then validate so anything that hung only
//! off the removed block falls away.

use super::inventory::Inventory;
use super::raycast::HitTest;
use crate::game::vehicle::{StructureEvent, VehicleId, VehicleStructure};
use crate::physics::{BodyService, Ray};
use crate::world::LatticeCoord;

/// Why a removal was refused. Nothing was changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalRejection {
    /// Nothing of this vehicle under the aim ray
    NoHit,
    /// The root block stays for the vehicle's whole life
    RootProtected,
}

impl std::fmt::Display for RemovalRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RemovalRejection::NoHit => write!(f, "not aiming at a block"),
            RemovalRejection::RootProtected => write!(f, "the core block cannot be removed"),
        }
    }
}

impl std::error::Error for RemovalRejection {}

/// What a successful removal did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    pub coord: LatticeCoord,
    /// Units actually returned to the inventory (0 at max stack)
    pub refunded: u32,
    /// Blocks that lost their path to the root as a result
    pub detached: Vec<LatticeCoord>,
}

/// Remove the block under the aim ray.
pub fn remove_block<K: VehicleId>(
    structure: &mut VehicleStructure<K>,
    physics: &mut impl BodyService,
    inventory: &mut impl Inventory,
    hit_test: &impl HitTest<K>,
    ray: &Ray,
) -> Result<Removal, RemovalRejection> {
    let Some(hit) = hit_test.hit_test(structure, ray) else {
        log::info!("[Removal] {} refused: {}", structure.key(), RemovalRejection::NoHit);
        return Err(RemovalRejection::NoHit);
    };
    remove_block_at(structure, physics, inventory, hit.coord)
}

/// Remove the block at a known coordinate.
pub fn remove_block_at<K: VehicleId>(
    structure: &mut VehicleStructure<K>,
    physics: &mut impl BodyService,
    inventory: &mut impl Inventory,
    coord: LatticeCoord,
) -> Result<Removal, RemovalRejection> {
    let rejection = if coord.is_origin() {
        Some(RemovalRejection::RootProtected)
    } else if structure.block_at(coord).is_none() {
        Some(RemovalRejection::NoHit)
    } else {
        None
    };
    if let Some(rejection) = rejection {
        log::info!("[Removal] {} refused at {coord}: {rejection}", structure.key());
        return Err(rejection);
    }

    let Some(block) = structure.remove_block(coord) else {
        return Err(RemovalRejection::NoHit);
    };
    let refunded = inventory.add(block.block_type(), 1);
    physics.despawn_body(block.body());

    let key = structure.key();
    structure.push_event(StructureEvent::BlockRemoved {
        vehicle: key,
        coord,
        block_type: block.block_type().id,
    });
    log::info!(
        "[Removal] {key} removed '{}' at {coord} (refunded {refunded})",
        block.block_type().name
    );

    let detached = structure.validate_structure(physics);
    Ok(Removal {
        coord,
        refunded,
        detached,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::blocks::BlockCatalog;
    use crate::game::builder::BlockInventory;
    use crate::physics::BondWorld;
    use crate::world::VehicleFrame;

    #[test]
    fn root_is_protected() {
        let catalog = BlockCatalog::builtin();
        let mut physics = BondWorld::new();
        let mut inventory = BlockInventory::new();
        let core = catalog.core().unwrap().clone();
        let mut structure =
            VehicleStructure::spawn(0u32, VehicleFrame::default(), core, &mut physics);

        let result =
            remove_block_at(&mut structure, &mut physics, &mut inventory, LatticeCoord::ORIGIN);
        assert_eq!(result, Err(RemovalRejection::RootProtected));
        assert_eq!(structure.len(), 1);
        assert_eq!(physics.body_count(), 1);
        assert_eq!(inventory.total(), 0);
    }

    #[test]
    fn empty_cell_is_no_hit() {
        let catalog = BlockCatalog::builtin();
        let mut physics = BondWorld::new();
        let mut inventory = BlockInventory::new();
        let core = catalog.core().unwrap().clone();
        let mut structure =
            VehicleStructure::spawn(0u32, VehicleFrame::default(), core, &mut physics);

        let empty = LatticeCoord::new(0, 4, 0);
        let result = remove_block_at(&mut structure, &mut physics, &mut inventory, empty);
        assert_eq!(result, Err(RemovalRejection::NoHit));
    }
}
