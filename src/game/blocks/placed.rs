//! Placed Blocks
//!
//! A block instance mounted on (or torn off) a vehicle. Coordinate, owner
//! and orientation are fixed at creation; only the detachment state and
//! the subsystem switch change afterwards.

use std::sync::Arc;

use glam::IVec3;

use super::block_type::BlockType;
use super::offsets::offsets_agree;
use crate::physics::BodyHandle;
use crate::world::{LatticeCoord, LatticeRotation};

/// A block instance on a vehicle lattice.
#[derive(Debug, Clone)]
pub struct PlacedBlock<K> {
    vehicle: K,
    coord: LatticeCoord,
    orientation: LatticeRotation,
    block_type: Arc<BlockType>,
    body: BodyHandle,
    detached: bool,
    subsystems_enabled: bool,
}

impl<K: Copy> PlacedBlock<K> {
    pub fn new(
        vehicle: K,
        coord: LatticeCoord,
        orientation: LatticeRotation,
        block_type: Arc<BlockType>,
        body: BodyHandle,
    ) -> Self {
        Self {
            vehicle,
            coord,
            orientation,
            block_type,
            body,
            detached: false,
            subsystems_enabled: true,
        }
    }

    pub fn vehicle(&self) -> K {
        self.vehicle
    }
}

impl<K> PlacedBlock<K> {
    pub fn coord(&self) -> LatticeCoord {
        self.coord
    }

    pub fn orientation(&self) -> LatticeRotation {
        self.orientation
    }

    pub fn block_type(&self) -> &Arc<BlockType> {
        &self.block_type
    }

    pub fn body(&self) -> BodyHandle {
        self.body
    }

    pub fn is_detached(&self) -> bool {
        self.detached
    }

    pub fn subsystems_enabled(&self) -> bool {
        self.subsystems_enabled
    }

    /// Attached → Detached. Never goes back.
    pub(crate) fn mark_detached(&mut self) {
        self.detached = true;
    }

    /// Stop weapon/drive behaviour. Subsystems never come back on.
    pub(crate) fn disable_subsystems(&mut self) {
        self.subsystems_enabled = false;
    }

    /// This block's connection offsets in the vehicle frame.
    pub fn world_offsets(&self) -> impl Iterator<Item = IVec3> + '_ {
        self.block_type.offsets.rotated(self.orientation)
    }

    /// Whether this block may bond along `direction` (vehicle frame).
    pub fn accepts_direction(&self, direction: IVec3) -> bool {
        self.block_type.offsets.accepts(self.orientation, direction)
    }

    /// Whether this block and `other` may bond, `direction` pointing from
    /// this block to `other` in the vehicle frame.
    pub fn agrees_with<L>(&self, other: &PlacedBlock<L>, direction: IVec3) -> bool {
        offsets_agree(
            &self.block_type.offsets,
            self.orientation,
            &other.block_type.offsets,
            other.orientation,
            direction,
        )
    }
}
