//! Structure events
//!
//! Outbound notifications for collaborators (UI, audio, AI, turret
//! controllers). Structures queue them; callers drain them after each
//! mutation or tick.

use crate::game::blocks::{BlockTypeId, PlacedBlock};
use crate::physics::BodyHandle;
use crate::world::LatticeCoord;

#[derive(Debug, Clone)]
pub enum StructureEvent<K> {
    /// A block was placed and registered.
    BlockAdded {
        vehicle: K,
        coord: LatticeCoord,
        block_type: BlockTypeId,
        body: BodyHandle,
    },
    /// A block was deliberately removed and its body destroyed.
    BlockRemoved {
        vehicle: K,
        coord: LatticeCoord,
        block_type: BlockTypeId,
    },
    /// A block lost its path to the root and now lives as a free body.
    ///
    /// The event hands over the block itself; it is no longer in any
    /// registry.
    Detached {
        vehicle: K,
        former_coord: LatticeCoord,
        block: PlacedBlock<K>,
    },
}

impl<K: Copy> StructureEvent<K> {
    pub fn vehicle(&self) -> K {
        match self {
            StructureEvent::BlockAdded { vehicle, .. }
            | StructureEvent::BlockRemoved { vehicle, .. }
            | StructureEvent::Detached { vehicle, .. } => *vehicle,
        }
    }

    pub fn coord(&self) -> LatticeCoord {
        match self {
            StructureEvent::BlockAdded { coord, .. }
            | StructureEvent::BlockRemoved { coord, .. } => {
                *coord
            }
            StructureEvent::Detached { former_coord, .. } => *former_coord,
        }
    }

    pub fn is_detached(&self) -> bool {
        matches!(self, StructureEvent::Detached { .. })
    }
}
