//! Block Registry
//!
//! Coordinate → block map of one vehicle. Enforces single occupancy: a cell
//! holds at most one block, and an insert into an occupied cell changes
//! nothing.

use std::collections::HashMap;

use crate::game::blocks::PlacedBlock;
use crate::world::LatticeCoord;

/// Lattice cells occupied by a vehicle's blocks.
#[derive(Debug, Clone)]
pub struct BlockRegistry<K> {
    blocks: HashMap<LatticeCoord, PlacedBlock<K>>,
}

impl<K> Default for BlockRegistry<K> {
    fn default() -> Self {
        Self {
            blocks: HashMap::new(),
        }
    }
}

impl<K> BlockRegistry<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block at a coordinate, if any. No side effects.
    pub fn get(&self, coord: LatticeCoord) -> Option<&PlacedBlock<K>> {
        self.blocks.get(&coord)
    }

    pub(crate) fn get_mut(&mut self, coord: LatticeCoord) -> Option<&mut PlacedBlock<K>> {
        self.blocks.get_mut(&coord)
    }

    pub fn contains(&self, coord: LatticeCoord) -> bool {
        self.blocks.contains_key(&coord)
    }

    /// Register a block at its own coordinate.
    ///
    /// Returns false, leaving the registry untouched, if the cell is taken.
    pub fn insert(&mut self, block: PlacedBlock<K>) -> bool {
        let coord = block.coord();
        if self.blocks.contains_key(&coord) {
            log::debug!("[Registry] {coord} already occupied, insert ignored");
            return false;
        }
        self.blocks.insert(coord, block);
        true
    }

    /// Remove and return the block at `coord`. Missing entries are a no-op.
    pub fn remove(&mut self, coord: LatticeCoord) -> Option<PlacedBlock<K>> {
        let removed = self.blocks.remove(&coord);
        if removed.is_none() {
            log::debug!("[Registry] nothing to remove at {coord}");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlacedBlock<K>> {
        self.blocks.values()
    }

    /// Occupied coordinates in ascending order.
    pub fn coords(&self) -> Vec<LatticeCoord> {
        let mut coords: Vec<LatticeCoord> = self.blocks.keys().copied().collect();
        coords.sort();
        coords
    }

    pub(crate) fn drain(&mut self) -> impl Iterator<Item = PlacedBlock<K>> + '_ {
        self.blocks.drain().map(|(_, block)| block)
    }
}
