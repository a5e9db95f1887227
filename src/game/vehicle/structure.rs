//! Vehicle Structure
//!
//! One vehicle's block registry, connection graph and body index, anchored
//! to a [`VehicleFrame`]. The player's vehicle and every AI vehicle are
//! instances of the same type, told apart only by their key.
//!
//! Invariants kept by every mutation:
//! - every coordinate in the graph is registered
//! - edges are symmetric
//! - the root block at (0, 0, 0) stays registered until the vehicle is
//!   despawned

use std::collections::HashMap;
use std::sync::Arc;

use super::connections::ConnectionGraph;
use super::events::StructureEvent;
use super::key::VehicleId;
use super::registry::BlockRegistry;
use crate::game::blocks::{BlockType, BlockTypeId, PlacedBlock};
use crate::physics::{BodyDesc, BodyHandle, BodyService};
use crate::world::{LatticeCoord, LatticeRotation, VehicleFrame};

/// Block layout and connectivity of a single vehicle.
#[derive(Debug, Clone)]
pub struct VehicleStructure<K> {
    key: K,
    frame: VehicleFrame,
    pub(super) registry: BlockRegistry<K>,
    pub(super) graph: ConnectionGraph,
    pub(super) body_index: HashMap<BodyHandle, LatticeCoord>,
    pub(super) events: Vec<StructureEvent<K>>,
    /// Set while a validation pass runs
    pub(super) validating: bool,
}

impl<K: VehicleId> VehicleStructure<K> {
    /// Empty structure with no root. Use [`VehicleStructure::spawn`] for a
    /// playable vehicle.
    pub fn new(key: K, frame: VehicleFrame) -> Self {
        Self {
            key,
            frame,
            registry: BlockRegistry::new(),
            graph: ConnectionGraph::new(),
            body_index: HashMap::new(),
            events: Vec::new(),
            validating: false,
        }
    }

    /// Create a vehicle with its root block spawned at the frame origin.
    pub fn spawn(
        key: K,
        frame: VehicleFrame,
        root_type: Arc<BlockType>,
        physics: &mut impl BodyService,
    ) -> Self {
        let mut structure = Self::new(key, frame);
        let body = physics.spawn_body(BodyDesc {
            position: frame.local_to_world(LatticeCoord::ORIGIN),
            rotation: frame.rotation,
            half_extents: root_type.body.half_extents * frame.cell_size,
            mass: root_type.body.mass,
        });
        let root = PlacedBlock::new(
            key,
            LatticeCoord::ORIGIN,
            LatticeRotation::IDENTITY,
            root_type,
            body,
        );
        structure.add_block(root);
        log::info!("[Vehicle] {key} spawned at {:?}", frame.position);
        structure
    }

    pub fn key(&self) -> K {
        self.key
    }

    pub fn frame(&self) -> &VehicleFrame {
        &self.frame
    }

    /// `TryGetBlockAt`: the block registered at a coordinate.
    pub fn block_at(&self, coord: LatticeCoord) -> Option<&PlacedBlock<K>> {
        self.registry.get(coord)
    }

    pub fn root(&self) -> Option<&PlacedBlock<K>> {
        self.registry.get(LatticeCoord::ORIGIN)
    }

    pub fn registry(&self) -> &BlockRegistry<K> {
        &self.registry
    }

    pub fn graph(&self) -> &ConnectionGraph {
        &self.graph
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn blocks(&self) -> impl Iterator<Item = &PlacedBlock<K>> {
        self.registry.iter()
    }

    /// Coordinate of the block that owns `body`.
    pub fn coord_of_body(&self, body: BodyHandle) -> Option<LatticeCoord> {
        self.body_index.get(&body).copied()
    }

    /// Attached blocks of one type.
    pub fn mounted_count(&self, block_type: BlockTypeId) -> usize {
        self.registry
            .iter()
            .filter(|b| b.block_type().id == block_type)
            .count()
    }

    pub fn is_connected(&self, a: LatticeCoord, b: LatticeCoord) -> bool {
        self.graph.is_connected(a, b)
    }

    /// Neighbours of `coord` in the connection graph, ascending.
    pub fn neighbors(&self, coord: LatticeCoord) -> Vec<LatticeCoord> {
        self.graph.neighbors(coord).collect()
    }

    pub fn is_validating(&self) -> bool {
        self.validating
    }

    /// `AddBlock`: register a block at its coordinate.
    ///
    /// No-op (returns false) if the cell is taken or the block belongs to
    /// another vehicle.
    pub fn add_block(&mut self, block: PlacedBlock<K>) -> bool {
        if block.vehicle() != self.key {
            log::warn!(
                "[Vehicle] {} refused block owned by {}",
                self.key,
                block.vehicle()
            );
            return false;
        }
        let coord = block.coord();
        let body = block.body();
        if !self.registry.insert(block) {
            return false;
        }
        self.body_index.insert(body, coord);
        true
    }

    /// Add a graph edge between two registered, distinct coordinates.
    pub fn add_connection(&mut self, a: LatticeCoord, b: LatticeCoord) -> bool {
        if !self.registry.contains(a) || !self.registry.contains(b) {
            log::debug!("[Vehicle] {} edge {a} - {b} refused: unregistered end", self.key);
            return false;
        }
        self.graph.add_connection(a, b)
    }

    /// `RemoveBlock`: unregister a block and strip its edges.
    ///
    /// The root is never removed; the body is left to the caller.
    pub fn remove_block(&mut self, coord: LatticeCoord) -> Option<PlacedBlock<K>> {
        if coord.is_origin() {
            log::warn!("[Vehicle] {} refused to remove its root block", self.key);
            return None;
        }
        let block = self.registry.remove(coord)?;
        self.graph.remove_connections(coord);
        self.body_index.remove(&block.body());
        Some(block)
    }

    pub(crate) fn push_event(&mut self, event: StructureEvent<K>) {
        self.events.push(event);
    }

    /// Take all queued events, oldest first.
    pub fn drain_events(&mut self) -> Vec<StructureEvent<K>> {
        std::mem::take(&mut self.events)
    }

    /// Destroy every body of the vehicle, the root included.
    ///
    /// Returns the number of blocks destroyed.
    pub fn despawn(&mut self, physics: &mut impl BodyService) -> usize {
        let mut destroyed = 0;
        for block in self.registry.drain() {
            physics.despawn_body(block.body());
            destroyed += 1;
        }
        self.graph.clear();
        self.body_index.clear();
        log::info!("[Vehicle] {} destroyed ({destroyed} blocks)", self.key);
        destroyed
    }

    /// Check the registry, graph and body index against each other.
    pub fn is_consistent(&self) -> bool {
        let graph_in_registry = self.graph.keys().all(|c| self.registry.contains(c));
        let index_matches = self.body_index.len() == self.registry.len()
            && self
                .body_index
                .iter()
                .all(|(body, coord)| self.registry.get(*coord).is_some_and(|b| b.body() == *body));
        graph_in_registry && self.graph.is_symmetric() && index_matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::blocks::BlockCatalog;
    use crate::physics::BondWorld;

    #[test]
    fn spawn_registers_root() {
        let catalog = BlockCatalog::builtin();
        let mut physics = BondWorld::new();
        let core = catalog.core().unwrap().clone();
        let structure = VehicleStructure::spawn(7u32, VehicleFrame::default(), core, &mut physics);

        let root = structure.root().expect("root registered");
        assert_eq!(root.coord(), LatticeCoord::ORIGIN);
        assert_eq!(structure.coord_of_body(root.body()), Some(LatticeCoord::ORIGIN));
        assert_eq!(physics.body_count(), 1);
        assert!(structure.is_consistent());
    }

    #[test]
    fn root_cannot_be_removed() {
        let catalog = BlockCatalog::builtin();
        let mut physics = BondWorld::new();
        let core = catalog.core().unwrap().clone();
        let mut structure =
            VehicleStructure::spawn(0u32, VehicleFrame::default(), core, &mut physics);
        assert!(structure.remove_block(LatticeCoord::ORIGIN).is_none());
        assert!(structure.root().is_some());
    }

    #[test]
    fn edges_need_registered_ends() {
        let catalog = BlockCatalog::builtin();
        let mut physics = BondWorld::new();
        let core = catalog.core().unwrap().clone();
        let mut structure =
            VehicleStructure::spawn(0u32, VehicleFrame::default(), core, &mut physics);
        assert!(!structure.add_connection(LatticeCoord::ORIGIN, LatticeCoord::new(0, 1, 0)));
        assert_eq!(structure.graph().edge_count(), 0);
    }

    #[test]
    fn foreign_blocks_are_refused() {
        let catalog = BlockCatalog::builtin();
        let mut physics = BondWorld::new();
        let core = catalog.core().unwrap().clone();
        let mut structure =
            VehicleStructure::spawn(0u32, VehicleFrame::default(), core, &mut physics);
        let armor = catalog.by_name("Armor Cube").unwrap().clone();
        let foreign = PlacedBlock::new(
            1u32,
            LatticeCoord::new(1, 0, 0),
            LatticeRotation::IDENTITY,
            armor,
            BodyHandle(99),
        );
        assert!(!structure.add_block(foreign));
        assert_eq!(structure.len(), 1);
    }

    #[test]
    fn despawn_destroys_every_body() {
        let catalog = BlockCatalog::builtin();
        let mut physics = BondWorld::new();
        let core = catalog.core().unwrap().clone();
        let mut structure =
            VehicleStructure::spawn(0u32, VehicleFrame::default(), core, &mut physics);
        assert_eq!(structure.despawn(&mut physics), 1);
        assert!(structure.is_empty());
        assert_eq!(physics.body_count(), 0);
    }
}
