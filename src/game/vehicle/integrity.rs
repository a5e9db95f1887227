//! Structural Integrity
//!
//! Reachability-based detachment. Every registered block must reach the
//! root through connection edges; blocks that can't are torn off the
//! vehicle and handed to free physics.
//!
//! Also rebuilds the connection graph from the physical bonds when the two
//! have drifted apart (a bond broke under load).

use std::collections::HashSet;

use super::events::StructureEvent;
use super::key::VehicleId;
use super::structure::VehicleStructure;
use crate::physics::BodyService;
use crate::world::LatticeCoord;

impl<K: VehicleId> VehicleStructure<K> {
    /// Detach every block the root can no longer reach.
    ///
    /// Detached blocks keep their body as a free rigid body: bonds are
    /// destroyed, subsystems disabled, and the block leaves the registry and
    /// the graph. One [`StructureEvent::Detached`] is queued per block.
    ///
    /// Returns the former coordinates of the detached blocks, ascending.
    /// A call made while a pass is already running does nothing.
    pub fn validate_structure(&mut self, physics: &mut impl BodyService) -> Vec<LatticeCoord> {
        if self.validating {
            log::debug!("[Integrity] {} validation already running", self.key());
            return Vec::new();
        }
        self.validating = true;

        let reachable: HashSet<LatticeCoord> = if self.registry.contains(LatticeCoord::ORIGIN) {
            self.graph.reachable_from(LatticeCoord::ORIGIN)
        } else {
            log::warn!("[Integrity] {} has no root block", self.key());
            HashSet::new()
        };

        let orphans: Vec<LatticeCoord> = self
            .registry
            .coords()
            .into_iter()
            .filter(|c| !reachable.contains(c))
            .collect();

        for coord in &orphans {
            self.detach_block(*coord, physics);
        }

        if !orphans.is_empty() {
            log::info!(
                "[Integrity] {} lost {} block(s), {} remain",
                self.key(),
                orphans.len(),
                self.registry.len()
            );
        }

        self.validating = false;
        orphans
    }

    fn detach_block(&mut self, coord: LatticeCoord, physics: &mut impl BodyService) {
        let Some(body) = self.registry.get(coord).map(|b| b.body()) else {
            return;
        };

        physics.release_body(body);
        physics.break_bonds(body);

        if let Some(block) = self.registry.get_mut(coord) {
            block.mark_detached();
            block.disable_subsystems();
        }

        let Some(block) = self.registry.remove(coord) else {
            return;
        };
        self.graph.remove_connections(coord);
        self.body_index.remove(&body);

        log::info!(
            "[Integrity] {} '{}' at {coord} detached",
            self.key(),
            block.block_type().name
        );
        let vehicle = self.key();
        self.push_event(StructureEvent::Detached {
            vehicle,
            former_coord: coord,
            block,
        });
    }

    /// Rebuild the connection graph from the bonds physics still holds,
    /// then validate.
    ///
    /// For every block, each bonded peer's lattice cell is derived from the
    /// relative world positions of the two bodies. An edge is added only
    /// when that cell holds the peer and both blocks' offsets face each
    /// other.
    ///
    /// Returns the coordinates detached by the closing validation pass.
    pub fn recalculate_connections(&mut self, physics: &mut impl BodyService) -> Vec<LatticeCoord> {
        self.graph.clear();

        for coord in self.registry.coords() {
            let Some(block) = self.registry.get(coord) else {
                continue;
            };
            let body = block.body();
            let Some(position) = physics.body_position(body) else {
                log::warn!("[Integrity] {} block at {coord} has no body", self.key());
                continue;
            };

            for peer in physics.bonded_peers(body) {
                let Some(peer_position) = physics.body_position(peer) else {
                    continue;
                };
                let offset = self.frame().world_offset_to_lattice(position, peer_position);
                let peer_coord = coord + offset;

                let agrees = match (self.registry.get(coord), self.registry.get(peer_coord)) {
                    (Some(a), Some(b)) if b.body() == peer => a.agrees_with(b, offset),
                    _ => false,
                };
                if agrees {
                    self.graph.add_connection(coord, peer_coord);
                } else {
                    log::debug!(
                        "[Integrity] {} bond {body} <-> {peer} does not match the lattice",
                        self.key()
                    );
                }
            }
        }

        log::debug!(
            "[Integrity] {} rebuilt {} connection(s)",
            self.key(),
            self.graph.edge_count()
        );
        self.validate_structure(physics)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::game::blocks::{BlockCatalog, BlockType, PlacedBlock};
    use crate::physics::{BodyDesc, BondWorld, Quat};
    use crate::world::{LatticeRotation, VehicleFrame};

    /// Register a block and bond it to an existing neighbour, the way the
    /// placement engine does.
    fn attach(
        structure: &mut VehicleStructure<u32>,
        physics: &mut BondWorld,
        block_type: &Arc<BlockType>,
        coord: LatticeCoord,
        parent: LatticeCoord,
    ) {
        let body = physics.spawn_body(BodyDesc {
            position: structure.frame().local_to_world(coord),
            rotation: Quat::IDENTITY,
            half_extents: block_type.body.half_extents,
            mass: block_type.body.mass,
        });
        let block = PlacedBlock::new(0, coord, LatticeRotation::IDENTITY, block_type.clone(), body);
        assert!(structure.add_block(block));
        let parent_body = structure.block_at(parent).unwrap().body();
        assert!(physics.create_bond(body, parent_body, 100.0));
        assert!(structure.add_connection(coord, parent));
    }

    fn column(height: i32) -> (VehicleStructure<u32>, BondWorld) {
        let catalog = BlockCatalog::builtin();
        let mut physics = BondWorld::new();
        let core = catalog.core().unwrap().clone();
        let armor = catalog.by_name("Armor Cube").unwrap().clone();
        let mut structure =
            VehicleStructure::spawn(0u32, VehicleFrame::default(), core, &mut physics);
        for y in 1..=height {
            attach(
                &mut structure,
                &mut physics,
                &armor,
                LatticeCoord::new(0, y, 0),
                LatticeCoord::new(0, y - 1, 0),
            );
        }
        (structure, physics)
    }

    #[test]
    fn connected_structure_loses_nothing() {
        let (mut structure, mut physics) = column(3);
        assert!(structure.validate_structure(&mut physics).is_empty());
        assert_eq!(structure.len(), 4);
        assert!(structure.drain_events().is_empty());
    }

    #[test]
    fn cut_edge_detaches_everything_above() {
        let (mut structure, mut physics) = column(3);
        let body_2 = structure.block_at(LatticeCoord::new(0, 2, 0)).unwrap().body();

        structure.graph.remove_connections(LatticeCoord::new(0, 1, 0));
        let detached = structure.validate_structure(&mut physics);

        assert_eq!(
            detached,
            vec![
                LatticeCoord::new(0, 1, 0),
                LatticeCoord::new(0, 2, 0),
                LatticeCoord::new(0, 3, 0)
            ]
        );
        assert_eq!(structure.len(), 1);
        assert!(physics.is_free(body_2));
        assert!(physics.bonded_peers(body_2).is_empty());
        assert!(structure.is_consistent());

        let events = structure.drain_events();
        assert_eq!(events.len(), 3);
        for event in &events {
            let StructureEvent::Detached { block, .. } = event else {
                panic!("expected Detached, got {event:?}");
            };
            assert!(block.is_detached());
            assert!(!block.subsystems_enabled());
        }
    }

    #[test]
    fn validation_is_idempotent() {
        let (mut structure, mut physics) = column(2);
        structure.graph.remove_connections(LatticeCoord::new(0, 2, 0));
        assert_eq!(structure.validate_structure(&mut physics).len(), 1);
        assert!(structure.validate_structure(&mut physics).is_empty());
        assert_eq!(structure.len(), 2);
    }

    #[test]
    fn latch_blocks_reentry() {
        let (mut structure, mut physics) = column(1);
        structure.graph.clear();
        structure.validating = true;
        assert!(structure.validate_structure(&mut physics).is_empty());
        assert_eq!(structure.len(), 2);
        structure.validating = false;
        assert_eq!(structure.validate_structure(&mut physics).len(), 1);
    }

    #[test]
    fn recalculation_follows_physical_bonds() {
        let (mut structure, mut physics) = column(3);
        let b1 = structure.block_at(LatticeCoord::new(0, 1, 0)).unwrap().body();
        let b2 = structure.block_at(LatticeCoord::new(0, 2, 0)).unwrap().body();
        assert!(physics.sever_bond(b1, b2));

        // The graph still claims the edge until the rebuild
        assert!(structure.is_connected(LatticeCoord::new(0, 1, 0), LatticeCoord::new(0, 2, 0)));
        let detached = structure.recalculate_connections(&mut physics);

        assert_eq!(detached, vec![LatticeCoord::new(0, 2, 0), LatticeCoord::new(0, 3, 0)]);
        assert!(structure.is_connected(LatticeCoord::ORIGIN, LatticeCoord::new(0, 1, 0)));
        assert_eq!(structure.graph().edge_count(), 1);
    }

    #[test]
    fn recalculation_ignores_bonds_offsets_refuse() {
        let catalog = BlockCatalog::builtin();
        let girder = catalog.by_name("Girder").unwrap().clone();
        let (mut structure, mut physics) = column(1);

        // Girder beside the armor block: bonded physically, but a girder
        // only bonds along its own Y axis.
        let body = physics.spawn_body(BodyDesc {
            position: structure.frame().local_to_world(LatticeCoord::new(1, 1, 0)),
            rotation: Quat::IDENTITY,
            half_extents: girder.body.half_extents,
            mass: girder.body.mass,
        });
        let coord = LatticeCoord::new(1, 1, 0);
        let block = PlacedBlock::new(0, coord, LatticeRotation::IDENTITY, girder, body);
        structure.add_block(block);
        let armor_body = structure.block_at(LatticeCoord::new(0, 1, 0)).unwrap().body();
        physics.create_bond(body, armor_body, 100.0);

        let detached = structure.recalculate_connections(&mut physics);
        assert_eq!(detached, vec![LatticeCoord::new(1, 1, 0)]);
        assert!(structure.block_at(LatticeCoord::new(1, 1, 0)).is_none());
    }
}
