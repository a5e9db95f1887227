//! Vehicle Fleet
//!
//! Owns one [`VehicleStructure`] per vehicle key and maps physics bodies
//! back to the vehicle and cell they belong to.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::events::StructureEvent;
use super::key::VehicleId;
use super::structure::VehicleStructure;
use crate::game::blocks::BlockType;
use crate::physics::{BodyHandle, BodyService};
use crate::world::{LatticeCoord, VehicleFrame};

/// All live vehicles, keyed by owner.
#[derive(Debug, Clone)]
pub struct VehicleFleet<K> {
    vehicles: BTreeMap<K, VehicleStructure<K>>,
}

impl<K: VehicleId> Default for VehicleFleet<K> {
    fn default() -> Self {
        Self {
            vehicles: BTreeMap::new(),
        }
    }
}

impl<K: VehicleId> VehicleFleet<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a vehicle with its root block.
    ///
    /// Returns false, spawning nothing, if the key is already in use.
    pub fn spawn_vehicle(
        &mut self,
        key: K,
        frame: VehicleFrame,
        root_type: Arc<BlockType>,
        physics: &mut impl BodyService,
    ) -> bool {
        if self.vehicles.contains_key(&key) {
            log::warn!("[Fleet] vehicle {key} already exists");
            return false;
        }
        let structure = VehicleStructure::spawn(key, frame, root_type, physics);
        self.vehicles.insert(key, structure);
        true
    }

    /// Destroy a vehicle and every block body it still owns.
    ///
    /// Returns the structure's undelivered events, or `None` for an unknown
    /// key.
    pub fn despawn_vehicle(
        &mut self,
        key: K,
        physics: &mut impl BodyService,
    ) -> Option<Vec<StructureEvent<K>>> {
        let mut structure = self.vehicles.remove(&key)?;
        structure.despawn(physics);
        Some(structure.drain_events())
    }

    pub fn get(&self, key: K) -> Option<&VehicleStructure<K>> {
        self.vehicles.get(&key)
    }

    pub fn get_mut(&mut self, key: K) -> Option<&mut VehicleStructure<K>> {
        self.vehicles.get_mut(&key)
    }

    pub fn contains(&self, key: K) -> bool {
        self.vehicles.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    /// Vehicle keys in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.vehicles.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VehicleStructure<K>> {
        self.vehicles.values()
    }

    /// Vehicle and cell owning a body. Free (detached) bodies have no owner.
    pub fn owner_of_body(&self, body: BodyHandle) -> Option<(K, LatticeCoord)> {
        self.vehicles
            .iter()
            .find_map(|(key, s)| s.coord_of_body(body).map(|coord| (*key, coord)))
    }

    /// Drain every vehicle's events, grouped by vehicle in key order.
    pub fn drain_events(&mut self) -> Vec<StructureEvent<K>> {
        self.vehicles
            .values_mut()
            .flat_map(VehicleStructure::drain_events)
            .collect()
    }
}
