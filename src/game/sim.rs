//! Structure Simulation
//!
//! Composes the fleet, the bond world, per-vehicle inventories and the
//! build engines, and drives them on a fixed tick.
//!
//! # Tick order
//! 1. Connection rebuilds that fell due this tick, one per vehicle
//! 2. Bonds severed since the last tick: schedule a rebuild of the owning
//!    vehicle `recalc_delay_ticks` later (several breaks coalesce)
//! 3. Free-body integration for detached blocks
//! 4. Outbound events collected from every vehicle

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::game::blocks::{BlockCatalog, BlockType, BlockTypeId, PlacedBlock};
use crate::game::builder::{
    BlockInventory, Inventory, LatticeRaycaster, PlacementEngine, PlacementRejection,
    PlacementRequest, Removal, RemovalRejection, remove_block,
};
use crate::game::config::{ConfigError, StructureConfig};
use crate::game::vehicle::{StructureEvent, VehicleFleet, VehicleKey, VehicleStructure};
use crate::physics::{BodyHandle, BodyService, BondWorld, Ray};
use crate::world::{LatticeCoord, VehicleFrame};

/// Headless structural simulation for the player and AI vehicles.
#[derive(Debug)]
pub struct StructureSimulation {
    config: StructureConfig,
    catalog: BlockCatalog,
    fleet: VehicleFleet<VehicleKey>,
    physics: BondWorld,
    inventories: BTreeMap<VehicleKey, BlockInventory>,
    placement: PlacementEngine,
    raycaster: LatticeRaycaster,
    /// Vehicle → tick at which its connection rebuild runs
    recalc_jobs: BTreeMap<VehicleKey, u64>,
    /// Detached blocks still lying around as free bodies
    debris: HashMap<BodyHandle, Arc<BlockType>>,
    events: Vec<StructureEvent<VehicleKey>>,
    tick: u64,
    accumulator_s: f32,
}

impl Default for StructureSimulation {
    fn default() -> Self {
        Self::build(StructureConfig::default(), BlockCatalog::builtin())
    }
}

impl StructureSimulation {
    /// Create a simulation after validating the configuration.
    pub fn new(config: StructureConfig, catalog: BlockCatalog) -> Result<Self, ConfigError> {
        config.validate()?;
        if catalog.core().is_none() {
            return Err(ConfigError::Invalid(
                "block catalog has no core block type".to_string(),
            ));
        }
        Ok(Self::build(config, catalog))
    }

    fn build(config: StructureConfig, catalog: BlockCatalog) -> Self {
        Self {
            placement: PlacementEngine::from_config(&config),
            raycaster: LatticeRaycaster::new(config.max_ray_distance),
            config,
            catalog,
            fleet: VehicleFleet::new(),
            physics: BondWorld::new(),
            inventories: BTreeMap::new(),
            recalc_jobs: BTreeMap::new(),
            debris: HashMap::new(),
            events: Vec::new(),
            tick: 0,
            accumulator_s: 0.0,
        }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn config(&self) -> &StructureConfig {
        &self.config
    }

    pub fn catalog(&self) -> &BlockCatalog {
        &self.catalog
    }

    /// Catalog lookup by display name.
    pub fn block_type(&self, name: &str) -> Option<Arc<BlockType>> {
        self.catalog.by_name(name).cloned()
    }

    pub fn fleet(&self) -> &VehicleFleet<VehicleKey> {
        &self.fleet
    }

    pub fn vehicle(&self, key: VehicleKey) -> Option<&VehicleStructure<VehicleKey>> {
        self.fleet.get(key)
    }

    pub fn physics(&self) -> &BondWorld {
        &self.physics
    }

    /// Direct access for external forces (bond loads, breaks).
    pub fn physics_mut(&mut self) -> &mut BondWorld {
        &mut self.physics
    }

    pub fn inventory(&self, key: VehicleKey) -> Option<&BlockInventory> {
        self.inventories.get(&key)
    }

    pub fn inventory_mut(&mut self, key: VehicleKey) -> Option<&mut BlockInventory> {
        self.inventories.get_mut(&key)
    }

    /// Fixed ticks run so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn pending_recalculations(&self) -> usize {
        self.recalc_jobs.len()
    }

    pub fn debris_count(&self) -> usize {
        self.debris.len()
    }

    /// `TryGetBlockAt` on a vehicle.
    pub fn block_at(
        &self,
        key: VehicleKey,
        coord: LatticeCoord,
    ) -> Option<&PlacedBlock<VehicleKey>> {
        self.fleet.get(key)?.block_at(coord)
    }

    /// Attached blocks of a type on a vehicle.
    pub fn mounted_count(&self, key: VehicleKey, block_type: BlockTypeId) -> usize {
        self.fleet
            .get(key)
            .map_or(0, |vehicle| vehicle.mounted_count(block_type))
    }

    // ========================================================================
    // VEHICLES
    // ========================================================================

    /// Spawn a vehicle around a fresh core block with a fully stocked
    /// inventory. The frame's cell size is taken from the configuration.
    pub fn spawn_vehicle(&mut self, key: VehicleKey, frame: VehicleFrame) -> bool {
        let Some(core) = self.catalog.core().cloned() else {
            log::warn!("[Simulation] no core block type, cannot spawn {key}");
            return false;
        };
        let frame = frame.with_cell_size(self.config.cell_size);
        if !self.fleet.spawn_vehicle(key, frame, core, &mut self.physics) {
            return false;
        }
        self.inventories
            .insert(key, BlockInventory::stocked(&self.catalog));
        self.collect_events();
        true
    }

    /// Destroy a vehicle and all of its blocks.
    pub fn despawn_vehicle(&mut self, key: VehicleKey) -> bool {
        let Some(undelivered) = self.fleet.despawn_vehicle(key, &mut self.physics) else {
            return false;
        };
        self.record_events(undelivered);
        self.recalc_jobs.remove(&key);
        self.inventories.remove(&key);
        true
    }

    // ========================================================================
    // BUILD ACTIONS
    // ========================================================================

    /// Place a block on a vehicle where `ray` strikes it.
    ///
    /// An unknown vehicle is reported as [`PlacementRejection::NoHit`].
    pub fn place_block(
        &mut self,
        key: VehicleKey,
        ray: Ray,
        block_type: &Arc<BlockType>,
        twist: u8,
    ) -> Result<LatticeCoord, PlacementRejection> {
        let (Some(structure), Some(inventory)) =
            (self.fleet.get_mut(key), self.inventories.get_mut(&key))
        else {
            return Err(PlacementRejection::NoHit);
        };
        let request = PlacementRequest::new(ray, block_type.clone()).with_twist(twist);
        let result = self.placement.place_block(
            structure,
            &mut self.physics,
            inventory,
            &self.raycaster,
            &request,
        );
        self.collect_events();
        result
    }

    pub fn place_player_block(
        &mut self,
        ray: Ray,
        block_type: &Arc<BlockType>,
        twist: u8,
    ) -> Result<LatticeCoord, PlacementRejection> {
        self.place_block(VehicleKey::Player, ray, block_type, twist)
    }

    pub fn place_ai_block(
        &mut self,
        ai: u32,
        ray: Ray,
        block_type: &Arc<BlockType>,
        twist: u8,
    ) -> Result<LatticeCoord, PlacementRejection> {
        self.place_block(VehicleKey::Ai(ai), ray, block_type, twist)
    }

    /// Remove the block under `ray` from a vehicle.
    pub fn remove_block(&mut self, key: VehicleKey, ray: Ray) -> Result<Removal, RemovalRejection> {
        let (Some(structure), Some(inventory)) =
            (self.fleet.get_mut(key), self.inventories.get_mut(&key))
        else {
            return Err(RemovalRejection::NoHit);
        };
        let result = remove_block(structure, &mut self.physics, inventory, &self.raycaster, &ray);
        self.collect_events();
        result
    }

    /// Collect a detached block lying around as a free body into a
    /// vehicle's inventory. Returns false for unknown bodies.
    pub fn pick_up_debris(&mut self, key: VehicleKey, body: BodyHandle) -> bool {
        let Some(inventory) = self.inventories.get_mut(&key) else {
            return false;
        };
        let Some(block_type) = self.debris.remove(&body) else {
            return false;
        };
        let added = inventory.add(&block_type, 1);
        self.physics.despawn_body(body);
        log::info!(
            "[Simulation] {key} picked up '{}' ({added} added)",
            block_type.name
        );
        true
    }

    // ========================================================================
    // TICK
    // ========================================================================

    /// Advance by frame time, running every fixed tick that fell due.
    ///
    /// Backlog beyond `max_ticks_per_frame` is dropped. Returns the number
    /// of fixed ticks run.
    pub fn update(&mut self, delta: f32) -> u32 {
        let step = self.config.fixed_dt();
        let max_ticks = self.config.max_ticks_per_frame;
        self.accumulator_s += delta.max(0.0);

        let mut ticks = 0;
        while self.accumulator_s >= step && ticks < max_ticks {
            self.fixed_tick();
            self.accumulator_s -= step;
            ticks += 1;
        }
        if ticks == max_ticks {
            self.accumulator_s = self.accumulator_s.min(step);
        }
        ticks
    }

    /// Run one fixed tick.
    pub fn fixed_tick(&mut self) {
        self.tick += 1;

        self.process_recalculations();

        for severed in self.physics.drain_severed() {
            for body in [severed.a, severed.b] {
                if let Some((key, _)) = self.fleet.owner_of_body(body) {
                    self.schedule_recalculation(key);
                }
            }
        }

        self.physics.step(self.config.fixed_dt());
        self.collect_events();
    }

    /// Breaks on a vehicle with a rebuild already pending coalesce into it.
    /// The rebuild moves to the later due tick, so every break gets the full
    /// settle delay.
    fn schedule_recalculation(&mut self, key: VehicleKey) {
        let due = self.tick + self.config.recalc_delay_ticks;
        let job = self.recalc_jobs.entry(key).or_insert(due);
        *job = (*job).max(due);
        let scheduled = *job;
        log::debug!("[Simulation] {key} connection rebuild at tick {scheduled}");
    }

    fn process_recalculations(&mut self) {
        let tick = self.tick;
        let due: Vec<VehicleKey> = self
            .recalc_jobs
            .iter()
            .filter(|(_, due)| **due <= tick)
            .map(|(key, _)| *key)
            .collect();

        for key in due {
            self.recalc_jobs.remove(&key);
            if let Some(structure) = self.fleet.get_mut(key) {
                structure.recalculate_connections(&mut self.physics);
            }
        }
    }

    // ========================================================================
    // EVENTS
    // ========================================================================

    fn collect_events(&mut self) {
        let events = self.fleet.drain_events();
        self.record_events(events);
    }

    fn record_events(&mut self, events: Vec<StructureEvent<VehicleKey>>) {
        for event in &events {
            if let StructureEvent::Detached { block, .. } = event {
                self.debris.insert(block.body(), block.block_type().clone());
            }
        }
        self.events.extend(events);
    }

    /// Take every event raised since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<StructureEvent<VehicleKey>> {
        std::mem::take(&mut self.events)
    }
}
