//! Placement Tests - Mount Rules, Orientation, Bond Agreement
//!
//! Tests for the placement engine: the build scenarios a player runs into
//! (stacking, occupied cells, refused surfaces, empty inventory) and the
//! orientation and offset-agreement rules that decide which neighbours bond.

use glam::{IVec3, Quat, Vec3};
use vehicle_forge_engine::game::blocks::{BlockCatalog, BlockType, BlockTypeId};
use vehicle_forge_engine::game::builder::{
    BlockInventory, HitTest, Inventory, LatticeRaycaster, PlacementEngine, PlacementRejection,
    PlacementRequest, RayHit,
};
use vehicle_forge_engine::game::{
    MountSurface, StructureEvent, StructureSimulation, VehicleKey, VehicleStructure,
};
use vehicle_forge_engine::physics::{BodyService, BondWorld, Ray};
use vehicle_forge_engine::world::{LatticeCoord, LatticeRotation, VehicleFrame};

const PLAYER: VehicleKey = VehicleKey::Player;

fn c(x: i32, y: i32, z: i32) -> LatticeCoord {
    LatticeCoord::new(x, y, z)
}

fn aim(sim: &StructureSimulation, cell: LatticeCoord, face: IVec3) -> Ray {
    let frame = *sim.vehicle(PLAYER).expect("player vehicle").frame();
    let center = frame.local_to_world(cell);
    let normal = frame.local_dir_to_world(face.as_vec3());
    Ray::new(center + normal * 3.0, -normal)
}

fn player_sim() -> StructureSimulation {
    let mut sim = StructureSimulation::default();
    assert!(sim.spawn_vehicle(PLAYER, VehicleFrame::default()));
    sim.drain_events();
    sim
}

fn try_place(
    sim: &mut StructureSimulation,
    name: &str,
    on: LatticeCoord,
    face: IVec3,
    twist: u8,
) -> Result<LatticeCoord, PlacementRejection> {
    let block_type = sim.block_type(name).expect("block type in catalog");
    let ray = aim(sim, on, face);
    sim.place_player_block(ray, &block_type, twist)
}

/// Inventory that reports stock but refuses every withdrawal.
struct LockedInventory;

impl Inventory for LockedInventory {
    fn count(&self, _block_type: BlockTypeId) -> u32 {
        1
    }

    fn try_consume(&mut self, _block_type: BlockTypeId, _amount: u32) -> bool {
        false
    }

    fn add(&mut self, _block_type: &BlockType, _amount: u32) -> u32 {
        0
    }
}

/// Hit test that always reports the same face, whatever the ray.
struct FixedHit(RayHit);

impl HitTest<VehicleKey> for FixedHit {
    fn hit_test(&self, _structure: &VehicleStructure<VehicleKey>, _ray: &Ray) -> Option<RayHit> {
        Some(self.0)
    }
}

// ============================================================================
// Build Scenarios
// ============================================================================

#[test]
fn test_top_placement_creates_edge_and_consumes_one_unit() {
    let mut sim = player_sim();
    let armor = sim.block_type("Armor Cube").unwrap();
    let before = sim.inventory(PLAYER).unwrap().count(armor.id);

    let coord = try_place(&mut sim, "Armor Cube", LatticeCoord::ORIGIN, IVec3::Y, 0).unwrap();

    assert_eq!(coord, c(0, 1, 0));
    let vehicle = sim.vehicle(PLAYER).unwrap();
    assert!(vehicle.is_connected(c(0, 0, 0), c(0, 1, 0)));
    assert!(vehicle.is_connected(c(0, 1, 0), c(0, 0, 0)));
    assert_eq!(sim.inventory(PLAYER).unwrap().count(armor.id), before - 1);
    assert_eq!(sim.mounted_count(PLAYER, armor.id), 1);

    let root = sim.block_at(PLAYER, c(0, 0, 0)).unwrap().body();
    let top = sim.block_at(PLAYER, c(0, 1, 0)).unwrap().body();
    assert_eq!(sim.physics().bonded_peers(top), vec![root]);

    let events = sim.drain_events();
    assert_eq!(events.len(), 1);
    assert!(matches!(
        events[0],
        StructureEvent::BlockAdded { vehicle: VehicleKey::Player, coord, .. } if coord == c(0, 1, 0)
    ));
}

#[test]
fn test_occupied_cell_changes_nothing() {
    let catalog = BlockCatalog::builtin();
    let mut physics = BondWorld::new();
    let core = catalog.core().unwrap().clone();
    let armor = catalog.by_name("Armor Cube").unwrap().clone();
    let mut structure =
        VehicleStructure::spawn(PLAYER, VehicleFrame::default(), core, &mut physics);
    let mut inventory = BlockInventory::stocked(&catalog);
    let engine = PlacementEngine::default();
    let raycaster = LatticeRaycaster::default();

    let up = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Y);
    let request = PlacementRequest::new(up, armor.clone());
    engine
        .place_block(&mut structure, &mut physics, &mut inventory, &raycaster, &request)
        .unwrap();
    structure.drain_events();

    // A stale hit on the core's top face: the cell above is already taken
    let stale = FixedHit(RayHit {
        point: Vec3::new(0.0, 0.5, 0.0),
        normal: Vec3::Y,
        distance: 4.5,
        coord: LatticeCoord::ORIGIN,
    });
    let coords_before = structure.registry().coords();
    let edges_before = structure.graph().edge_count();
    let bodies_before = physics.body_count();
    let count_before = inventory.count(armor.id);

    let result = engine.place_block(
        &mut structure,
        &mut physics,
        &mut inventory,
        &stale,
        &PlacementRequest::new(up, armor.clone()),
    );

    assert_eq!(result, Err(PlacementRejection::Occupied(c(0, 1, 0))));
    assert_eq!(structure.registry().coords(), coords_before);
    assert_eq!(structure.graph().edge_count(), edges_before);
    assert_eq!(physics.body_count(), bodies_before);
    assert_eq!(inventory.count(armor.id), count_before);
    assert!(structure.drain_events().is_empty());
}

#[test]
fn test_disagreeing_offsets_stay_unconnected() {
    // Core at origin, armor beside it, plate on the core, girder on the
    // armor. Plate and girder touch along X, but a girder only bonds along
    // its own Y axis.
    let mut sim = player_sim();
    try_place(&mut sim, "Armor Cube", LatticeCoord::ORIGIN, IVec3::X, 0).unwrap();
    try_place(&mut sim, "Plate", LatticeCoord::ORIGIN, IVec3::Y, 0).unwrap();
    try_place(&mut sim, "Girder", c(1, 0, 0), IVec3::Y, 0).unwrap();

    let vehicle = sim.vehicle(PLAYER).unwrap();
    let plate = vehicle.block_at(c(0, 1, 0)).unwrap();
    let girder = vehicle.block_at(c(1, 1, 0)).unwrap();
    assert_eq!(plate.block_type().name, "Plate");
    assert_eq!(girder.block_type().name, "Girder");

    assert!(!vehicle.is_connected(c(0, 1, 0), c(1, 1, 0)));
    assert!(!sim.physics().is_bonded(plate.body(), girder.body()));

    // Both still hang on through their own supports
    assert!(vehicle.is_connected(c(0, 1, 0), c(0, 0, 0)));
    assert!(vehicle.is_connected(c(1, 1, 0), c(1, 0, 0)));
    assert_eq!(vehicle.len(), 4);
}

#[test]
fn test_block_with_no_agreeing_neighbour_falls_off() {
    let mut sim = player_sim();
    let plate = sim.block_type("Plate").unwrap();
    try_place(&mut sim, "Plate", LatticeCoord::ORIGIN, IVec3::Y, 0).unwrap();
    sim.drain_events();

    // Plates have no +Y offset: a turret on top cannot bond
    let coord = try_place(&mut sim, "Turret", c(0, 1, 0), IVec3::Y, 0).unwrap();
    assert_eq!(coord, c(0, 2, 0));
    assert!(sim.block_at(PLAYER, coord).is_none());
    assert_eq!(sim.mounted_count(PLAYER, plate.id), 1);

    let events = sim.drain_events();
    assert!(matches!(events[0], StructureEvent::BlockAdded { .. }));
    assert!(events[1].is_detached());
}

// ============================================================================
// Rejections
// ============================================================================

#[test]
fn test_empty_inventory_rejects_before_hit_test() {
    let mut sim = player_sim();
    let turret = sim.block_type("Turret").unwrap();
    sim.inventory_mut(PLAYER).unwrap().set(&turret, 0);
    let bodies = sim.physics().body_count();

    let result = try_place(&mut sim, "Turret", LatticeCoord::ORIGIN, IVec3::Y, 0);
    assert_eq!(result, Err(PlacementRejection::EmptyInventory(turret.id)));
    assert_eq!(sim.vehicle(PLAYER).unwrap().len(), 1);
    assert_eq!(sim.physics().body_count(), bodies);

    // Even a ray that misses everything reports the empty inventory first
    let miss = Ray::new(Vec3::new(100.0, 100.0, 100.0), Vec3::Y);
    assert_eq!(
        sim.place_player_block(miss, &turret, 0),
        Err(PlacementRejection::EmptyInventory(turret.id))
    );
}

#[test]
fn test_refused_withdrawal_places_nothing() {
    let catalog = BlockCatalog::builtin();
    let mut physics = BondWorld::new();
    let core = catalog.core().unwrap().clone();
    let armor = catalog.by_name("Armor Cube").unwrap().clone();
    let mut structure =
        VehicleStructure::spawn(PLAYER, VehicleFrame::default(), core, &mut physics);
    structure.drain_events();
    let bodies_before = physics.body_count();

    let up = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Y);
    let result = PlacementEngine::default().place_block(
        &mut structure,
        &mut physics,
        &mut LockedInventory,
        &LatticeRaycaster::default(),
        &PlacementRequest::new(up, armor.clone()),
    );

    assert_eq!(result, Err(PlacementRejection::EmptyInventory(armor.id)));
    assert_eq!(structure.len(), 1, "only the root may remain");
    assert!(structure.block_at(c(0, 1, 0)).is_none());
    assert_eq!(structure.graph().edge_count(), 0);
    assert_eq!(physics.body_count(), bodies_before);
    assert_eq!(physics.bond_count(), 0);
    assert!(structure.drain_events().is_empty());
}

#[test]
fn test_missed_ray_is_no_hit() {
    let mut sim = player_sim();
    let armor = sim.block_type("Armor Cube").unwrap();
    let before = sim.inventory(PLAYER).unwrap().count(armor.id);
    let miss = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::Y);
    assert_eq!(sim.place_player_block(miss, &armor, 0), Err(PlacementRejection::NoHit));
    assert_eq!(sim.inventory(PLAYER).unwrap().count(armor.id), before);
}

#[test]
fn test_mount_flags_refuse_surfaces() {
    let mut sim = player_sim();
    assert_eq!(
        try_place(&mut sim, "Wheel", LatticeCoord::ORIGIN, IVec3::Y, 0),
        Err(PlacementRejection::SurfaceNotAllowed(MountSurface::Top))
    );
    assert_eq!(
        try_place(&mut sim, "Plate", LatticeCoord::ORIGIN, IVec3::NEG_Y, 0),
        Err(PlacementRejection::SurfaceNotAllowed(MountSurface::Bottom))
    );
    assert_eq!(
        try_place(&mut sim, "Girder", LatticeCoord::ORIGIN, IVec3::Z, 0),
        Err(PlacementRejection::SurfaceNotAllowed(MountSurface::Side))
    );
    assert_eq!(sim.vehicle(PLAYER).unwrap().len(), 1);
}

// ============================================================================
// Orientation
// ============================================================================

#[test]
fn test_side_wheel_bonds_through_its_axle() {
    let mut sim = player_sim();
    for face in [IVec3::X, IVec3::NEG_X, IVec3::Z, IVec3::NEG_Z] {
        let coord = try_place(&mut sim, "Wheel", LatticeCoord::ORIGIN, face, 0).unwrap();
        assert_eq!(coord, LatticeCoord::ORIGIN + face);
        assert!(
            sim.vehicle(PLAYER).unwrap().is_connected(coord, LatticeCoord::ORIGIN),
            "wheel on {face} face did not bond"
        );
        let wheel = sim.block_at(PLAYER, coord).unwrap();
        assert_eq!(wheel.orientation().rotate(IVec3::Z), -face);
    }
    let wheel = sim.block_type("Wheel").unwrap();
    assert_eq!(sim.mounted_count(PLAYER, wheel.id), 4);
}

#[test]
fn test_bottom_turret_hangs_upside_down() {
    let mut sim = player_sim();
    let coord = try_place(&mut sim, "Turret", LatticeCoord::ORIGIN, IVec3::NEG_Y, 0).unwrap();
    assert_eq!(coord, c(0, -1, 0));

    let turret = sim.block_at(PLAYER, coord).unwrap();
    assert_eq!(turret.orientation(), LatticeRotation::half_turn(IVec3::X));
    assert!(sim.vehicle(PLAYER).unwrap().is_connected(coord, LatticeCoord::ORIGIN));
}

#[test]
fn test_twist_only_applies_to_rotatable_types() {
    let mut sim = player_sim();
    let turret_coord = try_place(&mut sim, "Turret", LatticeCoord::ORIGIN, IVec3::Y, 3).unwrap();
    let armor_coord = try_place(&mut sim, "Armor Cube", LatticeCoord::ORIGIN, IVec3::X, 3).unwrap();

    let turret = sim.block_at(PLAYER, turret_coord).unwrap();
    assert_eq!(turret.orientation(), LatticeRotation::quarter_turns(IVec3::Y, 3));

    // Side mount, no twist: alignment and convention only
    let armor = sim.block_at(PLAYER, armor_coord).unwrap();
    let expected = LatticeRotation::half_turn(IVec3::Y)
        * LatticeRotation::from_rotation_arc(IVec3::Z, IVec3::X);
    assert_eq!(armor.orientation(), expected);
}

#[test]
fn test_rotated_vehicle_places_in_its_own_lattice() {
    let mut sim = StructureSimulation::default();
    let frame = VehicleFrame::new(
        Vec3::new(5.0, 1.0, 5.0),
        Quat::from_rotation_y(std::f32::consts::PI),
    );
    sim.spawn_vehicle(PLAYER, frame);

    let coord = try_place(&mut sim, "Armor Cube", LatticeCoord::ORIGIN, IVec3::X, 0).unwrap();
    assert_eq!(coord, c(1, 0, 0));

    // Local +X of a vehicle turned half around points along world -X
    let body = sim.block_at(PLAYER, coord).unwrap().body();
    let position = sim.physics().body_position(body).unwrap();
    assert!((position - Vec3::new(4.0, 1.0, 5.0)).length() < 1e-4, "{position:?}");
}

#[test]
fn test_cell_size_scales_placement() {
    let config = vehicle_forge_engine::game::StructureConfig {
        cell_size: 0.5,
        ..Default::default()
    };
    let mut sim = StructureSimulation::new(config, BlockCatalog::builtin()).unwrap();
    sim.spawn_vehicle(PLAYER, VehicleFrame::default());

    let coord = try_place(&mut sim, "Armor Cube", LatticeCoord::ORIGIN, IVec3::Y, 0).unwrap();
    assert_eq!(coord, c(0, 1, 0));
    let body = sim.block_at(PLAYER, coord).unwrap().body();
    let position = sim.physics().body_position(body).unwrap();
    assert!((position.y - 0.5).abs() < 1e-5);
    assert!((sim.physics().body_half_extents(body).unwrap().x - 0.25).abs() < 1e-5);
}
