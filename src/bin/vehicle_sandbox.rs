//! Vehicle Sandbox - Headless Structure Demo
//!
//! Run with: `cargo run --bin vehicle_sandbox [config.json] [blocks.json]`
//!
//! Builds a player vehicle and an AI vehicle block by block, overloads a
//! bond in each, and runs the fixed tick until the torn-off parts have
//! settled. Set `RUST_LOG=debug` for the full structural trace.

use std::path::Path;
use std::process::ExitCode;

use glam::{IVec3, Quat, Vec3};

use vehicle_forge_engine::game::{
    BlockCatalog, ConfigError, StructureConfig, StructureEvent, StructureSimulation, VehicleKey,
};
use vehicle_forge_engine::physics::{BodyService, Ray};
use vehicle_forge_engine::world::{LatticeCoord, VehicleFrame};

/// One scripted build step: block name, target face (cell + normal), twist.
struct BuildStep {
    block: &'static str,
    on: LatticeCoord,
    face: IVec3,
    twist: u8,
}

const fn step(block: &'static str, on: (i32, i32, i32), face: IVec3, twist: u8) -> BuildStep {
    BuildStep {
        block,
        on: LatticeCoord::new(on.0, on.1, on.2),
        face,
        twist,
    }
}

/// Hull, tower and running gear shared by both vehicles.
const BUILD_SCRIPT: [BuildStep; 9] = [
    step("Armor Cube", (0, 0, 0), IVec3::X, 0),
    step("Armor Cube", (0, 0, 0), IVec3::NEG_X, 0),
    step("Armor Cube", (0, 0, 0), IVec3::Y, 0),
    step("Girder", (0, 1, 0), IVec3::Y, 0),
    step("Turret", (0, 2, 0), IVec3::Y, 1),
    step("Plate", (1, 0, 0), IVec3::Y, 0),
    step("Wheel", (1, 0, 0), IVec3::X, 0),
    step("Wheel", (-1, 0, 0), IVec3::NEG_X, 0),
    // Girders are vertical-mount only: refused
    step("Girder", (-1, 0, 0), IVec3::NEG_Z, 0),
];

/// Ray aimed straight at one face of a vehicle cell, from a few cells out.
fn aim_at_face(frame: &VehicleFrame, cell: LatticeCoord, face: IVec3) -> Ray {
    let center = frame.local_to_world(cell);
    let normal = frame.local_dir_to_world(face.as_vec3());
    Ray::new(center + normal * (3.0 * frame.cell_size), -normal)
}

fn load_inputs() -> Result<(StructureConfig, BlockCatalog), ConfigError> {
    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => StructureConfig::load(Path::new(&path))?,
        None => StructureConfig::default(),
    };
    let catalog = match args.next() {
        Some(path) => BlockCatalog::load(Path::new(&path))?,
        None => BlockCatalog::builtin(),
    };
    Ok((config, catalog))
}

fn build_vehicle(sim: &mut StructureSimulation, key: VehicleKey) {
    let Some(frame) = sim.vehicle(key).map(|v| *v.frame()) else {
        return;
    };
    for s in &BUILD_SCRIPT {
        let Some(block_type) = sim.block_type(s.block) else {
            log::warn!("[Sandbox] catalog has no '{}'", s.block);
            continue;
        };
        let ray = aim_at_face(&frame, s.on, s.face);
        // Rejections are logged by the placement engine
        let _ = sim.place_block(key, ray, &block_type, s.twist);
    }
}

/// Overload the bond between the tower base and the girder above it.
fn overload_tower(sim: &mut StructureSimulation, key: VehicleKey) {
    let base = sim.block_at(key, LatticeCoord::new(0, 1, 0)).map(|b| b.body());
    let girder = sim.block_at(key, LatticeCoord::new(0, 2, 0)).map(|b| b.body());
    if let (Some(base), Some(girder)) = (base, girder) {
        let broke = sim.physics_mut().apply_bond_load(base, girder, 1.0e6);
        log::info!("[Sandbox] {key}: tower bond overloaded, broke = {broke}");
    }
}

fn report(sim: &mut StructureSimulation) {
    for event in sim.drain_events() {
        if let StructureEvent::Detached { vehicle, former_coord, block } = &event {
            let resting = sim.physics().body_position(block.body());
            log::info!(
                "[Sandbox] {vehicle}: '{}' from {former_coord} now free at {:?}",
                block.block_type().name,
                resting
            );
        }
    }
    for vehicle in sim.fleet().iter() {
        log::info!(
            "[Sandbox] {}: {} block(s), {} connection(s)",
            vehicle.key(),
            vehicle.len(),
            vehicle.graph().edge_count()
        );
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let (config, catalog) = match load_inputs() {
        Ok(inputs) => inputs,
        Err(e) => {
            log::error!("[Sandbox] failed to load inputs: {e}");
            return ExitCode::FAILURE;
        }
    };
    let mut sim = match StructureSimulation::new(config, catalog) {
        Ok(sim) => sim,
        Err(e) => {
            log::error!("[Sandbox] invalid setup: {e}");
            return ExitCode::FAILURE;
        }
    };

    let player_frame = VehicleFrame::new(Vec3::new(0.0, 2.0, 0.0), Quat::IDENTITY);
    sim.spawn_vehicle(VehicleKey::Player, player_frame);
    sim.spawn_vehicle(
        VehicleKey::Ai(1),
        VehicleFrame::new(
            Vec3::new(20.0, 2.0, 0.0),
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
        ),
    );

    for key in [VehicleKey::Player, VehicleKey::Ai(1)] {
        build_vehicle(&mut sim, key);
    }
    report(&mut sim);

    for key in [VehicleKey::Player, VehicleKey::Ai(1)] {
        overload_tower(&mut sim, key);
    }

    // Two seconds at 60 fps: the rebuild runs on the second fixed tick,
    // the rest lets the debris fall
    let frame_dt = 1.0 / 60.0;
    for _ in 0..120 {
        sim.update(frame_dt);
    }
    report(&mut sim);

    log::info!("[Sandbox] done after {} fixed ticks", sim.tick());
    ExitCode::SUCCESS
}
