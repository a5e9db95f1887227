//! Vehicle Forge Engine Library
//!
//! Grid-indexed structural integrity for block-built vehicles. Blocks snap
//! to a per-vehicle integer lattice, bond to their neighbours through
//! breakable physical joints, and fall off as free bodies once nothing
//! connects them to the vehicle's core.
//!
//! # Modules
//!
//! - [`world`] - Lattice coordinates, orientations and vehicle frames
//! - [`physics`] - Body/bond service and ray casting
//! - [`game`] - Blocks, vehicles, builder and the fixed-tick simulation
//!
//! # Example
//!
//! ```ignore
//! use vehicle_forge_engine::game::{StructureSimulation, VehicleKey};
//! use vehicle_forge_engine::physics::{Ray, Vec3};
//! use vehicle_forge_engine::world::VehicleFrame;
//!
//! let mut sim = StructureSimulation::default();
//! sim.spawn_vehicle(VehicleKey::Player, VehicleFrame::default());
//!
//! let armor = sim.block_type("Armor Cube").unwrap();
//! let aim = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::NEG_Y);
//! sim.place_player_block(aim, &armor, 0)?;
//!
//! sim.update(1.0 / 60.0);
//! for event in sim.drain_events() {
//!     // hand to UI / audio / AI
//! }
//! ```

pub mod physics;
pub mod world;

// Game-specific modules (located in src/game/ directory)
#[path = "../../src/game/mod.rs"]
pub mod game;

pub use world::{LatticeCoord, LatticeRotation, VehicleFrame};

static_assertions::assert_eq_size!(world::LatticeCoord, [i32; 3]);
static_assertions::assert_eq_size!(physics::BodyHandle, u64);
static_assertions::assert_impl_all!(game::StructureSimulation: Send, Sync);
static_assertions::assert_impl_all!(game::VehicleStructure<game::VehicleKey>: Send, Sync, Clone);
static_assertions::assert_impl_all!(game::PlacementRejection: std::error::Error, Send, Sync);
