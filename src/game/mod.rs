//! Game Module
//!
//! Vehicle construction on top of the engine's lattice and physics layers.
//!
//! - [`blocks`] - Block types, catalog, connection offsets, placed blocks
//! - [`vehicle`] - Registry, connection graph, integrity, fleet
//! - [`builder`] - Hit testing, placement, removal, inventory
//! - [`config`] - Tuning values loaded from JSON
//! - [`sim`] - Fixed-tick driver tying it all together

pub mod blocks;
pub mod builder;
pub mod config;
pub mod sim;
pub mod vehicle;

pub use blocks::{
    BlockCatalog, BlockRole, BlockType, BlockTypeId, MountFlags, MountSurface, PlacedBlock,
};
pub use builder::{
    BlockInventory, HitTest, Inventory, LatticeRaycaster, PlacementEngine, PlacementRejection,
    PlacementRequest, RayHit, Removal, RemovalRejection,
};
pub use config::{ConfigError, StructureConfig};
pub use sim::StructureSimulation;
pub use vehicle::{StructureEvent, VehicleFleet, VehicleId, VehicleKey, VehicleStructure};
