//! Builder Module
//!
//! Operator-facing build actions on a vehicle: aim, place, remove.
//!
//! The player's builder and AI controllers drive the same functions; only
//! the vehicle key and inventory differ.

pub mod inventory;
pub mod placement;
pub mod raycast;
pub mod removal;

pub use inventory::{BlockInventory, Inventory};
pub use placement::{
    PlacementEngine, PlacementRejection, PlacementRequest, operator_twist, placement_orientation,
    side_convention, surface_alignment,
};
pub use raycast::{HitTest, LatticeRaycaster, RayHit};
pub use removal::{Removal, RemovalRejection, remove_block, remove_block_at};
