//! Vehicle Module
//!
//! Per-vehicle structural state: which cells hold blocks, which blocks are
//! joined, and which of them still reach the root.
//!
//! # Submodules
//!
//! - [`key`] - Vehicle identity keys
//! - [`registry`] - Coordinate → block map with single occupancy
//! - [`connections`] - Symmetric connection graph and reachability
//! - [`structure`] - One vehicle's registry, graph and frame
//! - [`integrity`] - Detachment validation and graph rebuilds
//! - [`fleet`] - All vehicles, keyed by owner
//! - [`events`] - Outbound structure events

pub mod connections;
pub mod events;
pub mod fleet;
pub mod integrity;
pub mod key;
pub mod registry;
pub mod structure;

pub use connections::ConnectionGraph;
pub use events::StructureEvent;
pub use fleet::VehicleFleet;
pub use key::{VehicleId, VehicleKey};
pub use registry::BlockRegistry;
pub use structure::VehicleStructure;
