//! Blocks Module
//!
//! Block definitions, their connection offsets and placed instances.
//!
//! # Submodules
//!
//! - [`block_type`] - Immutable block definitions, roles and mount flags
//! - [`offsets`] - Pre-rotation bond directions and agreement checks
//! - [`catalog`] - Built-in and JSON-loaded block catalogs
//! - [`placed`] - Block instances on a vehicle lattice

pub mod block_type;
pub mod catalog;
pub mod offsets;
pub mod placed;

pub use block_type::{BlockRole, BlockType, BlockTypeId, BodyTemplate, MountFlags, MountSurface};
pub use catalog::{BlockCatalog, BlockTypeDef};
pub use offsets::{ConnectionOffsets, offsets_agree};
pub use placed::PlacedBlock;
