//! Config Module
//!
//! Centralized configuration for vehicle structures.

pub mod structure_config;

pub use structure_config::{ConfigError, StructureConfig};
