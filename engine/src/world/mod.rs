//! World Module
//!
//! Lattice coordinates, axis-aligned orientations and the per-vehicle frame
//! that maps lattice cells into world space.

pub mod grid;

pub use grid::{
    AXIS_DIRECTIONS, LatticeCoord, LatticeRotation, VehicleFrame, local_to_world, snap_to_axis,
    world_to_local,
};
