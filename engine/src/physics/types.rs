//! Physics types
//!
//! Math types re-exported from glam plus the handles and notifications the
//! body service hands out.

pub use glam::{Quat, Vec3};

/// Opaque identity of a rigid body owned by a [`BodyService`](super::BodyService).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub u64);

impl std::fmt::Display for BodyHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "body#{}", self.0)
    }
}

/// Spawn parameters for a block body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDesc {
    pub position: Vec3,
    pub rotation: Quat,
    pub half_extents: Vec3,
    pub mass: f32,
}

/// A bond between two bodies broke under load.
///
/// Only force-driven breaks produce this; bonds removed on purpose
/// (despawn, detachment) do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BondSevered {
    pub a: BodyHandle,
    pub b: BodyHandle,
}
