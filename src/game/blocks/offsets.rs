//! Connection Offsets
//!
//! Each block type lists the lattice directions through which it may bond,
//! expressed in the block's own frame before rotation. Two neighbours bond
//! only when both of them list the direction pointing at the other.

use glam::IVec3;

use crate::world::{AXIS_DIRECTIONS, LatticeRotation};

/// Set of pre-rotation bond directions of a block type.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConnectionOffsets {
    offsets: Vec<IVec3>,
}

impl ConnectionOffsets {
    /// Build from a list, dropping zero and duplicate entries.
    pub fn new(offsets: impl IntoIterator<Item = IVec3>) -> Self {
        let mut out: Vec<IVec3> = Vec::new();
        for offset in offsets {
            if offset != IVec3::ZERO && !out.contains(&offset) {
                out.push(offset);
            }
        }
        Self { offsets: out }
    }

    /// Bonds through all six faces.
    pub fn all_faces() -> Self {
        Self::new(AXIS_DIRECTIONS)
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = IVec3> + '_ {
        self.offsets.iter().copied()
    }

    /// Contains `offset` in the block's own frame.
    pub fn contains(&self, offset: IVec3) -> bool {
        self.offsets.contains(&offset)
    }

    /// Offsets rotated into the vehicle frame by a block orientation.
    pub fn rotated(&self, rotation: LatticeRotation) -> impl Iterator<Item = IVec3> + '_ {
        self.offsets.iter().map(move |o| rotation.rotate(*o))
    }

    /// Whether a block with this offset set and orientation may bond along
    /// `direction`, given in the vehicle frame.
    pub fn accepts(&self, rotation: LatticeRotation, direction: IVec3) -> bool {
        self.contains(rotation.inverse().rotate(direction))
    }
}

/// Bidirectional agreement check for two neighbours.
///
/// `direction` points from block A to block B in the vehicle frame.
pub fn offsets_agree(
    a_offsets: &ConnectionOffsets,
    a_rotation: LatticeRotation,
    b_offsets: &ConnectionOffsets,
    b_rotation: LatticeRotation,
    direction: IVec3,
) -> bool {
    a_offsets.accepts(a_rotation, direction) && b_offsets.accepts(b_rotation, -direction)
}
