//! Block Types
//!
//! Immutable block definitions. Created once when the catalog loads and
//! shared by `Arc` between every placed instance.

use glam::{IVec3, Vec3};
use serde::{Deserialize, Serialize};

use super::offsets::ConnectionOffsets;

/// Catalog index of a block type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockTypeId(pub u16);

/// What a block does once mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockRole {
    /// Vehicle root (command/core block)
    Core,
    /// Passive hull piece
    #[default]
    Structural,
    /// Needs vehicle membership to aim and fire
    Weapon,
    /// Needs vehicle membership to drive
    Drive,
}

impl BlockRole {
    /// Roles with behaviour that must stop when the block leaves its vehicle.
    pub fn needs_vehicle(self) -> bool {
        matches!(self, BlockRole::Weapon | BlockRole::Drive)
    }
}

/// Class of the surface a block is mounted on, relative to vehicle up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MountSurface {
    Top,
    Bottom,
    Side,
}

impl std::fmt::Display for MountSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MountSurface::Top => "top",
            MountSurface::Bottom => "bottom",
            MountSurface::Side => "side",
        };
        f.write_str(name)
    }
}

/// Surfaces a block type may be mounted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountFlags {
    #[serde(default)]
    pub top: bool,
    #[serde(default)]
    pub bottom: bool,
    #[serde(default)]
    pub side: bool,
}

impl MountFlags {
    pub const ANY: Self = Self { top: true, bottom: true, side: true };
    pub const NONE: Self = Self { top: false, bottom: false, side: false };
    pub const TOP_ONLY: Self = Self { top: true, bottom: false, side: false };
    pub const SIDE_ONLY: Self = Self { top: false, bottom: false, side: true };
    pub const VERTICAL: Self = Self { top: true, bottom: true, side: false };

    pub fn allows(&self, surface: MountSurface) -> bool {
        match surface {
            MountSurface::Top => self.top,
            MountSurface::Bottom => self.bottom,
            MountSurface::Side => self.side,
        }
    }
}

impl Default for MountFlags {
    fn default() -> Self {
        Self::ANY
    }
}

/// Physical body template of a block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyTemplate {
    pub half_extents: Vec3,
    /// Mass (kg)
    pub mass: f32,
    /// Load a bond to this block survives before breaking
    pub bond_strength: f32,
}

impl Default for BodyTemplate {
    fn default() -> Self {
        Self {
            half_extents: Vec3::splat(0.5),
            mass: 10.0,
            bond_strength: 500.0,
        }
    }
}

/// Immutable block definition.
#[derive(Debug, Clone)]
pub struct BlockType {
    pub id: BlockTypeId,
    /// Display name, unique within a catalog
    pub name: String,
    pub role: BlockRole,
    pub body: BodyTemplate,
    /// Bond directions before rotation
    pub offsets: ConnectionOffsets,
    pub mounting: MountFlags,
    /// Whether the operator may twist the block in quarter turns
    pub rotatable: bool,
    /// Local direction aligned to the surface normal on side mounts
    pub attach_direction: IVec3,
    pub cost: u32,
    pub recycle_value: u32,
    pub max_health: f32,
    /// Inventory cap for this type
    pub max_stack: u32,
}

impl BlockType {
    /// Bond strength between two block types: the weaker side wins.
    pub fn bond_strength_with(&self, other: &BlockType) -> f32 {
        self.body.bond_strength.min(other.body.bond_strength)
    }
}

impl PartialEq for BlockType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.name == other.name
    }
}

impl Eq for BlockType {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mount_flags_gate_surfaces() {
        assert!(MountFlags::TOP_ONLY.allows(MountSurface::Top));
        assert!(!MountFlags::TOP_ONLY.allows(MountSurface::Side));
        assert!(MountFlags::SIDE_ONLY.allows(MountSurface::Side));
        assert!(!MountFlags::NONE.allows(MountSurface::Bottom));
    }

    #[test]
    fn only_active_roles_need_vehicle() {
        assert!(BlockRole::Weapon.needs_vehicle());
        assert!(BlockRole::Drive.needs_vehicle());
        assert!(!BlockRole::Structural.needs_vehicle());
        assert!(!BlockRole::Core.needs_vehicle());
    }
}
