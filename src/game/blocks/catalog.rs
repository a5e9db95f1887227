//! Block Catalog
//!
//! Loads block definitions, either the built-in set or a JSON document,
//! and hands out shared `Arc<BlockType>` references.
//!
//! JSON layout:
//!
//! ```text
//! { "blocks": [
//!     { "name": "Armor Cube", "role": "structural",
//!       "offsets": [[1,0,0],[-1,0,0],[0,1,0],[0,-1,0],[0,0,1],[0,0,-1]],
//!       "mount": { "top": true, "bottom": true, "side": true },
//!       "cost": 10, "max_stack": 99 }
//! ] }
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use glam::{IVec3, Vec3};
use serde::{Deserialize, Serialize};

use super::block_type::{BlockRole, BlockType, BlockTypeId, BodyTemplate, MountFlags};
use super::offsets::ConnectionOffsets;
use crate::game::config::ConfigError;
use crate::world::AXIS_DIRECTIONS;

fn default_half_extents() -> [f32; 3] {
    [0.5, 0.5, 0.5]
}

fn default_mass() -> f32 {
    10.0
}

fn default_bond_strength() -> f32 {
    500.0
}

fn default_attach_direction() -> [i32; 3] {
    [0, 0, 1]
}

fn default_max_health() -> f32 {
    100.0
}

fn default_max_stack() -> u32 {
    99
}

/// Serialized form of a [`BlockType`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockTypeDef {
    pub name: String,
    #[serde(default)]
    pub role: BlockRole,
    #[serde(default = "default_half_extents")]
    pub half_extents: [f32; 3],
    #[serde(default = "default_mass")]
    pub mass: f32,
    #[serde(default = "default_bond_strength")]
    pub bond_strength: f32,
    pub offsets: Vec<[i32; 3]>,
    #[serde(default)]
    pub mount: MountFlags,
    #[serde(default)]
    pub rotatable: bool,
    #[serde(default = "default_attach_direction")]
    pub attach_direction: [i32; 3],
    #[serde(default)]
    pub cost: u32,
    #[serde(default)]
    pub recycle_value: u32,
    #[serde(default = "default_max_health")]
    pub max_health: f32,
    #[serde(default = "default_max_stack")]
    pub max_stack: u32,
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    blocks: Vec<BlockTypeDef>,
}

impl BlockTypeDef {
    fn into_block_type(self, id: BlockTypeId) -> Result<BlockType, ConfigError> {
        let attach = IVec3::from_array(self.attach_direction);
        if !AXIS_DIRECTIONS.contains(&attach) {
            return Err(ConfigError::Invalid(format!(
                "block '{}': attach_direction {:?} is not a unit axis",
                self.name, self.attach_direction
            )));
        }
        if self.offsets.iter().any(|o| *o == [0, 0, 0]) {
            return Err(ConfigError::Invalid(format!(
                "block '{}': zero connection offset",
                self.name
            )));
        }
        if self.half_extents.iter().any(|h| !(*h > 0.0)) {
            return Err(ConfigError::Invalid(format!(
                "block '{}': half_extents must be positive",
                self.name
            )));
        }

        Ok(BlockType {
            id,
            name: self.name,
            role: self.role,
            body: BodyTemplate {
                half_extents: Vec3::from_array(self.half_extents),
                mass: self.mass,
                bond_strength: self.bond_strength,
            },
            offsets: ConnectionOffsets::new(self.offsets.into_iter().map(IVec3::from_array)),
            mounting: self.mount,
            rotatable: self.rotatable,
            attach_direction: attach,
            cost: self.cost,
            recycle_value: self.recycle_value,
            max_health: self.max_health,
            max_stack: self.max_stack,
        })
    }
}

/// All block types known to the game.
#[derive(Debug, Clone, Default)]
pub struct BlockCatalog {
    types: Vec<Arc<BlockType>>,
    by_name: HashMap<String, BlockTypeId>,
}

impl BlockCatalog {
    /// Build from definitions. Names must be unique.
    pub fn from_defs(defs: Vec<BlockTypeDef>) -> Result<Self, ConfigError> {
        let mut catalog = Self::default();
        for def in defs {
            if catalog.by_name.contains_key(&def.name) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate block name '{}'",
                    def.name
                )));
            }
            let index = u16::try_from(catalog.types.len())
                .map_err(|_| ConfigError::Invalid("too many block types".to_string()))?;
            let block_type = def.into_block_type(BlockTypeId(index))?;
            catalog.by_name.insert(block_type.name.clone(), block_type.id);
            catalog.types.push(Arc::new(block_type));
        }
        log::debug!("[BlockCatalog] loaded {} block types", catalog.types.len());
        Ok(catalog)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let doc: CatalogDocument = serde_json::from_str(json)?;
        Self::from_defs(doc.blocks)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Built-in vehicle parts.
    pub fn builtin() -> Self {
        let faces: Vec<[i32; 3]> = AXIS_DIRECTIONS.iter().map(|d| d.to_array()).collect();
        let defs = vec![
            BlockTypeDef {
                name: "Core".to_string(),
                role: BlockRole::Core,
                half_extents: default_half_extents(),
                mass: 40.0,
                bond_strength: 2000.0,
                offsets: faces.clone(),
                mount: MountFlags::NONE,
                rotatable: false,
                attach_direction: default_attach_direction(),
                cost: 0,
                recycle_value: 0,
                max_health: 500.0,
                max_stack: 1,
            },
            BlockTypeDef {
                name: "Armor Cube".to_string(),
                role: BlockRole::Structural,
                half_extents: default_half_extents(),
                mass: 20.0,
                bond_strength: 800.0,
                offsets: faces,
                mount: MountFlags::ANY,
                rotatable: false,
                attach_direction: default_attach_direction(),
                cost: 10,
                recycle_value: 8,
                max_health: 150.0,
                max_stack: 99,
            },
            // Vertical beam: bonds only along its own Y axis
            BlockTypeDef {
                name: "Girder".to_string(),
                role: BlockRole::Structural,
                half_extents: [0.2, 0.5, 0.2],
                mass: 8.0,
                bond_strength: 1200.0,
                offsets: vec![[0, 1, 0], [0, -1, 0]],
                mount: MountFlags::VERTICAL,
                rotatable: false,
                attach_direction: default_attach_direction(),
                cost: 6,
                recycle_value: 4,
                max_health: 90.0,
                max_stack: 99,
            },
            // Deck plate: nothing can stack on top of it
            BlockTypeDef {
                name: "Plate".to_string(),
                role: BlockRole::Structural,
                half_extents: [0.5, 0.1, 0.5],
                mass: 5.0,
                bond_strength: 300.0,
                offsets: vec![[0, -1, 0], [1, 0, 0], [-1, 0, 0], [0, 0, 1], [0, 0, -1]],
                mount: MountFlags::TOP_ONLY,
                rotatable: false,
                attach_direction: default_attach_direction(),
                cost: 4,
                recycle_value: 3,
                max_health: 60.0,
                max_stack: 99,
            },
            BlockTypeDef {
                name: "Wheel".to_string(),
                role: BlockRole::Drive,
                half_extents: [0.5, 0.5, 0.25],
                mass: 12.0,
                bond_strength: 400.0,
                offsets: vec![[0, 0, 1]],
                mount: MountFlags::SIDE_ONLY,
                rotatable: true,
                attach_direction: [0, 0, 1],
                cost: 25,
                recycle_value: 20,
                max_health: 120.0,
                max_stack: 8,
            },
            BlockTypeDef {
                name: "Turret".to_string(),
                role: BlockRole::Weapon,
                half_extents: [0.45, 0.5, 0.45],
                mass: 30.0,
                bond_strength: 600.0,
                offsets: vec![[0, -1, 0]],
                mount: MountFlags::VERTICAL,
                rotatable: true,
                attach_direction: default_attach_direction(),
                cost: 60,
                recycle_value: 45,
                max_health: 200.0,
                max_stack: 4,
            },
        ];

        match Self::from_defs(defs) {
            Ok(catalog) => catalog,
            Err(e) => {
                log::error!("[BlockCatalog] built-in definitions rejected: {e}");
                Self::default()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn get(&self, id: BlockTypeId) -> Option<&Arc<BlockType>> {
        self.types.get(id.0 as usize)
    }

    pub fn by_name(&self, name: &str) -> Option<&Arc<BlockType>> {
        self.by_name.get(name).and_then(|id| self.get(*id))
    }

    /// First type with the core role, used for vehicle roots.
    pub fn core(&self) -> Option<&Arc<BlockType>> {
        self.types.iter().find(|t| t.role == BlockRole::Core)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<BlockType>> {
        self.types.iter()
    }
}
