//! Block Inventory
//!
//! Per-type block counts the builder draws from when placing and refunds
//! into when removing. Amounts never exceed the type's `max_stack`.

use std::collections::HashMap;

use crate::game::blocks::{BlockCatalog, BlockRole, BlockType, BlockTypeId};

/// Inventory collaborator used by the placement and removal engines.
pub trait Inventory {
    /// Units of a block type on hand.
    fn count(&self, block_type: BlockTypeId) -> u32;

    /// Take `amount` units. Returns false, taking nothing, if short.
    fn try_consume(&mut self, block_type: BlockTypeId, amount: u32) -> bool;

    /// Add up to `amount` units, capped at the type's max stack.
    /// Returns the amount actually added.
    fn add(&mut self, block_type: &BlockType, amount: u32) -> u32;
}

/// Block counts keyed by type.
#[derive(Debug, Clone, Default)]
pub struct BlockInventory {
    amounts: HashMap<BlockTypeId, u32>,
}

impl BlockInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full stack of every catalog type except the core.
    pub fn stocked(catalog: &BlockCatalog) -> Self {
        let mut inventory = Self::new();
        for block_type in catalog.iter() {
            if block_type.role != BlockRole::Core {
                inventory.set(block_type, block_type.max_stack);
            }
        }
        inventory
    }

    /// Set the amount of a type, clamped to its max stack.
    pub fn set(&mut self, block_type: &BlockType, amount: u32) {
        self.amounts
            .insert(block_type.id, amount.min(block_type.max_stack));
    }

    /// Total units across all types.
    pub fn total(&self) -> u32 {
        self.amounts.values().sum()
    }
}

impl Inventory for BlockInventory {
    fn count(&self, block_type: BlockTypeId) -> u32 {
        self.amounts.get(&block_type).copied().unwrap_or(0)
    }

    fn try_consume(&mut self, block_type: BlockTypeId, amount: u32) -> bool {
        let current = self.count(block_type);
        if current < amount {
            return false;
        }
        self.amounts.insert(block_type, current - amount);
        true
    }

    fn add(&mut self, block_type: &BlockType, amount: u32) -> u32 {
        let current = self.count(block_type.id);
        let clamped = current.saturating_add(amount).min(block_type.max_stack);
        let actual_added = clamped.saturating_sub(current);
        self.amounts.insert(block_type.id, clamped.max(current));
        actual_added
    }
}
