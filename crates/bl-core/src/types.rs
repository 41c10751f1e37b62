//! Shared spatial and inventory primitives.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A block position in a named world.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPos {
    pub world: String,
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    #[must_use]
    pub fn new(world: impl Into<String>, x: i32, y: i32, z: i32) -> Self {
        Self {
            world: world.into(),
            x,
            y,
            z,
        }
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {}, {})", self.world, self.x, self.y, self.z)
    }
}

/// An item type together with a quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item: String,
    pub amount: u32,
}

impl ItemStack {
    #[must_use]
    pub fn new(item: impl Into<String>, amount: u32) -> Self {
        Self {
            item: item.into(),
            amount,
        }
    }
}

/// What backs an inventory view a participant opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InventorySource {
    /// A single container block.
    Block(BlockPos),
    /// A two-half composite container. Both halves share one history.
    DoubleBlock(BlockPos, BlockPos),
    /// Not backed by a world block (crafting view, trade screen, ...).
    Virtual,
}

/// One destroyed entry reported with an explosion signal.
///
/// The host reports the block type it observed at the moment of
/// destruction; the world itself no longer holds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestroyedBlock {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub block: String,
}
