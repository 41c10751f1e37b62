//! Wire format for streamed world signals.
//!
//! `bl ingest stream` reads one JSON object per line, each describing a world
//! event to record. Hosts emit these as they happen; replaying a feed through
//! the capture service reproduces the same rows as live capture.

use bl_core::{BlockPos, ClickAction, DestroyedBlock, InventorySource};
use bl_engine::CaptureService;
use serde::{Deserialize, Serialize};

/// One world signal, as hosts emit them on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Signal {
    /// A participant placed a block.
    BlockPlaced {
        world: String,
        x: i32,
        y: i32,
        z: i32,
        block: String,
        player: String,
    },
    /// A participant broke a block.
    BlockBroken {
        world: String,
        x: i32,
        y: i32,
        z: i32,
        block: String,
        player: String,
    },
    /// An explosion destroyed a set of blocks.
    Explosion {
        world: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        entity: Option<String>,
        destroyed: Vec<DestroyedBlock>,
    },
    /// A participant opened a container view.
    InventoryOpened {
        player: String,
        source: InventorySource,
    },
    /// A participant closed their container view.
    InventoryClosed { player: String },
    /// A participant clicked inside an open container view.
    ContainerClick { player: String, click: ClickAction },
}

impl Signal {
    /// Applies the signal to the capture service.
    pub fn apply(self, service: &mut CaptureService) {
        match self {
            Self::BlockPlaced {
                world,
                x,
                y,
                z,
                block,
                player,
            } => service.on_block_placed(BlockPos::new(world, x, y, z), block, player),
            Self::BlockBroken {
                world,
                x,
                y,
                z,
                block,
                player,
            } => service.on_block_broken(BlockPos::new(world, x, y, z), block, player),
            Self::Explosion {
                world,
                entity,
                destroyed,
            } => service.on_explosion(&world, entity.as_deref(), &destroyed),
            Self::InventoryOpened { player, source } => {
                service.on_inventory_opened(&player, &source);
            }
            Self::InventoryClosed { player } => service.on_inventory_closed(&player),
            Self::ContainerClick { player, click } => service.on_container_click(&player, &click),
        }
    }
}
