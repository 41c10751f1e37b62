//! Command-line argument definitions.

use std::path::PathBuf;

use bl_core::{BlockPos, DestroyedBlock};
use bl_engine::DEFAULT_HISTORY_LIMIT;
use clap::{Args, Parser, Subcommand};

/// Spatial audit log for world mutations.
///
/// Records who placed, broke, or blew up blocks and who moved items through
/// containers, then answers per-coordinate history questions.
#[derive(Debug, Parser)]
#[command(name = "bl", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show audit log status.
    Status,

    /// Record world signals.
    Ingest {
        #[command(subcommand)]
        signal: IngestSignal,
    },

    /// Show recorded history at a coordinate.
    History {
        #[command(subcommand)]
        target: HistoryTarget,
    },
}

/// A block coordinate in a named world.
#[derive(Debug, Args)]
pub struct Coordinate {
    /// World name.
    #[arg(long)]
    pub world: String,

    #[arg(long, allow_negative_numbers = true)]
    pub x: i32,

    #[arg(long, allow_negative_numbers = true)]
    pub y: i32,

    #[arg(long, allow_negative_numbers = true)]
    pub z: i32,
}

impl Coordinate {
    #[must_use]
    pub fn block_pos(&self) -> BlockPos {
        BlockPos::new(self.world.as_str(), self.x, self.y, self.z)
    }
}

/// World signals that can be recorded.
#[derive(Debug, Subcommand)]
pub enum IngestSignal {
    /// Record a participant placing a block.
    Place {
        #[command(flatten)]
        at: Coordinate,

        /// Block type that was placed.
        #[arg(long)]
        block: String,

        /// Participant who placed it.
        #[arg(long)]
        player: String,
    },

    /// Record a participant breaking a block.
    Break {
        #[command(flatten)]
        at: Coordinate,

        /// Block type that was broken.
        #[arg(long)]
        block: String,

        /// Participant who broke it.
        #[arg(long)]
        player: String,
    },

    /// Record an explosion and the blocks it destroyed.
    Explosion {
        /// World the explosion happened in.
        #[arg(long)]
        world: String,

        /// Exploding entity kind (e.g. creeper, tnt).
        #[arg(long)]
        entity: Option<String>,

        /// Destroyed block as `x,y,z,block`. Repeat for each block.
        #[arg(long, value_parser = parse_destroyed_block)]
        destroyed: Vec<DestroyedBlock>,
    },

    /// Read signals as JSON lines from stdin.
    Stream,
}

/// History targets.
#[derive(Debug, Subcommand)]
pub enum HistoryTarget {
    /// Block mutations at a coordinate.
    Block {
        #[command(flatten)]
        at: Coordinate,

        /// Maximum number of records to show.
        #[arg(long, default_value_t = DEFAULT_HISTORY_LIMIT)]
        limit: u32,

        /// Output records as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Container transfers at a coordinate.
    Container {
        #[command(flatten)]
        at: Coordinate,

        /// Maximum number of records to show.
        #[arg(long, default_value_t = DEFAULT_HISTORY_LIMIT)]
        limit: u32,

        /// Output records as JSON.
        #[arg(long)]
        json: bool,
    },
}

/// Parses a `x,y,z,block` destroyed-block argument.
fn parse_destroyed_block(raw: &str) -> Result<DestroyedBlock, String> {
    let mut parts = raw.splitn(4, ',');
    let (Some(x), Some(y), Some(z), Some(block)) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(format!("expected `x,y,z,block`, got `{raw}`"));
    };
    let axis = |name: &str, value: &str| {
        value
            .trim()
            .parse::<i32>()
            .map_err(|_| format!("invalid {name} coordinate `{value}` in `{raw}`"))
    };
    let block = block.trim();
    if block.is_empty() {
        return Err(format!("missing block type in `{raw}`"));
    }
    Ok(DestroyedBlock {
        x: axis("x", x)?,
        y: axis("y", y)?,
        z: axis("z", z)?,
        block: block.to_string(),
    })
}
