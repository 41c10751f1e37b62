//! Storage layer for the block audit log.
//!
//! Provides persistence for block and container events using `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! This means a `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization.
//!
//! Recorders that run on multiple threads should either serialize access through a
//! `Mutex<Database>` or open a separate `Database` per thread.
//!
//! # Schema
//!
//! ## Timestamps
//!
//! Events carry no timestamp of their own. The `time` column is stamped by SQLite at
//! insert (`DEFAULT CURRENT_TIMESTAMP`), as `YYYY-MM-DD HH:MM:SS` text in UTC. Row IDs
//! are `AUTOINCREMENT`, so `ORDER BY id` is insertion order even when two rows land in
//! the same second.
//!
//! ## Action Labels
//!
//! The `action` column stores the display label directly (`Placed`, `Broke`, `Blown up`,
//! `Changed` for blocks; `Took`/`Put` for containers). Container transfers fold their
//! qualifier into the same column (`Took (stack)`), matching what history output prints.

use std::path::Path;

use bl_core::{BlockEvent, BlockPos, ContainerEvent};
use rusqlite::{Connection, params};
use thiserror::Error;

/// Fallback number of rows returned by a history query when the caller does not ask
/// for a specific count.
pub const DEFAULT_HISTORY_LIMIT: u32 = 10;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// The event fails a consistency check and was not written.
    #[error("invalid event: {0}")]
    InvalidEvent(String),
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// A stored block mutation, as read back from `block_logs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockLogRow {
    pub id: i64,
    pub action: String,
    pub block: String,
    pub player: String,
    pub time: String,
}

/// A stored container transfer, as read back from `container_logs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerLogRow {
    pub id: i64,
    pub action: String,
    pub item: String,
    pub amount: i64,
    pub player: String,
    pub time: String,
}

/// Row counts and most recent write times, for status reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSummary {
    pub block_count: i64,
    pub container_count: i64,
    pub last_block_time: Option<String>,
    pub last_container_time: Option<String>,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "
            -- Block mutations: one row per placement, breakage, or explosion damage
            -- action: display label ('Placed', 'Broke', 'Blown up', 'Changed')
            -- player: participant name, or a '#'-prefixed synthetic marker
            -- time: stamped by SQLite, 'YYYY-MM-DD HH:MM:SS' UTC
            CREATE TABLE IF NOT EXISTS block_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                world TEXT NOT NULL,
                x INTEGER NOT NULL,
                y INTEGER NOT NULL,
                z INTEGER NOT NULL,
                action TEXT NOT NULL,
                block TEXT NOT NULL,
                player TEXT NOT NULL,
                time TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_block_logs_location ON block_logs(world, x, y, z);

            -- Container transfers: one row per item movement in or out
            -- action: 'Took' or 'Put', with an optional ' (stack)' / ' (drag)' suffix
            CREATE TABLE IF NOT EXISTS container_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                world TEXT NOT NULL,
                x INTEGER NOT NULL,
                y INTEGER NOT NULL,
                z INTEGER NOT NULL,
                action TEXT NOT NULL,
                item TEXT NOT NULL,
                amount INTEGER NOT NULL,
                player TEXT NOT NULL,
                time TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_container_logs_location ON container_logs(world, x, y, z);
            ",
        )?;
        Ok(())
    }

    /// Inserts a block mutation and returns its row ID.
    pub fn insert_block(&self, event: &BlockEvent) -> Result<i64, StoreError> {
        if event.actor.is_empty() {
            return Err(StoreError::InvalidEvent(
                "actor must not be empty".to_string(),
            ));
        }
        self.conn.execute(
            "
            INSERT INTO block_logs (world, x, y, z, action, block, player)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ",
            params![
                event.pos.world,
                event.pos.x,
                event.pos.y,
                event.pos.z,
                event.action.as_str(),
                event.block,
                event.actor,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Inserts a container transfer and returns its row ID.
    ///
    /// The transfer qualifier, if any, is folded into the stored action label.
    pub fn insert_container(&self, event: &ContainerEvent) -> Result<i64, StoreError> {
        if event.actor.is_empty() {
            return Err(StoreError::InvalidEvent(
                "actor must not be empty".to_string(),
            ));
        }
        if event.amount == 0 {
            return Err(StoreError::InvalidEvent(
                "amount must be positive".to_string(),
            ));
        }
        self.conn.execute(
            "
            INSERT INTO container_logs (world, x, y, z, action, item, amount, player)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ",
            params![
                event.pos.world,
                event.pos.x,
                event.pos.y,
                event.pos.z,
                event.action_label(),
                event.item,
                event.amount,
                event.actor,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Lists block mutations at a position, newest first.
    pub fn block_history(
        &self,
        pos: &BlockPos,
        limit: u32,
    ) -> Result<Vec<BlockLogRow>, StoreError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, action, block, player, time
            FROM block_logs
            WHERE world = ? AND x = ? AND y = ? AND z = ?
            ORDER BY id DESC
            LIMIT ?
            ",
        )?;
        let rows = stmt.query_map(params![pos.world, pos.x, pos.y, pos.z, limit], |row| {
            Ok(BlockLogRow {
                id: row.get(0)?,
                action: row.get(1)?,
                block: row.get(2)?,
                player: row.get(3)?,
                time: row.get(4)?,
            })
        })?;
        let mut history = Vec::new();
        for row in rows {
            history.push(row?);
        }
        Ok(history)
    }

    /// Lists container transfers at a position, newest first.
    pub fn container_history(
        &self,
        pos: &BlockPos,
        limit: u32,
    ) -> Result<Vec<ContainerLogRow>, StoreError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, action, item, amount, player, time
            FROM container_logs
            WHERE world = ? AND x = ? AND y = ? AND z = ?
            ORDER BY id DESC
            LIMIT ?
            ",
        )?;
        let rows = stmt.query_map(params![pos.world, pos.x, pos.y, pos.z, limit], |row| {
            Ok(ContainerLogRow {
                id: row.get(0)?,
                action: row.get(1)?,
                item: row.get(2)?,
                amount: row.get(3)?,
                player: row.get(4)?,
                time: row.get(5)?,
            })
        })?;
        let mut history = Vec::new();
        for row in rows {
            history.push(row?);
        }
        Ok(history)
    }

    /// Reports row counts and the most recent write time per table.
    pub fn summary(&self) -> Result<StoreSummary, StoreError> {
        let (block_count, last_block_time) = self.conn.query_row(
            "SELECT COUNT(*), MAX(time) FROM block_logs",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        let (container_count, last_container_time) = self.conn.query_row(
            "SELECT COUNT(*), MAX(time) FROM container_logs",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(StoreSummary {
            block_count,
            container_count,
            last_block_time,
            last_container_time,
        })
    }
}
