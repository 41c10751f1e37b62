//! History reconstruction: stored rows back into display-ready records.

use bl_core::{BlockPos, timefmt};
use bl_db::{BlockLogRow, ContainerLogRow, Database};
use bl_provider::{Provider, RawRecord};
use chrono::{Local, NaiveDateTime, Utc};

use crate::record::HistoryRecord;

const EXPLOSION_ACTOR: &str = "Explosion";
const EXPLOSION_ACTION: &str = "destroyed";

/// The two clocks a query renders against: epoch seconds for provider
/// records, local wall time for the local store's timestamp text.
#[derive(Debug, Clone, Copy)]
struct Clock {
    epoch_secs: i64,
    wall: NaiveDateTime,
}

impl Clock {
    fn system() -> Self {
        Self {
            epoch_secs: Utc::now().timestamp(),
            wall: Local::now().naive_local(),
        }
    }
}

/// Reads per-coordinate history from whichever backend holds it.
///
/// Block history prefers the provider when one is present; the local store
/// answers otherwise. Container history is always local. A query fault is
/// logged and renders as an empty history, never as an error to the caller.
pub struct HistoryQuery<'a> {
    db: &'a Database,
    provider: Option<&'a Provider>,
}

impl<'a> HistoryQuery<'a> {
    #[must_use]
    pub const fn new(db: &'a Database, provider: Option<&'a Provider>) -> Self {
        Self { db, provider }
    }

    /// Block mutations at a position, newest first, at most `limit` records.
    pub fn block_history(&self, pos: &BlockPos, limit: u32) -> Vec<HistoryRecord> {
        self.block_history_at(pos, limit, Clock::system())
    }

    /// Container transfers at a position, newest first, at most `limit` records.
    pub fn container_history(&self, pos: &BlockPos, limit: u32) -> Vec<HistoryRecord> {
        self.container_history_at(pos, limit, Clock::system())
    }

    fn block_history_at(&self, pos: &BlockPos, limit: u32, clock: Clock) -> Vec<HistoryRecord> {
        if let Some(provider) = self.provider {
            return match provider.lookup(pos, limit) {
                Ok(records) => records
                    .iter()
                    .map(|record| render_provider_record(record, clock.epoch_secs))
                    .collect(),
                Err(err) => {
                    tracing::error!(error = %err, pos = %pos, "provider history lookup failed");
                    Vec::new()
                }
            };
        }
        match self.db.block_history(pos, limit) {
            Ok(rows) => rows
                .iter()
                .map(|row| render_block_row(row, clock.wall))
                .collect(),
            Err(err) => {
                tracing::error!(error = %err, pos = %pos, "block history query failed");
                Vec::new()
            }
        }
    }

    fn container_history_at(&self, pos: &BlockPos, limit: u32, clock: Clock) -> Vec<HistoryRecord> {
        match self.db.container_history(pos, limit) {
            Ok(rows) => rows
                .iter()
                .map(|row| render_container_row(row, clock.wall))
                .collect(),
            Err(err) => {
                tracing::error!(error = %err, pos = %pos, "container history query failed");
                Vec::new()
            }
        }
    }
}

/// Stored block identifiers print as lowercase words.
fn prettify_block(block: &str) -> String {
    block.to_lowercase().replace('_', " ")
}

fn render_provider_record(record: &RawRecord, now_epoch: i64) -> HistoryRecord {
    let subject = prettify_block(&record.block);
    let time = timefmt::epoch_ago(record.time, now_epoch);
    if record.is_explosion() {
        HistoryRecord {
            actor: EXPLOSION_ACTOR.to_string(),
            action: EXPLOSION_ACTION.to_string(),
            subject,
            time,
            detonated_by: Some(record.actor.clone()),
        }
    } else {
        HistoryRecord {
            actor: record.actor.clone(),
            action: record.action_label().to_string(),
            subject,
            time,
            detonated_by: None,
        }
    }
}

fn render_block_row(row: &BlockLogRow, now: NaiveDateTime) -> HistoryRecord {
    HistoryRecord {
        actor: row.player.clone(),
        action: row.action.clone(),
        subject: prettify_block(&row.block),
        time: timefmt::db_text_ago(&row.time, now),
        detonated_by: None,
    }
}

fn render_container_row(row: &ContainerLogRow, now: NaiveDateTime) -> HistoryRecord {
    HistoryRecord {
        actor: row.player.clone(),
        action: row.action.clone(),
        subject: format!("{} x{}", prettify_block(&row.item), row.amount),
        time: timefmt::db_text_ago(&row.time, now),
        detonated_by: None,
    }
}
