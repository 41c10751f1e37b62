//! History commands for reading per-coordinate history.

use std::io::Write;

use anyhow::Result;
use bl_core::BlockPos;
use bl_engine::{HistoryQuery, HistoryRecord};

/// Prints block history at a position, newest first.
pub fn block<W: Write>(
    writer: &mut W,
    query: &HistoryQuery<'_>,
    pos: &BlockPos,
    limit: u32,
    json: bool,
) -> Result<()> {
    let records = query.block_history(pos, limit);
    print_records(writer, &records, json)
}

/// Prints container history at a position, newest first.
pub fn container<W: Write>(
    writer: &mut W,
    query: &HistoryQuery<'_>,
    pos: &BlockPos,
    limit: u32,
    json: bool,
) -> Result<()> {
    let records = query.container_history(pos, limit);
    print_records(writer, &records, json)
}

fn print_records<W: Write>(writer: &mut W, records: &[HistoryRecord], json: bool) -> Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *writer, records)?;
        writeln!(writer)?;
        return Ok(());
    }

    if records.is_empty() {
        writeln!(writer, "No records.")?;
        return Ok(());
    }
    for record in records {
        writeln!(writer, "{record}")?;
    }
    Ok(())
}
