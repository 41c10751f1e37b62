//! Status command showing store totals and the active recording mode.

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use bl_db::Database;
use bl_provider::Provider;

/// Prints database location, recording mode and row totals.
pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    provider: Option<&Provider>,
    database_path: &Path,
) -> Result<()> {
    let summary = db.summary()?;

    writeln!(writer, "Block audit log status")?;
    writeln!(writer, "Database: {}", database_path.display())?;
    match provider {
        Some(provider) => writeln!(
            writer,
            "Block recording: provider (API v{})",
            provider.api_version()
        )?,
        None => writeln!(writer, "Block recording: local store")?,
    }
    writeln!(writer, "Block rows: {}", summary.block_count)?;
    if let Some(time) = &summary.last_block_time {
        writeln!(writer, "  last write: {time}")?;
    }
    writeln!(writer, "Container rows: {}", summary.container_count)?;
    if let Some(time) = &summary.last_container_time {
        writeln!(writer, "  last write: {time}")?;
    }
    Ok(())
}
