//! Stream ingestion of world signals.
//!
//! Hosts batch signals as JSON lines; `bl ingest stream` replays a batch into
//! the capture service. A malformed line is counted and skipped, never
//! aborting the rest of the feed.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use bl_engine::CaptureService;

use crate::Signal;

/// Applies a JSONL signal feed to the capture service.
///
/// Writes a one-line summary of totals once the feed ends.
pub fn stream<R: BufRead, W: Write>(
    reader: R,
    writer: &mut W,
    service: &mut CaptureService,
) -> Result<()> {
    let mut processed: u64 = 0;
    let mut skipped: u64 = 0;

    for line in reader.lines() {
        let line = line.context("failed to read signal line")?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Signal>(&line) {
            Ok(signal) => {
                signal.apply(service);
                processed += 1;
            }
            Err(err) => {
                tracing::warn!(error = %err, "skipping malformed signal line");
                skipped += 1;
            }
        }
    }

    writeln!(
        writer,
        "Processed {processed} signals, skipped {skipped} malformed lines."
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use bl_core::BlockPos;
    use bl_db::Database;

    fn service() -> CaptureService {
        CaptureService::new(Database::open_in_memory().unwrap(), None)
    }

    #[test]
    fn test_stream_applies_signals_in_order() {
        let input = concat!(
            r#"{"type":"block_placed","world":"world","x":1,"y":64,"z":1,"block":"stone","player":"Alice"}"#,
            "\n",
            r#"{"type":"block_broken","world":"world","x":1,"y":64,"z":1,"block":"stone","player":"Bob"}"#,
            "\n",
            r#"{"type":"inventory_opened","player":"Bob","source":{"block":{"world":"world","x":0,"y":64,"z":9}}}"#,
            "\n",
            r#"{"type":"container_click","player":"Bob","click":{"kind":"pickup","pane":"container","stack":{"item":"iron_ingot","amount":5}}}"#,
            "\n",
            r#"{"type":"inventory_closed","player":"Bob"}"#,
            "\n",
        );
        let mut service = service();
        let mut output = Vec::new();

        stream(input.as_bytes(), &mut output, &mut service).unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Processed 5 signals, skipped 0 malformed lines.\n"
        );
        let blocks = service
            .database()
            .block_history(&BlockPos::new("world", 1, 64, 1), 10)
            .unwrap();
        assert_eq!(blocks.len(), 2);
        // Newest first
        assert_eq!(blocks[0].action, "Broke");
        assert_eq!(blocks[1].action, "Placed");

        let containers = service
            .database()
            .container_history(&BlockPos::new("world", 0, 64, 9), 10)
            .unwrap();
        assert_eq!(containers.len(), 1);
        assert_eq!(containers[0].amount, 5);
    }

    #[test]
    fn test_stream_skips_malformed_lines() {
        let input = concat!(
            r#"{"type":"block_placed","world":"world","x":1,"y":64,"z":1,"block":"stone","player":"Alice"}"#,
            "\n",
            "not json at all\n",
            r#"{"type":"teleported","player":"Alice"}"#,
            "\n",
        );
        let mut service = service();
        let mut output = Vec::new();

        stream(input.as_bytes(), &mut output, &mut service).unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Processed 1 signals, skipped 2 malformed lines.\n"
        );
        let blocks = service
            .database()
            .block_history(&BlockPos::new("world", 1, 64, 1), 10)
            .unwrap();
        assert_eq!(blocks.len(), 1);
    }

    #[test]
    fn test_stream_ignores_blank_lines() {
        let input = concat!(
            "\n",
            "   \n",
            r#"{"type":"block_broken","world":"world","x":2,"y":64,"z":2,"block":"dirt","player":"Cara"}"#,
            "\n",
            "\n",
        );
        let mut service = service();
        let mut output = Vec::new();

        stream(input.as_bytes(), &mut output, &mut service).unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Processed 1 signals, skipped 0 malformed lines.\n"
        );
    }

    #[test]
    fn test_stream_empty_input_reports_zero() {
        let mut service = service();
        let mut output = Vec::new();

        stream("".as_bytes(), &mut output, &mut service).unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Processed 0 signals, skipped 0 malformed lines.\n"
        );
    }
}
