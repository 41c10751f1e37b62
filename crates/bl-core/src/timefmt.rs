//! Relative-time rendering for history output.
//!
//! Two variants exist because the two backends hand back different
//! timestamp shapes: the external provider reports seconds since the epoch,
//! the local store reports its own `YYYY-MM-DD HH:MM:SS` text. Both take an
//! explicit `now` so callers control the clock.

use chrono::{Duration, NaiveDateTime};

/// Format the local store assigns to `time` columns.
pub const DB_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Fixed correction applied to local-store timestamps before display.
const LOCAL_OFFSET_HOURS: i64 = 2;

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;

/// Renders seconds-since-epoch as a compact relative time (`"5s ago"`).
///
/// Buckets truncate: 59s renders as seconds, 3599s as minutes, 86399s as
/// hours, everything past a day as days.
#[must_use]
pub fn epoch_ago(epoch_secs: i64, now_secs: i64) -> String {
    let (n, unit) = bucket(now_secs - epoch_secs);
    format!("{n}{unit} ago")
}

/// Renders a local-store timestamp as a relative time with the zone
/// qualifier (`"5 s ago (UTS-2)"`).
///
/// The stored wall time gets the fixed +2h correction before the elapsed
/// duration is computed against `now`. Input that cannot be parsed or
/// corrected comes back verbatim, never as an error.
#[must_use]
pub fn db_text_ago(raw: &str, now: NaiveDateTime) -> String {
    let Ok(parsed) = NaiveDateTime::parse_from_str(raw, DB_TIME_FORMAT) else {
        return raw.to_string();
    };
    let Some(corrected) = parsed.checked_add_signed(Duration::hours(LOCAL_OFFSET_HOURS)) else {
        return raw.to_string();
    };
    let (n, unit) = bucket((now - corrected).num_seconds());
    format!("{n} {unit} ago (UTS-2)")
}

const fn bucket(secs: i64) -> (i64, char) {
    if secs < MINUTE {
        (secs, 's')
    } else if secs < HOUR {
        (secs / MINUTE, 'm')
    } else if secs < DAY {
        (secs / HOUR, 'h')
    } else {
        (secs / DAY, 'd')
    }
}
