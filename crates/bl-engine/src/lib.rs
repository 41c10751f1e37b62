//! Event capture and history reconstruction for the block audit log.
//!
//! Sits between the world event sources and the two storage backends:
//! - [`CaptureService`] turns world signals into stored events, routing block
//!   mutations to whichever backend holds authority
//! - [`HistoryQuery`] reads per-coordinate history back out as display-ready
//!   records

pub mod capture;
pub mod history;
pub mod record;

pub use bl_db::DEFAULT_HISTORY_LIMIT;
pub use capture::CaptureService;
pub use history::HistoryQuery;
pub use record::HistoryRecord;
