//! Open-container session tracking.

use std::collections::HashMap;

use crate::types::{BlockPos, InventorySource};

/// Open-container sessions, keyed by participant.
///
/// At most one entry per participant; reopening replaces the previous
/// session. Entries are removed unconditionally on close.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    open: HashMap<String, BlockPos>,
}

impl SessionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the participant's newly opened container.
    ///
    /// Returns the anchor that was recorded, or `None` when the source is
    /// not container-backed (nothing is recorded in that case).
    pub fn open(&mut self, participant: &str, source: &InventorySource) -> Option<BlockPos> {
        let anchor = canonical_anchor(source)?;
        self.open.insert(participant.to_string(), anchor.clone());
        Some(anchor)
    }

    /// Ends the participant's session, returning the anchor it had.
    pub fn close(&mut self, participant: &str) -> Option<BlockPos> {
        self.open.remove(participant)
    }

    /// The anchor of the participant's open container, if any.
    #[must_use]
    pub fn anchor(&self, participant: &str) -> Option<&BlockPos> {
        self.open.get(participant)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.open.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }
}

/// Resolves the single coordinate all events for a container attach to.
///
/// Two-half composites anchor to the half with the smaller `(x, y, z)`
/// triple, so both halves share one history no matter which was clicked.
#[must_use]
pub fn canonical_anchor(source: &InventorySource) -> Option<BlockPos> {
    match source {
        InventorySource::Block(pos) => Some(pos.clone()),
        InventorySource::DoubleBlock(a, b) => {
            if (a.x, a.y, a.z) <= (b.x, b.y, b.z) {
                Some(a.clone())
            } else {
                Some(b.clone())
            }
        }
        InventorySource::Virtual => None,
    }
}
