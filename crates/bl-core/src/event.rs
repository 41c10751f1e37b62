//! Capture-side event records.
//!
//! Timestamps are intentionally absent here: the store assigns them at
//! insert time from its own clock.

use serde::{Deserialize, Serialize};

use crate::action::{BlockAction, ContainerAction, TransferQualifier, container_action_label};
use crate::types::BlockPos;

/// A block-level mutation ready to be recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockEvent {
    pub pos: BlockPos,
    pub action: BlockAction,
    /// Block type involved (the removed type for breaks and explosions).
    pub block: String,
    /// Participant name, or a `#`-prefixed synthetic marker.
    pub actor: String,
}

/// A container-content mutation ready to be recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerEvent {
    pub pos: BlockPos,
    pub action: ContainerAction,
    pub qualifier: Option<TransferQualifier>,
    pub item: String,
    /// Affected quantity, always positive.
    pub amount: u32,
    pub actor: String,
}

impl ContainerEvent {
    /// Stored action label with the qualifier folded in.
    #[must_use]
    pub fn action_label(&self) -> String {
        container_action_label(self.action, self.qualifier)
    }
}
