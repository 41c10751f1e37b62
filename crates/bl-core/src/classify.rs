//! Click classification and explosion attribution.
//!
//! Turns raw interaction signals into the container transfers and synthetic
//! actors that get recorded. Everything here is pure; persistence and
//! provider lookups happen in the capture layer.

use serde::{Deserialize, Serialize};

use crate::action::{ContainerAction, TransferQualifier, container_action_label};
use crate::types::ItemStack;

/// Reserved prefix marking synthetic (non-participant) actors.
pub const SYNTHETIC_PREFIX: char = '#';

/// Marker used when the triggering entity of an explosion is unknown.
pub const UNKNOWN_EXPLOSION_MARKER: &str = "#explosion";

/// Which half of an open container view a click landed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pane {
    Container,
    Player,
}

/// A raw click signal inside an open container view.
///
/// The set is closed: hosts normalize their interaction vocabulary into
/// these categories before handing a click over, and classification matches
/// them exhaustively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClickAction {
    /// Picking up a slot's contents (whole stack or half of it).
    Pickup {
        pane: Pane,
        stack: Option<ItemStack>,
    },
    /// Placing cursor contents into a slot (all, one, or some).
    Place {
        pane: Pane,
        cursor: Option<ItemStack>,
    },
    /// Swapping the cursor contents with a slot's contents.
    SwapWithCursor {
        pane: Pane,
        cursor: Option<ItemStack>,
    },
    /// Shift-click moving a stack to the opposite pane.
    MoveToOther {
        pane: Pane,
        stack: Option<ItemStack>,
    },
    /// Double-click gathering matching items onto the cursor.
    CollectToCursor {
        cursor: Option<ItemStack>,
        /// Whether the container pane holds the collected item type.
        container_has_item: bool,
    },
    /// Drag-distributing the cursor stack across slots.
    Drag { added: Vec<(Pane, ItemStack)> },
}

/// One classified container mutation, before actor and coordinate attach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemTransfer {
    pub action: ContainerAction,
    pub qualifier: Option<TransferQualifier>,
    pub item: String,
    pub amount: u32,
}

impl ItemTransfer {
    fn took(stack: &ItemStack) -> Self {
        Self {
            action: ContainerAction::Took,
            qualifier: None,
            item: stack.item.clone(),
            amount: stack.amount,
        }
    }

    fn put(stack: &ItemStack) -> Self {
        Self {
            action: ContainerAction::Put,
            qualifier: None,
            item: stack.item.clone(),
            amount: stack.amount,
        }
    }

    /// Stored label with the qualifier folded in.
    #[must_use]
    pub fn label(&self) -> String {
        container_action_label(self.action, self.qualifier)
    }
}

/// Classifies a click into zero or more container transfers.
///
/// Empty slots, empty cursors and zero quantities never produce a transfer.
/// A swap logs only the incoming cursor stack; the outgoing slot stack is
/// not logged, so the pair never double-counts.
#[must_use]
pub fn classify_click(click: &ClickAction) -> Vec<ItemTransfer> {
    match click {
        ClickAction::Pickup { pane, stack } => match (pane, nonempty(stack)) {
            (Pane::Container, Some(stack)) => vec![ItemTransfer::took(stack)],
            _ => Vec::new(),
        },
        ClickAction::Place { pane, cursor } | ClickAction::SwapWithCursor { pane, cursor } => {
            match (pane, nonempty(cursor)) {
                (Pane::Container, Some(cursor)) => vec![ItemTransfer::put(cursor)],
                _ => Vec::new(),
            }
        }
        ClickAction::MoveToOther { pane, stack } => match (pane, nonempty(stack)) {
            (Pane::Container, Some(stack)) => vec![ItemTransfer::took(stack)],
            (Pane::Player, Some(stack)) => vec![ItemTransfer::put(stack)],
            (_, None) => Vec::new(),
        },
        ClickAction::CollectToCursor {
            cursor,
            container_has_item,
        } => match nonempty(cursor) {
            Some(cursor) if *container_has_item => vec![ItemTransfer {
                action: ContainerAction::Took,
                qualifier: Some(TransferQualifier::Stack),
                item: cursor.item.clone(),
                amount: cursor.amount,
            }],
            _ => Vec::new(),
        },
        ClickAction::Drag { added } => added
            .iter()
            .filter(|(pane, stack)| *pane == Pane::Container && stack.amount > 0)
            .map(|(_, stack)| ItemTransfer {
                action: ContainerAction::Put,
                qualifier: Some(TransferQualifier::Drag),
                item: stack.item.clone(),
                amount: stack.amount,
            })
            .collect(),
    }
}

fn nonempty(stack: &Option<ItemStack>) -> Option<&ItemStack> {
    stack.as_ref().filter(|stack| stack.amount > 0)
}

/// Builds the synthetic actor marker for an explosion.
///
/// Entity kinds are lowercased so markers stay canonical across hosts.
#[must_use]
pub fn explosion_marker(entity: Option<&str>) -> String {
    match entity {
        Some(kind) if !kind.is_empty() => format!("{SYNTHETIC_PREFIX}{}", kind.to_lowercase()),
        _ => UNKNOWN_EXPLOSION_MARKER.to_string(),
    }
}

/// Whether an entity kind is a primed charge whose placer can be attributed.
#[must_use]
pub fn is_detonator_entity(kind: &str) -> bool {
    matches!(kind.to_lowercase().as_str(), "tnt" | "primed_tnt")
}

/// Attribution result for one destroyed coordinate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplosionAttribution {
    /// Synthetic marker recorded as the primary actor.
    pub actor: String,
    /// Participant who placed the charge, when one could be found.
    pub detonated_by: Option<String>,
}

/// Classifies one destroyed coordinate of an explosion.
///
/// The primary actor is always the synthetic marker. A detonator is
/// attributed only when the entity is a primed charge and a prior placement
/// lookup produced a participant.
#[must_use]
pub fn attribute_explosion(
    entity: Option<&str>,
    prior_placer: Option<&str>,
) -> ExplosionAttribution {
    let actor = explosion_marker(entity);
    let detonated_by = match (entity, prior_placer) {
        (Some(kind), Some(placer)) if is_detonator_entity(kind) => Some(placer.to_string()),
        _ => None,
    };
    ExplosionAttribution {
        actor,
        detonated_by,
    }
}
