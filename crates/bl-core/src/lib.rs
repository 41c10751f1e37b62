//! Core domain logic for the block audit log.
//!
//! This crate contains the fundamental types and logic for:
//! - Events: block and container mutation records
//! - Classification: turning raw click signals into item transfers
//! - Sessions: tracking which container each participant has open
//! - Time rendering: relative timestamps for history output

pub mod action;
pub mod classify;
pub mod event;
pub mod session;
pub mod timefmt;
pub mod types;

pub use action::{
    BlockAction, ContainerAction, TransferQualifier, UnknownAction, container_action_label,
};
pub use classify::{
    ClickAction, ExplosionAttribution, ItemTransfer, Pane, attribute_explosion, classify_click,
    explosion_marker, is_detonator_entity,
};
pub use event::{BlockEvent, ContainerEvent};
pub use session::{SessionRegistry, canonical_anchor};
pub use types::{BlockPos, DestroyedBlock, InventorySource, ItemStack};
