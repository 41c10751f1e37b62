//! Action enums as the single source of truth for stored action labels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Block-level mutation kinds.
///
/// The label is what gets written to the `action` column of the local store
/// and printed back verbatim when rendering history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockAction {
    Placed,
    Broken,
    ChangedByExplosion,
    Changed,
}

impl BlockAction {
    /// Returns the stored label for this action.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Placed => "Placed",
            Self::Broken => "Broke",
            Self::ChangedByExplosion => "Blown up",
            Self::Changed => "Changed",
        }
    }
}

impl fmt::Display for BlockAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockAction {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Placed" => Ok(Self::Placed),
            "Broke" => Ok(Self::Broken),
            "Blown up" => Ok(Self::ChangedByExplosion),
            "Changed" => Ok(Self::Changed),
            _ => Err(UnknownAction(s.to_string())),
        }
    }
}

impl Serialize for BlockAction {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BlockAction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Container-level mutation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerAction {
    Took,
    Put,
}

impl ContainerAction {
    /// Returns the unqualified stored label for this action.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Took => "Took",
            Self::Put => "Put",
        }
    }
}

impl fmt::Display for ContainerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContainerAction {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Took" => Ok(Self::Took),
            "Put" => Ok(Self::Put),
            _ => Err(UnknownAction(s.to_string())),
        }
    }
}

impl Serialize for ContainerAction {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ContainerAction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Qualifier folded into a container action label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferQualifier {
    /// Bulk collect onto the cursor.
    Stack,
    /// Drag-distribution into slots.
    Drag,
}

impl TransferQualifier {
    #[must_use]
    pub const fn suffix(&self) -> &'static str {
        match self {
            Self::Stack => "(stack)",
            Self::Drag => "(drag)",
        }
    }
}

/// Renders the stored label for a container action with its qualifier.
#[must_use]
pub fn container_action_label(
    action: ContainerAction,
    qualifier: Option<TransferQualifier>,
) -> String {
    match qualifier {
        Some(qualifier) => format!("{} {}", action.as_str(), qualifier.suffix()),
        None => action.as_str().to_string(),
    }
}

/// Error type for unknown stored action labels.
#[derive(Debug, Clone, Error)]
#[error("unknown action label: {0}")]
pub struct UnknownAction(pub String);
