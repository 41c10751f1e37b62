//! Display-ready history records.

use std::fmt;

use serde::Serialize;

/// One line of reconstructed history, ready to print or serialize.
///
/// `action` carries whatever label the backing store returned, qualifier
/// suffixes included, so two backends with different label sets render
/// through the same type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryRecord {
    pub actor: String,
    pub action: String,
    pub subject: String,
    pub time: String,
    /// Participant who set off the mutation, for explosion records that
    /// could name one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detonated_by: Option<String>,
}

impl fmt::Display for HistoryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.actor, self.action, self.subject)?;
        if let Some(detonated_by) = &self.detonated_by {
            write!(f, " by {detonated_by}")?;
        }
        write!(f, " ({})", self.time)
    }
}
