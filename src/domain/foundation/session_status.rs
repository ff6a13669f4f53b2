//! SessionStatus enum for tracking the lifecycle of a retrospective.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a retrospective session.
///
/// `Paused` is declared for parity with the stored schema but no transition
/// in the conversation protocol produces it; sessions move
/// `NotStarted -> InProgress -> Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    NotStarted,
    InProgress,
    Paused,
    Completed,
}

impl SessionStatus {
    /// Returns true if the session accepts conversation intents.
    pub fn is_active(&self) -> bool {
        matches!(self, SessionStatus::InProgress)
    }

    /// Returns true if the session has reached its terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Completed)
    }

    /// Stable label used in stored records.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::NotStarted => "not_started",
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Paused => "paused",
            SessionStatus::Completed => "completed",
        }
    }

    /// Parses a stored label, defaulting unknown values to `NotStarted`.
    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "in_progress" => SessionStatus::InProgress,
            "paused" => SessionStatus::Paused,
            "completed" => SessionStatus::Completed,
            _ => SessionStatus::NotStarted,
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
