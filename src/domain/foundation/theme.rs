//! Theme enum - the closed set of conversation themes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Conversation theme for a retrospective.
///
/// The set is closed; prompt framing for anything unrecognized falls back to
/// `EmotionalCheckIn`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    EmotionalCheckIn,
    ConflictRepair,
    Planning,
    SexAndIntimacy,
    Finances,
    Parenting,
}

impl Theme {
    /// All themes, in presentation order.
    pub const ALL: [Theme; 6] = [
        Theme::EmotionalCheckIn,
        Theme::ConflictRepair,
        Theme::Planning,
        Theme::SexAndIntimacy,
        Theme::Finances,
        Theme::Parenting,
    ];

    /// Human-readable display name, as shown to the couple.
    pub fn display_name(&self) -> &'static str {
        match self {
            Theme::EmotionalCheckIn => "Emotional Check-In",
            Theme::ConflictRepair => "Conflict Repair",
            Theme::Planning => "Planning",
            Theme::SexAndIntimacy => "Sex & Intimacy",
            Theme::Finances => "Finances",
            Theme::Parenting => "Parenting",
        }
    }

    /// Lowercase tag form used in summaries and stored tags.
    pub fn as_tag(&self) -> &'static str {
        match self {
            Theme::EmotionalCheckIn => "emotional check-in",
            Theme::ConflictRepair => "conflict repair",
            Theme::Planning => "planning",
            Theme::SexAndIntimacy => "sex & intimacy",
            Theme::Finances => "finances",
            Theme::Parenting => "parenting",
        }
    }

    /// Parses a display name, falling back to `EmotionalCheckIn` for anything
    /// unrecognized (stored rows may carry free-form theme strings).
    pub fn from_display_name_lossy(s: &str) -> Self {
        Theme::ALL
            .into_iter()
            .find(|t| t.display_name() == s)
            .unwrap_or(Theme::EmotionalCheckIn)
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
