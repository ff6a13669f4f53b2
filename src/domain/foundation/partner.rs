//! Partner enum - which half of the couple is acting.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two partners in a couple.
///
/// Partner identity is positional (A or B), matching the slot layout of the
/// active round. Emails and profiles live with the couple record, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Partner {
    A,
    B,
}

impl Partner {
    /// Returns the other partner.
    pub fn other(&self) -> Partner {
        match self {
            Partner::A => Partner::B,
            Partner::B => Partner::A,
        }
    }

    /// Stable label used in stored records ("partner_a" / "partner_b").
    pub fn as_label(&self) -> &'static str {
        match self {
            Partner::A => "partner_a",
            Partner::B => "partner_b",
        }
    }
}

impl fmt::Display for Partner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Partner::A => write!(f, "A"),
            Partner::B => write!(f, "B"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn other_flips_between_partners() {
        assert_eq!(Partner::A.other(), Partner::B);
        assert_eq!(Partner::B.other(), Partner::A);
        assert_eq!(Partner::A.other().other(), Partner::A);
    }

    #[test]
    fn labels_are_stable() {
        assert_eq!(Partner::A.as_label(), "partner_a");
        assert_eq!(Partner::B.as_label(), "partner_b");
    }

    #[test]
    fn serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Partner::A).unwrap(), "\"a\"");
        assert_eq!(serde_json::to_string(&Partner::B).unwrap(), "\"b\"");
    }
}
