//! The level abstraction: something that can build a [`World`] and may know
//! a winning action sequence for it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::world::{World, WorldError};

/// How hard a level is meant to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Trivial,
    Easy,
    Moderate,
    Hard,
    Expert,
    Unclassified,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Difficulty::Trivial => "trivial",
            Difficulty::Easy => "easy",
            Difficulty::Moderate => "moderate",
            Difficulty::Hard => "hard",
            Difficulty::Expert => "expert",
            Difficulty::Unclassified => "unclassified",
        };
        f.write_str(name)
    }
}

/// A buildable puzzle.
pub trait Level {
    /// Unique catalogue name.
    fn name(&self) -> &'static str;

    fn difficulty(&self) -> Difficulty {
        Difficulty::Unclassified
    }

    /// Build a fresh world in its starting state.
    fn build(&self) -> Result<World, WorldError>;

    /// A known-good action sequence that reaches the goal, if one is
    /// recorded.
    fn solve(&self) -> Option<Vec<Action>> {
        None
    }
}

/// Catalogue lookup failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LevelError {
    #[error("unknown level '{name}'")]
    Unknown { name: String },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_names_agree_between_display_and_serde() {
        for difficulty in [Difficulty::Trivial, Difficulty::Moderate, Difficulty::Unclassified] {
            let json = serde_json::to_string(&difficulty).unwrap();
            assert_eq!(json, format!("\"{difficulty}\""));
        }
        assert_eq!(Difficulty::Moderate.to_string(), "moderate");
    }

    #[test]
    fn difficulties_order_from_easiest() {
        assert!(Difficulty::Easy < Difficulty::Moderate);
        assert!(Difficulty::Moderate < Difficulty::Hard);
    }
}
