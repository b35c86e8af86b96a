//! Player actions and their unit displacements.

use std::fmt;
use std::str::FromStr;

use gridlab_ecs::component::Delta;
use serde::{Deserialize, Serialize};

/// One move request for a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
    None,
}

impl Action {
    /// The four movement actions, in `u d l r` order.
    pub const MOVES: [Action; 4] = [Action::Up, Action::Down, Action::Left, Action::Right];

    /// Unit displacement: up is `-y`, down is `+y`.
    pub fn delta(self) -> Delta {
        match self {
            Action::Up => (0, -1),
            Action::Down => (0, 1),
            Action::Left => (-1, 0),
            Action::Right => (1, 0),
            Action::None => (0, 0),
        }
    }

    /// Single-letter code (`u`, `d`, `l`, `r`, `n`).
    pub fn code(self) -> char {
        match self {
            Action::Up => 'u',
            Action::Down => 'd',
            Action::Left => 'l',
            Action::Right => 'r',
            Action::None => 'n',
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Up => "up",
            Action::Down => "down",
            Action::Left => "left",
            Action::Right => "right",
            Action::None => "none",
        };
        f.write_str(name)
    }
}

/// Error returned when parsing an unknown action name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action '{0}' (expected up/down/left/right/none or u/d/l/r/n)")]
pub struct ParseActionError(pub String);

impl FromStr for Action {
    type Err = ParseActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "u" | "up" => Ok(Action::Up),
            "d" | "down" => Ok(Action::Down),
            "l" | "left" => Ok(Action::Left),
            "r" | "right" => Ok(Action::Right),
            "n" | "none" => Ok(Action::None),
            _ => Err(ParseActionError(s.to_owned())),
        }
    }
}

/// Parse a compact move string such as `"rrddl"` into actions.
///
/// Whitespace and commas are ignored.
pub fn parse_moves(moves: &str) -> Result<Vec<Action>, ParseActionError> {
    moves
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .map(|c| c.to_string().parse())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deltas_follow_screen_coordinates() {
        assert_eq!(Action::Up.delta(), (0, -1));
        assert_eq!(Action::Down.delta(), (0, 1));
        assert_eq!(Action::Left.delta(), (-1, 0));
        assert_eq!(Action::Right.delta(), (1, 0));
        assert_eq!(Action::None.delta(), (0, 0));
    }

    #[test]
    fn parses_codes_and_names() {
        assert_eq!("u".parse::<Action>(), Ok(Action::Up));
        assert_eq!(" Left ".parse::<Action>(), Ok(Action::Left));
        assert!("jump".parse::<Action>().is_err());
        for action in Action::MOVES {
            assert_eq!(action.code().to_string().parse::<Action>(), Ok(action));
        }
    }

    #[test]
    fn parse_moves_skips_separators() {
        let moves = parse_moves("r r, d n").unwrap();
        assert_eq!(
            moves,
            vec![Action::Right, Action::Right, Action::Down, Action::None]
        );
        assert!(parse_moves("rx").is_err());
    }
}
