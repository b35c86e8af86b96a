//! The game-outcome state machine.
//!
//! A world starts [`Status::Running`] and moves to exactly one terminal
//! status. The `player_dead` and `goal_reached` flags are write-once: only the
//! first transition to `true` reports a change, which is what the world uses
//! to fire its outcome observers exactly once.

use gridlab_ecs::entity::EntityId;
use gridlab_ecs::manager::EntityManager;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Outcome / Status
// ---------------------------------------------------------------------------

/// A terminal event that fires observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    PlayerDead,
    GoalReached,
}

/// Where the game currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Running,
    PlayerDead,
    GoalReached,
    Terminated,
}

/// Side effect run synchronously when an [`Outcome`] first becomes true.
///
/// Receives the store and the player (if one is registered).
pub type OutcomeObserver = fn(Outcome, &mut EntityManager, Option<EntityId>);

// ---------------------------------------------------------------------------
// OutcomeState
// ---------------------------------------------------------------------------

/// Tri-flag game-over tracker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeState {
    player_dead: bool,
    goal_reached: bool,
    terminated: bool,
}

impl OutcomeState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag for `outcome`.
    ///
    /// Returns `true` only on the first transition; repeated marks are
    /// ignored. A finished game never takes a second terminal outcome.
    pub fn mark(&mut self, outcome: Outcome) -> bool {
        if self.is_finished() {
            return false;
        }
        match outcome {
            Outcome::PlayerDead => self.player_dead = true,
            Outcome::GoalReached => self.goal_reached = true,
        }
        true
    }

    /// Record that the session was quit. No effect once finished.
    pub fn terminate(&mut self) {
        if !self.is_finished() {
            self.terminated = true;
        }
    }

    pub fn player_dead(&self) -> bool {
        self.player_dead
    }

    pub fn goal_reached(&self) -> bool {
        self.goal_reached
    }

    pub fn terminated(&self) -> bool {
        self.terminated
    }

    /// Logical OR of the three flags.
    pub fn is_finished(&self) -> bool {
        self.player_dead || self.goal_reached || self.terminated
    }

    pub fn status(&self) -> Status {
        if self.player_dead {
            Status::PlayerDead
        } else if self.goal_reached {
            Status::GoalReached
        } else if self.terminated {
            Status::Terminated
        } else {
            Status::Running
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
