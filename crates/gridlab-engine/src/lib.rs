//! Gridlab Engine -- turn-based tile-grid puzzle simulation.
//!
//! This crate builds on [`gridlab_ecs`] to provide the game itself: the
//! movement resolver, A* search for enemies, the rule systems, and the fixed
//! pipeline that runs them once per turn behind the [`World`](world::World)
//! facade.
//!
//! # Quick Start
//!
//! ```
//! use gridlab_engine::prelude::*;
//!
//! let mut world = World::from_layout(
//!     "quick",
//!     "
//!     @.^
//!     ...
//!     ..o
//!     ",
//! )
//! .unwrap();
//!
//! for action in parse_moves("ddrr").unwrap() {
//!     world.step(action);
//! }
//! assert_eq!(world.status(), Status::GoalReached);
//! ```

#![deny(unsafe_code)]

pub mod action;
pub mod config;
pub mod digest;
pub mod grid;
pub mod level;
pub mod levels;
pub mod movement;
pub mod search;
pub mod state;
pub mod systems;
pub mod tick;
pub mod verify;
pub mod world;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

/// Re-export the ECS crate for convenience.
pub use gridlab_ecs;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common engine usage.
pub mod prelude {
    // Re-export everything from the ECS prelude.
    pub use gridlab_ecs::prelude::*;

    // Engine-specific exports.
    pub use crate::action::{parse_moves, Action, ParseActionError};
    pub use crate::config::{ChaseOptions, MirrorOptions, WorldConfig};
    pub use crate::grid::Grid;
    pub use crate::level::{Difficulty, Level, LevelError};
    pub use crate::movement::{move_entity, teleport};
    pub use crate::search::{search, PassabilityGrid, SearchOptions};
    pub use crate::state::{Outcome, OutcomeObserver, OutcomeState, Status};
    pub use crate::tick::{Pipeline, SystemFn, TickContext};
    pub use crate::verify::{verify_all, verify_solution, VerifyError};
    pub use crate::world::{SwitchSet, World, WorldError};
}
