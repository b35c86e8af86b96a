//! The fixed, ordered system pipeline that makes up one tick.
//!
//! Each tick every registered system runs exactly once, in registration
//! order, against a [`TickContext`] that lends it the component store, the
//! grid, the outcome state and the pending actions. There is no command
//! buffer: systems write the store directly and later systems observe those
//! writes, which is how the `PositionDelta` handoff from movement to the
//! mirror AI works.
//!
//! # Example
//!
//! ```
//! use gridlab_engine::tick::Pipeline;
//!
//! let mut pipeline = Pipeline::new();
//! pipeline.add_system("noop", |_ctx| {});
//! assert_eq!(pipeline.system_names(), vec!["noop"]);
//! ```

use gridlab_ecs::prelude::*;

use crate::action::Action;
use crate::grid::Grid;
use crate::state::{Outcome, OutcomeObserver, OutcomeState};
use crate::systems;

// ---------------------------------------------------------------------------
// TickContext
// ---------------------------------------------------------------------------

/// Everything a system may read or write during a tick.
pub struct TickContext<'a> {
    pub em: &'a mut EntityManager,
    pub grid: &'a Grid,
    pub state: &'a mut OutcomeState,
    /// The registered player, if the level has one.
    pub player: Option<EntityId>,
    /// Actions queued for this tick, consumed by the action system.
    pub actions: &'a mut Vec<(EntityId, Action)>,
    observers: &'a [OutcomeObserver],
}

impl<'a> TickContext<'a> {
    pub fn new(
        em: &'a mut EntityManager,
        grid: &'a Grid,
        state: &'a mut OutcomeState,
        player: Option<EntityId>,
        actions: &'a mut Vec<(EntityId, Action)>,
        observers: &'a [OutcomeObserver],
    ) -> Self {
        Self {
            em,
            grid,
            state,
            player,
            actions,
            observers,
        }
    }

    /// Whether the game has reached a terminal status.
    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    /// The player's current cell.
    pub fn player_position(&self) -> Option<Position> {
        self.player
            .and_then(|player| self.em.component::<Position>(player))
            .copied()
    }

    /// Record `outcome`, running every observer if this is the first time.
    pub fn finish(&mut self, outcome: Outcome) {
        if !self.state.mark(outcome) {
            return;
        }
        tracing::debug!(?outcome, "game finished");
        for observer in self.observers {
            observer(outcome, self.em, self.player);
        }
    }
}

// ---------------------------------------------------------------------------
// SystemFn
// ---------------------------------------------------------------------------

/// A system: a function run once per tick. Systems hold no state between
/// ticks; anything persistent lives in components.
pub type SystemFn = fn(&mut TickContext<'_>);

/// A named system in the pipeline.
#[derive(Debug)]
struct RegisteredSystem {
    /// Human-readable name, used for logging (e.g. `"chase_ai"`).
    name: String,
    func: SystemFn,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// An ordered list of systems.
#[derive(Debug, Default)]
pub struct Pipeline {
    systems: Vec<RegisteredSystem>,
}

impl Pipeline {
    /// An empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard game pipeline.
    ///
    /// Order matters: deltas are cleared before anything moves, the mirror
    /// AI runs after the player's move produced a delta, and death is checked
    /// both before and after the AI moves.
    pub fn standard() -> Self {
        let mut pipeline = Self::new();
        pipeline.add_system("position_delta", systems::action::reset_position_deltas);
        pipeline.add_system("action", systems::action::apply_actions);
        pipeline.add_system("death", systems::interaction::check_death);
        pipeline.add_system("door", systems::interaction::unlock_doors);
        pipeline.add_system("switch", systems::switch::update_switches);
        pipeline.add_system("patrol_ai", systems::ai::patrol);
        pipeline.add_system("fixed_ai", systems::ai::fixed);
        pipeline.add_system("mirror_ai", systems::ai::mirror);
        pipeline.add_system("chase_ai", systems::ai::chase);
        pipeline.add_system("snake_ai", systems::ai::snake);
        pipeline.add_system("death_recheck", systems::interaction::check_death);
        pipeline.add_system("goal", systems::interaction::check_goal);
        pipeline.add_system("timer", systems::timer::tick_timers);
        pipeline
    }

    /// Append a system.
    ///
    /// # Panics
    ///
    /// Panics if a system with the same name is already registered.
    pub fn add_system(&mut self, name: &str, func: SystemFn) {
        assert!(
            !self.systems.iter().any(|s| s.name == name),
            "duplicate system name: {name:?}"
        );
        self.systems.push(RegisteredSystem {
            name: name.to_owned(),
            func,
        });
    }

    /// Run every system once, in order.
    pub fn run(&self, ctx: &mut TickContext<'_>) {
        for system in &self.systems {
            let _span = tracing::trace_span!("system", name = %system.name).entered();
            (system.func)(ctx);
        }
    }

    /// The number of registered systems.
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// The names of all registered systems, in execution order.
    pub fn system_names(&self) -> Vec<&str> {
        self.systems.iter().map(|s| s.name.as_str()).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
