//! Delta reset and action intake.

use gridlab_ecs::prelude::*;

use crate::action::Action;
use crate::movement::move_entity;
use crate::tick::TickContext;

/// Clear every `PositionDelta` so that only this tick's moves are visible.
pub fn reset_position_deltas(ctx: &mut TickContext<'_>) {
    if ctx.is_finished() {
        return;
    }
    ctx.em.get_mut::<PositionDelta>().clear();
}

/// Apply the queued actions in order, then empty the queue.
pub fn apply_actions(ctx: &mut TickContext<'_>) {
    if ctx.is_finished() {
        return;
    }

    for (entity, action) in std::mem::take(ctx.actions) {
        if action == Action::None {
            continue;
        }
        let (dx, dy) = action.delta();
        if !move_entity(ctx.em, ctx.grid, entity, dx, dy) {
            tracing::trace!(%entity, %action, "move rejected");
        }
    }
}
