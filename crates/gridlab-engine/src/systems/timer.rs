//! Countdown timers and the pickups that reset them.

use gridlab_ecs::prelude::*;

use crate::state::Outcome;
use crate::tick::TickContext;

/// Advance every active timer.
///
/// Stepping on a timer reset consumes it and zeroes every timer for this
/// tick. Otherwise a timer that reaches its limit kills the player (when
/// attached to the player) or removes the entity it is attached to, along
/// with the body segments of an expiring snake head. Nothing expires once the
/// goal has been reached.
pub fn tick_timers(ctx: &mut TickContext<'_>) {
    if ctx.em.get::<Timer>().is_empty() {
        return;
    }

    let resets: Vec<EntityId> = match ctx.player_position() {
        Some(cell) => ctx
            .em
            .active_with::<TimerReset>()
            .map(|(e, _)| e)
            .filter(|&e| ctx.em.component::<Position>(e) == Some(&cell))
            .collect(),
        None => Vec::new(),
    };
    let reset = !resets.is_empty();
    if reset {
        tracing::debug!(count = resets.len(), "timers reset");
    }
    ctx.em.remove_all(resets);

    let goal_reached = ctx.state.goal_reached();
    let timed: Vec<EntityId> = ctx.em.active_with::<Timer>().map(|(e, _)| e).collect();
    let mut expired = Vec::new();
    for entity in timed {
        let Some(timer) = ctx.em.component_mut::<Timer>(entity) else {
            continue;
        };
        timer.tick += 1;
        if reset {
            timer.tick = 0;
        } else if timer.tick >= timer.limit && !goal_reached {
            expired.push(entity);
        }
    }

    for entity in expired {
        tracing::debug!(%entity, "timer expired");
        if Some(entity) == ctx.player {
            ctx.finish(Outcome::PlayerDead);
        } else {
            let body: Vec<EntityId> = ctx
                .em
                .get::<SnakeSegment>()
                .iter()
                .filter(|(_, segment)| segment.head == entity)
                .map(|(&e, _)| e)
                .collect();
            ctx.em.remove(entity);
            ctx.em.remove_all(body);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
