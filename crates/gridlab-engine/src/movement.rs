//! Movement resolution: the one primitive every system uses to relocate an
//! entity.
//!
//! [`move_entity`] resolves pushes depth-first but commits nothing until the
//! whole chain has been checked, so a rejected move leaves every position
//! untouched. [`teleport`] skips obstacle checks entirely.

use gridlab_ecs::prelude::*;

use crate::grid::Grid;

/// Move `entity` by `(dx, dy)`, pushing whatever it is allowed to push.
///
/// Returns `false` without mutating anything when the target is out of
/// bounds, a non-pushable solid refuses the mover, the mover cannot push, or
/// any link of the push chain cannot move. On success every moved entity
/// gets its [`Position`] shifted and its [`PositionDelta`] overwritten.
pub fn move_entity(em: &mut EntityManager, grid: &Grid, entity: EntityId, dx: i32, dy: i32) -> bool {
    if dx == 0 && dy == 0 {
        return false;
    }

    let mut chain = Vec::new();
    if !plan_move(em, grid, entity, dx, dy, &mut chain) {
        return false;
    }

    for moved in chain {
        if let Some(position) = em.component_mut::<Position>(moved) {
            *position = position.offset(dx, dy);
        }
        em.add_component(moved, PositionDelta { dx, dy });
    }
    true
}

/// Check whether `entity` can move, collecting it (and everything it pushes)
/// into `chain`. Performs no writes.
fn plan_move(
    em: &EntityManager,
    grid: &Grid,
    entity: EntityId,
    dx: i32,
    dy: i32,
    chain: &mut Vec<EntityId>,
) -> bool {
    let Some(&current) = em.component::<Position>(entity) else {
        return false;
    };
    let target = current.offset(dx, dy);
    if !grid.contains(target) {
        return false;
    }

    for (other, solid) in em.active_with::<Solid>() {
        if other == entity || em.component::<Position>(other) != Some(&target) {
            continue;
        }

        if em.has::<Pushable>(other) {
            if !em.has::<Pusher>(entity) {
                return false;
            }
            if !chain.contains(&other) && !plan_move(em, grid, other, dx, dy, chain) {
                return false;
            }
        } else if solid.blocks(entity) {
            return false;
        }
    }

    chain.push(entity);
    true
}

/// Place `entity` at `(x, y)` without obstacle checks.
///
/// Fails only when the cell is out of bounds or the entity has no position.
pub fn teleport(em: &mut EntityManager, grid: &Grid, entity: EntityId, x: i32, y: i32) -> bool {
    if !grid.in_bounds(x, y) {
        return false;
    }
    let Some(position) = em.component_mut::<Position>(entity) else {
        return false;
    };
    let (dx, dy) = position.delta_to(Position::new(x, y));
    *position = Position::new(x, y);
    em.add_component(entity, PositionDelta { dx, dy });
    true
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
