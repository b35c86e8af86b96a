//! Game systems.
//!
//! Every system is a plain [`SystemFn`](crate::tick::SystemFn) and is a no-op
//! once the game is finished, with the exception of the timer system, which
//! guards itself.

pub mod action;
pub mod ai;
pub mod interaction;
pub mod switch;
pub mod timer;

use gridlab_ecs::prelude::*;

use crate::grid::Grid;
use crate::search::PassabilityGrid;

/// Passability for `seeker`: every active solid other than the seeker
/// itself is blocked.
pub(crate) fn passability_for(em: &EntityManager, grid: &Grid, seeker: EntityId) -> PassabilityGrid {
    let mut passability = PassabilityGrid::new(grid.width, grid.height);
    for (other, _) in em.active_with::<Solid>() {
        if other == seeker {
            continue;
        }
        if let Some(&position) = em.component::<Position>(other) {
            passability.block(position);
        }
    }
    passability
}

/// Active entities other than `except` standing on `cell`.
pub(crate) fn occupants(em: &EntityManager, cell: Position, except: Option<EntityId>) -> Vec<EntityId> {
    em.get::<Position>()
        .iter()
        .filter(|(&e, &p)| p == cell && Some(e) != except && em.is_active(e))
        .map(|(&e, _)| e)
        .collect()
}
