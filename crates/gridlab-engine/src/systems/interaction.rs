//! Death, key/door and goal systems.

use gridlab_ecs::prelude::*;

use super::occupants;
use crate::state::Outcome;
use crate::tick::TickContext;

/// The player dies when another active entity on its cell is deadly.
pub fn check_death(ctx: &mut TickContext<'_>) {
    if ctx.is_finished() {
        return;
    }
    let Some(cell) = ctx.player_position() else {
        return;
    };

    let killer = occupants(ctx.em, cell, ctx.player)
        .into_iter()
        .find(|&e| ctx.em.has::<Deadly>(e));
    if let Some(killer) = killer {
        tracing::debug!(%killer, %cell, "player killed");
        ctx.finish(Outcome::PlayerDead);
    }
}

/// Collectors pick up keys on their cell. Holding at least one key opens
/// every adjacent door, spending one key per door even past zero.
pub fn unlock_doors(ctx: &mut TickContext<'_>) {
    if ctx.is_finished() {
        return;
    }

    let collectors: Vec<EntityId> = ctx.em.active_with::<KeyCollector>().map(|(e, _)| e).collect();
    for collector in collectors {
        let Some(&cell) = ctx.em.component::<Position>(collector) else {
            continue;
        };

        let keys: Vec<EntityId> = ctx
            .em
            .active_with::<Key>()
            .map(|(e, _)| e)
            .filter(|&e| ctx.em.component::<Position>(e) == Some(&cell))
            .collect();
        let mut count = ctx.em.component::<KeyCollector>(collector).map_or(0, |c| c.count);
        count += keys.len() as i32;
        for key in &keys {
            tracing::debug!(%collector, key = %key, "key collected");
        }
        ctx.em.remove_all(keys);

        if count >= 1 {
            let doors: Vec<EntityId> = ctx
                .em
                .active_with::<Door>()
                .map(|(e, _)| e)
                .filter(|&e| {
                    ctx.em
                        .component::<Position>(e)
                        .is_some_and(|&door| cell.is_adjacent(door))
                })
                .collect();
            for door in &doors {
                tracing::debug!(%collector, door = %door, "door unlocked");
            }
            count -= doors.len() as i32;
            ctx.em.remove_all(doors);
        }

        if let Some(keys_held) = ctx.em.component_mut::<KeyCollector>(collector) {
            keys_held.count = count;
        }
    }
}

/// The player wins on the cell of any active goal.
pub fn check_goal(ctx: &mut TickContext<'_>) {
    if ctx.is_finished() {
        return;
    }
    let Some(cell) = ctx.player_position() else {
        return;
    };

    let reached = ctx
        .em
        .active_with::<Goal>()
        .any(|(e, _)| ctx.em.component::<Position>(e) == Some(&cell));
    if reached {
        ctx.finish(Outcome::GoalReached);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use crate::action::Action;
    use crate::state::Status;
    use crate::world::World;
    use gridlab_ecs::prelude::*;

    #[test]
    fn walking_onto_spike_kills() {
        let mut world = World::new(3, 1);
        world.add_player(0, 0).unwrap();
        world.add_spike(1, 0).unwrap();
        world.step(Action::Right);
        assert!(world.state().player_dead());
        assert_eq!(world.state().status(), Status::PlayerDead);
    }

    #[test]
    fn inactive_spike_is_harmless() {
        let mut world = World::new(3, 1);
        world.add_player(0, 0).unwrap();
        let spike = world.add_spike(1, 0).unwrap();
        world.em_mut().set_active(spike, false);
        world.step(Action::Right);
        assert!(!world.state().is_finished());
    }

    #[test]
    fn key_then_door() {
        let mut world = World::new(3, 3);
        let player = world.add_player(0, 0).unwrap();
        let key = world.add_key(1, 0).unwrap();
        let door = world.add_door(2, 1).unwrap();

        world.step(Action::Right);
        assert!(!world.em().has::<Key>(key));
        // (1,0) is diagonal to the door; only orthogonal neighbours unlock.
        assert!(world.em().has::<Door>(door));
        assert_eq!(world.em().component::<KeyCollector>(player).unwrap().count, 1);

        world.step(Action::Down);
        assert!(!world.em().has::<Door>(door));
        assert!(world.em().component::<Position>(door).is_none());
        assert_eq!(world.em().component::<KeyCollector>(player).unwrap().count, 0);
    }

    #[test]
    fn one_key_opens_every_adjacent_door_and_leaves_a_debt() {
        let mut world = World::new(5, 3);
        let player = world.add_player(2, 0).unwrap();
        world.add_key(2, 1).unwrap();
        world.add_key(2, 2).unwrap();
        let left = world.add_door(1, 1).unwrap();
        let right = world.add_door(3, 1).unwrap();
        let below = world.add_door(1, 2).unwrap();

        world.step(Action::Down);
        assert!(!world.em().has::<Door>(left));
        assert!(!world.em().has::<Door>(right));
        assert_eq!(world.em().component::<KeyCollector>(player).unwrap().count, -1);

        // The second key only pays the debt back.
        world.step(Action::Down);
        assert!(world.em().has::<Door>(below));
        assert_eq!(world.em().component::<KeyCollector>(player).unwrap().count, 0);
    }

    #[test]
    fn door_stays_locked_without_key() {
        let mut world = World::new(3, 1);
        world.add_player(0, 0).unwrap();
        let door = world.add_door(1, 0).unwrap();
        world.step(Action::Right);
        assert!(world.em().has::<Door>(door));
        assert_eq!(world.position(world.player().unwrap()), Some(Position::new(0, 0)));
    }

    #[test]
    fn reaching_goal_wins_and_spawns_marker() {
        let mut world = World::new(2, 1);
        world.add_player(0, 0).unwrap();
        world.add_goal(1, 0).unwrap();
        world.step(Action::Right);
        assert!(world.state().goal_reached());

        let markers: Vec<_> = world
            .em()
            .get::<Identity>()
            .iter()
            .filter(|(_, id)| id.kind == EntityKind::GoalReached)
            .map(|(&e, _)| e)
            .collect();
        assert_eq!(markers.len(), 1);
        assert_eq!(world.position(markers[0]), Some(Position::new(1, 0)));
    }
}
