//! Enemy behaviours: patrol, fixed script, mirror, chase and snake.
//!
//! Every behaviour moves through [`move_entity`], so enemies obey the same
//! collision and push rules as the player. Snake followers are the only
//! exception: they are teleported into the cell their predecessor left.

use gridlab_ecs::prelude::*;

use super::passability_for;
use crate::grid::Grid;
use crate::movement::{move_entity, teleport};
use crate::search::{search, SearchOptions};
use crate::tick::TickContext;

// ---------------------------------------------------------------------------
// Patrol / fixed
// ---------------------------------------------------------------------------

/// Step along the patrol delta. Entities that could not move turn around and
/// retry once, after every patroller had its first attempt.
pub fn patrol(ctx: &mut TickContext<'_>) {
    if ctx.is_finished() {
        return;
    }

    let patrollers: Vec<(EntityId, Delta)> = ctx
        .em
        .active_with::<PatrolAi>()
        .map(|(e, ai)| (e, ai.delta))
        .collect();

    let mut blocked = Vec::new();
    for (entity, (dx, dy)) in patrollers {
        if !move_entity(ctx.em, ctx.grid, entity, dx, dy) {
            blocked.push((entity, (-dx, -dy)));
        }
    }

    for (entity, (dx, dy)) in blocked {
        move_entity(ctx.em, ctx.grid, entity, dx, dy);
        if let Some(ai) = ctx.em.component_mut::<PatrolAi>(entity) {
            ai.delta = (dx, dy);
        }
    }
}

/// Play the next scripted move, whether or not it succeeds.
pub fn fixed(ctx: &mut TickContext<'_>) {
    if ctx.is_finished() {
        return;
    }

    let scripted: Vec<EntityId> = ctx.em.active_with::<FixedAi>().map(|(e, _)| e).collect();
    for entity in scripted {
        let next = ctx
            .em
            .component_mut::<FixedAi>(entity)
            .and_then(FixedAi::next_move);
        if let Some((dx, dy)) = next {
            move_entity(ctx.em, ctx.grid, entity, dx, dy);
        }
    }
}

// ---------------------------------------------------------------------------
// Mirror
// ---------------------------------------------------------------------------

/// Copy the target's displacement from this tick, reflected per axis.
pub fn mirror(ctx: &mut TickContext<'_>) {
    if ctx.is_finished() {
        return;
    }

    let mirrors: Vec<(EntityId, MirrorAi)> = ctx
        .em
        .active_with::<MirrorAi>()
        .map(|(e, ai)| (e, *ai))
        .collect();

    for (entity, ai) in mirrors {
        let Some(&delta) = ctx.em.component::<PositionDelta>(ai.target) else {
            continue;
        };
        let (dx, dy) = ai.reflect(delta.dx, delta.dy);
        move_entity(ctx.em, ctx.grid, entity, dx, dy);
    }
}

// ---------------------------------------------------------------------------
// Chase
// ---------------------------------------------------------------------------

/// Walk toward the target along a fresh A* path, every `stagger` ticks.
pub fn chase(ctx: &mut TickContext<'_>) {
    if ctx.is_finished() {
        return;
    }

    let chasers: Vec<EntityId> = ctx.em.active_with::<ChaseAi>().map(|(e, _)| e).collect();
    for entity in chasers {
        let Some(ai) = ctx.em.component_mut::<ChaseAi>(entity) else {
            continue;
        };
        ai.tick = ai.tick.wrapping_add(1);
        if ai.tick % ai.stagger.max(1) != 0 {
            continue;
        }
        let ai = ai.clone();

        let Some(path) = plan_path(ctx.em, ctx.grid, entity, ai.target, ai.diagonal) else {
            continue;
        };
        follow_path(ctx.em, ctx.grid, entity, &path, ai.steps, &[]);
    }
}

// ---------------------------------------------------------------------------
// Snake
// ---------------------------------------------------------------------------

/// Move each snake head, dragging its segments along behind it.
///
/// A head without a fixed delta chases its target; one with a delta patrols,
/// turning around when blocked.
pub fn snake(ctx: &mut TickContext<'_>) {
    if ctx.is_finished() {
        return;
    }

    let heads: Vec<(EntityId, SnakeAi)> = ctx
        .em
        .active_with::<SnakeAi>()
        .map(|(e, ai)| (e, ai.clone()))
        .collect();

    for (head, ai) in heads {
        match ai.delta {
            None => {
                let Some(path) = plan_path(ctx.em, ctx.grid, head, ai.target, ai.diagonal) else {
                    continue;
                };
                follow_path(ctx.em, ctx.grid, head, &path, ai.steps, &ai.segments);
            }
            Some((mut dx, mut dy)) => {
                for _ in 0..ai.steps {
                    let Some(&vacated) = ctx.em.component::<Position>(head) else {
                        break;
                    };
                    if !move_entity(ctx.em, ctx.grid, head, dx, dy) {
                        (dx, dy) = (-dx, -dy);
                        if !move_entity(ctx.em, ctx.grid, head, dx, dy) {
                            continue;
                        }
                    }
                    drag_segments(ctx.em, ctx.grid, &ai.segments, vacated);
                }
                if let Some(state) = ctx.em.component_mut::<SnakeAi>(head) {
                    state.delta = Some((dx, dy));
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// A* path from `seeker` to `target`, falling back to the closest reachable
/// cell when the target is walled off.
fn plan_path(
    em: &EntityManager,
    grid: &Grid,
    seeker: EntityId,
    target: EntityId,
    diagonal: bool,
) -> Option<Vec<Position>> {
    let &start = em.component::<Position>(seeker)?;
    let Some(&goal) = em.component::<Position>(target) else {
        tracing::warn!(%seeker, %target, "chase target has no position");
        return None;
    };

    let passability = passability_for(em, grid, seeker);
    let options = SearchOptions {
        diagonal,
        fallback: true,
    };
    search(&passability, start, goal, options)
}

/// Take up to `steps` waypoints of `path`, stopping at the first refused
/// move. Each successful step drags `segments` behind the mover.
fn follow_path(
    em: &mut EntityManager,
    grid: &Grid,
    entity: EntityId,
    path: &[Position],
    steps: u32,
    segments: &[EntityId],
) {
    for &waypoint in path.iter().take(steps as usize) {
        let Some(&current) = em.component::<Position>(entity) else {
            return;
        };
        let (dx, dy) = current.delta_to(waypoint);
        if !move_entity(em, grid, entity, dx, dy) {
            return;
        }
        drag_segments(em, grid, segments, current);
    }
}

/// Shift every segment into the cell its predecessor just left.
fn drag_segments(em: &mut EntityManager, grid: &Grid, segments: &[EntityId], mut vacated: Position) {
    for &segment in segments {
        let Some(&previous) = em.component::<Position>(segment) else {
            break;
        };
        teleport(em, grid, segment, vacated.x, vacated.y);
        vacated = previous;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use crate::action::Action;
    use crate::config::{ChaseOptions, MirrorOptions};
    use crate::world::World;
    use gridlab_ecs::prelude::*;

    fn at(x: i32, y: i32) -> Option<Position> {
        Some(Position::new(x, y))
    }

    #[test]
    fn patrol_reverses_at_the_edge() {
        let mut world = World::new(4, 2);
        world.add_player(0, 1).unwrap();
        let enemy = world.add_patrol_enemy(1, 0, (1, 0)).unwrap();

        world.step(Action::None);
        assert_eq!(world.position(enemy), at(2, 0));
        world.step(Action::None);
        assert_eq!(world.position(enemy), at(3, 0));
        world.step(Action::None);
        assert_eq!(world.position(enemy), at(2, 0));
        assert_eq!(world.em().component::<PatrolAi>(enemy).unwrap().delta, (-1, 0));
    }

    #[test]
    fn patrol_stuck_both_ways_stays_put_but_turns() {
        let mut world = World::new(3, 2);
        world.add_player(0, 1).unwrap();
        world.add_wall(0, 0).unwrap();
        let enemy = world.add_patrol_enemy(1, 0, (1, 0)).unwrap();
        world.add_wall(2, 0).unwrap();

        world.step(Action::None);
        assert_eq!(world.position(enemy), at(1, 0));
        assert_eq!(world.em().component::<PatrolAi>(enemy).unwrap().delta, (-1, 0));
    }

    #[test]
    fn fixed_cycles_through_its_script() {
        let mut world = World::new(3, 3);
        world.add_player(0, 2).unwrap();
        let enemy = world.add_fixed_enemy(0, 0, vec![(1, 0), (0, 1)]).unwrap();

        world.step(Action::None);
        assert_eq!(world.position(enemy), at(1, 0));
        world.step(Action::None);
        assert_eq!(world.position(enemy), at(1, 1));
        world.step(Action::None);
        assert_eq!(world.position(enemy), at(2, 1));
        assert_eq!(world.em().component::<FixedAi>(enemy).unwrap().index, 1);
    }

    #[test]
    fn fixed_skips_refused_moves_but_advances() {
        let mut world = World::new(2, 2);
        world.add_player(1, 1).unwrap();
        let enemy = world.add_fixed_enemy(0, 0, vec![(-1, 0), (0, 1)]).unwrap();

        world.step(Action::None);
        assert_eq!(world.position(enemy), at(0, 0));
        world.step(Action::None);
        assert_eq!(world.position(enemy), at(0, 1));
    }

    #[test]
    fn mirror_reflects_vertical_motion() {
        let mut world = World::new(5, 5);
        world.add_player(2, 4).unwrap();
        let enemy = world.add_mirror_enemy(0, 2, MirrorOptions::default()).unwrap();

        world.step(Action::Up);
        assert_eq!(world.position(enemy), at(0, 3));
        world.step(Action::Right);
        assert_eq!(world.position(enemy), at(1, 3));
    }

    #[test]
    fn mirror_idles_when_target_did_not_move() {
        let mut world = World::new(3, 3);
        world.add_player(0, 0).unwrap();
        let enemy = world.add_mirror_enemy(2, 2, MirrorOptions::default()).unwrap();

        world.step(Action::Left);
        world.step(Action::None);
        assert_eq!(world.position(enemy), at(2, 2));
    }

    #[test]
    fn chase_takes_one_step_toward_player() {
        let mut world = World::new(4, 1);
        world.add_player(0, 0).unwrap();
        let enemy = world.add_chase_enemy(3, 0, ChaseOptions::default()).unwrap();

        world.step(Action::None);
        assert_eq!(world.position(enemy), at(2, 0));
        assert!(!world.state().is_finished());
    }

    #[test]
    fn chase_tick_counter_wraps() {
        let mut world = World::new(4, 1);
        world.add_player(0, 0).unwrap();
        let enemy = world.add_chase_enemy(3, 0, ChaseOptions::default()).unwrap();
        world.em_mut().component_mut::<ChaseAi>(enemy).unwrap().tick = u32::MAX;

        world.step(Action::None);
        assert_eq!(world.em().component::<ChaseAi>(enemy).unwrap().tick, 0);
        assert_eq!(world.position(enemy), at(2, 0));
    }

    #[test]
    fn chase_with_two_steps_and_stagger() {
        let mut world = World::new(6, 1);
        world.add_player(0, 0).unwrap();
        let options = ChaseOptions {
            steps: 2,
            stagger: 2,
            ..ChaseOptions::default()
        };
        let enemy = world.add_chase_enemy(5, 0, options).unwrap();

        world.step(Action::None);
        assert_eq!(world.position(enemy), at(5, 0));
        world.step(Action::None);
        assert_eq!(world.position(enemy), at(3, 0));
    }

    #[test]
    fn chase_catching_player_kills() {
        let mut world = World::new(3, 1);
        world.add_player(0, 0).unwrap();
        world.add_chase_enemy(1, 0, ChaseOptions::default()).unwrap();

        world.step(Action::None);
        assert!(world.state().player_dead());
    }

    #[test]
    fn chase_routes_around_walls() {
        let mut world = World::new(3, 3);
        world.add_player(0, 0).unwrap();
        world.add_wall(1, 0).unwrap();
        world.add_wall(1, 1).unwrap();
        let enemy = world.add_chase_enemy(2, 0, ChaseOptions::default()).unwrap();

        world.step(Action::None);
        assert_eq!(world.position(enemy), at(2, 1));
    }

    #[test]
    fn chase_without_target_position_stays() {
        let mut world = World::new(3, 1);
        let player = world.add_player(0, 0).unwrap();
        let enemy = world.add_chase_enemy(2, 0, ChaseOptions::default()).unwrap();
        world.em_mut().remove_component::<Position>(player).unwrap();

        world.step(Action::None);
        assert_eq!(world.position(enemy), at(2, 0));
    }

    #[test]
    fn chasing_snake_drags_segments() {
        let mut world = World::new(6, 1);
        world.add_player(0, 0).unwrap();
        let snake = world.add_snake_enemy(&[(3, 0), (4, 0), (5, 0)], None).unwrap();

        world.step(Action::None);
        assert_eq!(world.position(snake[0]), at(2, 0));
        assert_eq!(world.position(snake[1]), at(3, 0));
        assert_eq!(world.position(snake[2]), at(4, 0));
    }

    #[test]
    fn patrolling_snake_turns_its_body_around_the_head() {
        let mut world = World::new(5, 3);
        world.add_player(0, 2).unwrap();
        let snake = world
            .add_snake_enemy(&[(2, 1), (1, 1), (0, 1)], Some((1, 0)))
            .unwrap();

        world.step(Action::None);
        assert_eq!(world.position(snake[0]), at(3, 1));
        assert_eq!(world.position(snake[2]), at(1, 1));
        world.step(Action::None);
        assert_eq!(world.position(snake[0]), at(4, 1));
        world.step(Action::None);
        // Blocked by the edge and then by its own neck: the head holds and
        // the delta stays reversed.
        assert_eq!(world.position(snake[0]), at(4, 1));
        assert_eq!(
            world.em().component::<SnakeAi>(snake[0]).unwrap().delta,
            Some((-1, 0))
        );
    }
}
