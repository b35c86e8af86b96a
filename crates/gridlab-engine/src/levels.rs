//! Built-in levels.
//!
//! Each level builds its world from a text layout plus factory calls for the
//! pieces layouts cannot express (enemies, switches, timers), and records a
//! winning action sequence that the verification tests replay.

use gridlab_ecs::component::EntityKind;

use crate::action::{parse_moves, Action};
use crate::config::{ChaseOptions, MirrorOptions, WorldConfig};
use crate::level::{Difficulty, Level, LevelError};
use crate::world::{World, WorldError};

/// Every built-in level, easiest first.
pub fn all() -> Vec<Box<dyn Level>> {
    vec![
        Box::new(Empty),
        Box::new(Fog),
        Box::new(Spike),
        Box::new(Push),
        Box::new(Door),
        Box::new(Timer),
        Box::new(Switch),
        Box::new(Toggle),
        Box::new(Patrol),
        Box::new(Mirror),
        Box::new(Chase),
        Box::new(Snake),
    ]
}

/// Look up a built-in level by name.
pub fn create(name: &str) -> Result<Box<dyn Level>, LevelError> {
    all()
        .into_iter()
        .find(|level| level.name() == name)
        .ok_or_else(|| LevelError::Unknown {
            name: name.to_owned(),
        })
}

/// A world from `layout`, limited to `kinds`.
fn layout_world(name: &str, layout: &str, kinds: &[EntityKind]) -> Result<World, WorldError> {
    let config = WorldConfig::new(name, 0, 0).allowing(kinds.iter().copied());
    World::from_layout_with(config, layout)
}

// ---------------------------------------------------------------------------
// Basics
// ---------------------------------------------------------------------------

pub struct Empty;

impl Level for Empty {
    fn name(&self) -> &'static str {
        "empty"
    }

    fn difficulty(&self) -> Difficulty {
        Difficulty::Trivial
    }

    fn build(&self) -> Result<World, WorldError> {
        layout_world(self.name(), "@...o", &[EntityKind::Player, EntityKind::Goal])
    }

    fn solve(&self) -> Option<Vec<Action>> {
        parse_moves("rrrr").ok()
    }
}

pub struct Fog;

impl Level for Fog {
    fn name(&self) -> &'static str {
        "fog"
    }

    fn difficulty(&self) -> Difficulty {
        Difficulty::Trivial
    }

    fn build(&self) -> Result<World, WorldError> {
        layout_world(
            self.name(),
            "
            @~~~
            ~~~~
            ~~~o
            ",
            &[EntityKind::Player, EntityKind::Goal, EntityKind::Fog],
        )
    }

    fn solve(&self) -> Option<Vec<Action>> {
        parse_moves("rrrdd").ok()
    }
}

pub struct Spike;

impl Level for Spike {
    fn name(&self) -> &'static str {
        "spike"
    }

    fn difficulty(&self) -> Difficulty {
        Difficulty::Easy
    }

    fn build(&self) -> Result<World, WorldError> {
        layout_world(
            self.name(),
            "
            @..^....
            ...^....
            ........
            ...^..o.
            ",
            &[EntityKind::Player, EntityKind::Goal, EntityKind::Spike],
        )
    }

    fn solve(&self) -> Option<Vec<Action>> {
        parse_moves("dd rrrrrr d").ok()
    }
}

pub struct Push;

impl Level for Push {
    fn name(&self) -> &'static str {
        "push"
    }

    fn difficulty(&self) -> Difficulty {
        Difficulty::Easy
    }

    fn build(&self) -> Result<World, WorldError> {
        layout_world(
            self.name(),
            "
            .....
            @0..o
            .....
            ",
            &[EntityKind::Player, EntityKind::Goal, EntityKind::Block],
        )
    }

    fn solve(&self) -> Option<Vec<Action>> {
        parse_moves("rrr urd").ok()
    }
}

pub struct Door;

impl Level for Door {
    fn name(&self) -> &'static str {
        "door"
    }

    fn difficulty(&self) -> Difficulty {
        Difficulty::Easy
    }

    fn build(&self) -> Result<World, WorldError> {
        layout_world(
            self.name(),
            "
            @...k..
            .......
            ^^#!#^^
            ...o...
            ",
            &[
                EntityKind::Player,
                EntityKind::Goal,
                EntityKind::Key,
                EntityKind::Door,
                EntityKind::Wall,
                EntityKind::Spike,
            ],
        )
    }

    fn solve(&self) -> Option<Vec<Action>> {
        parse_moves("rrrr dl dd").ok()
    }
}

pub struct Timer;

impl Timer {
    pub const LIMIT: u32 = 3;
}

impl Level for Timer {
    fn name(&self) -> &'static str {
        "timer"
    }

    fn difficulty(&self) -> Difficulty {
        Difficulty::Moderate
    }

    fn build(&self) -> Result<World, WorldError> {
        let mut world = layout_world(
            self.name(),
            "
            ..+..
            @...o
            .....
            ",
            &[EntityKind::Player, EntityKind::Goal, EntityKind::TimerReset],
        )?;
        world.add_timer(Self::LIMIT, None)?;
        Ok(world)
    }

    fn solve(&self) -> Option<Vec<Action>> {
        parse_moves("rru rrd").ok()
    }
}

// ---------------------------------------------------------------------------
// Switches
// ---------------------------------------------------------------------------

const GATED: &str = "
    ..###
    @...o
    ..###
";

const SWITCH_KINDS: [EntityKind; 5] = [
    EntityKind::Player,
    EntityKind::Goal,
    EntityKind::Wall,
    EntityKind::SwitchPressable,
    EntityKind::SwitchUnpressable,
];

pub struct Switch;

impl Level for Switch {
    fn name(&self) -> &'static str {
        "switch"
    }

    fn difficulty(&self) -> Difficulty {
        Difficulty::Moderate
    }

    fn build(&self) -> Result<World, WorldError> {
        let mut world = layout_world(self.name(), GATED, &SWITCH_KINDS)?;
        world.add_switch((1, 0), &[(3, 1)], &[])?;
        Ok(world)
    }

    fn solve(&self) -> Option<Vec<Action>> {
        parse_moves("ur drrr").ok()
    }
}

pub struct Toggle;

impl Level for Toggle {
    fn name(&self) -> &'static str {
        "toggle"
    }

    fn difficulty(&self) -> Difficulty {
        Difficulty::Moderate
    }

    fn build(&self) -> Result<World, WorldError> {
        let mut world = layout_world(self.name(), GATED, &SWITCH_KINDS)?;
        world.add_switch_toggle((1, 0), (1, 2), &[(3, 1)], &[])?;
        Ok(world)
    }

    fn solve(&self) -> Option<Vec<Action>> {
        // The bottom switch does nothing until the top one has been pressed.
        parse_moves("dr uu drrr").ok()
    }
}

// ---------------------------------------------------------------------------
// Enemies
// ---------------------------------------------------------------------------

pub struct Patrol;

impl Level for Patrol {
    fn name(&self) -> &'static str {
        "patrol"
    }

    fn difficulty(&self) -> Difficulty {
        Difficulty::Moderate
    }

    fn build(&self) -> Result<World, WorldError> {
        let mut world = World::from_layout(
            self.name(),
            "
            ##.##
            ##.##
            @...o
            ##.##
            ##.##
            ",
        )?;
        world.add_patrol_enemy(2, 0, (0, 1))?;
        Ok(world)
    }

    fn solve(&self) -> Option<Vec<Action>> {
        parse_moves("rnn rrr").ok()
    }
}

pub struct Mirror;

impl Level for Mirror {
    fn name(&self) -> &'static str {
        "mirror"
    }

    fn difficulty(&self) -> Difficulty {
        Difficulty::Hard
    }

    fn build(&self) -> Result<World, WorldError> {
        let mut world = World::from_layout(
            self.name(),
            "
            ..#.o
            .....
            @....
            ",
        )?;
        world.add_mirror_enemy(0, 0, MirrorOptions::default())?;
        Ok(world)
    }

    fn solve(&self) -> Option<Vec<Action>> {
        // Stall the mirror against the wall so the columns drift apart.
        parse_moves("rr ur ur").ok()
    }
}

pub struct Chase;

impl Level for Chase {
    fn name(&self) -> &'static str {
        "chase"
    }

    fn difficulty(&self) -> Difficulty {
        Difficulty::Hard
    }

    fn build(&self) -> Result<World, WorldError> {
        let mut world = World::from_layout(
            self.name(),
            "
            ........
            ..@....o
            ",
        )?;
        world.add_chase_enemy(0, 1, ChaseOptions::default())?;
        Ok(world)
    }

    fn solve(&self) -> Option<Vec<Action>> {
        parse_moves("rrrrr").ok()
    }
}

pub struct Snake;

impl Level for Snake {
    fn name(&self) -> &'static str {
        "snake"
    }

    fn difficulty(&self) -> Difficulty {
        Difficulty::Expert
    }

    fn build(&self) -> Result<World, WorldError> {
        let mut world = World::from_layout(
            self.name(),
            "
            ..........
            ....@....o
            ..........
            ",
        )?;
        world.add_snake_enemy(&[(2, 1), (1, 1), (0, 1)], None)?;
        Ok(world)
    }

    fn solve(&self) -> Option<Vec<Action>> {
        parse_moves("rrrrr").ok()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn names_are_unique_and_resolvable() {
        let names: Vec<&str> = all().iter().map(|level| level.name()).collect();
        let unique: BTreeSet<&str> = names.iter().copied().collect();
        assert_eq!(unique.len(), names.len());
        for name in names {
            assert_eq!(create(name).unwrap().name(), name);
        }
    }

    #[test]
    fn unknown_level_is_an_error() {
        assert_eq!(
            create("nope").err(),
            Some(LevelError::Unknown {
                name: "nope".to_owned()
            })
        );
    }

    #[test]
    fn every_level_builds_and_has_a_solution() {
        for level in all() {
            let world = level.build().unwrap();
            assert!(world.player().is_some(), "{} has no player", level.name());
            assert!(level.solve().is_some_and(|moves| !moves.is_empty()));
        }
    }

    #[test]
    fn restricted_levels_reject_foreign_kinds() {
        let mut world = Spike.build().unwrap();
        assert_eq!(
            world.add_key(0, 1),
            Err(WorldError::KindNotAllowed {
                kind: EntityKind::Key
            })
        );
    }
}
