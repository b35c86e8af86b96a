//! The [`World`] facade: grid, component store, outcome state and the
//! standard tick pipeline behind a small driving API.
//!
//! Levels populate a world through the `add_*` factories (or a text
//! layout), then a driver calls [`World::step`] once per turn and inspects
//! [`World::state`].
//!
//! # Example
//!
//! ```
//! use gridlab_engine::prelude::*;
//!
//! let mut world = World::from_layout("corridor", "@..o").unwrap();
//! world.step(Action::Right);
//! world.step(Action::Right);
//! world.step(Action::Right);
//! assert!(world.state().goal_reached());
//! assert_eq!(world.turn(), 4);
//! ```

use gridlab_ecs::prelude::*;

use crate::action::Action;
use crate::config::{ChaseOptions, MirrorOptions, WorldConfig};
use crate::digest;
use crate::grid::Grid;
use crate::state::{Outcome, OutcomeObserver, OutcomeState, Status};
use crate::tick::{Pipeline, TickContext};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Illegal world configuration, reported while a level is being built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    #[error("player already registered as {existing}")]
    DuplicatePlayer { existing: EntityId },

    #[error("no player registered")]
    PlayerNotRegistered,

    #[error("a switch needs at least one switchable position")]
    NoSwitchables,

    #[error("a switch ring needs at least two members, got {len}")]
    RingTooSmall { len: usize },

    #[error("a snake needs at least one segment")]
    EmptySnake,

    #[error("unknown layout symbol {symbol:?} at ({x}, {y})")]
    UnknownSymbol { symbol: char, x: i32, y: i32 },

    #[error("layout row {row} has {found} cells, expected {expected}")]
    RaggedLayout {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("layout is empty")]
    EmptyLayout,

    #[error("{kind} is not allowed in this level")]
    KindNotAllowed { kind: EntityKind },

    #[error("({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },

    #[error(transparent)]
    Ecs(#[from] EcsError),
}

/// Ids created by one switch factory call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwitchSet {
    /// The switches, in ring order.
    pub switches: Vec<EntityId>,
    /// The walls they toggle, initially active ones first.
    pub switchables: Vec<EntityId>,
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// A running puzzle.
pub struct World {
    config: WorldConfig,
    em: EntityManager,
    grid: Grid,
    state: OutcomeState,
    pipeline: Pipeline,
    observers: Vec<OutcomeObserver>,
    pending: Vec<(EntityId, Action)>,
    turn: u64,
    player: Option<EntityId>,
}

impl World {
    /// An empty `width x height` world with every kind allowed.
    pub fn new(width: i32, height: i32) -> Self {
        Self::from_config(WorldConfig {
            width,
            height,
            ..WorldConfig::default()
        })
    }

    /// An empty world built from `config`, running the standard pipeline.
    pub fn from_config(config: WorldConfig) -> Self {
        Self {
            em: EntityManager::new(),
            grid: Grid::new(config.width, config.height),
            state: OutcomeState::new(),
            pipeline: Pipeline::standard(),
            observers: vec![clear_fog, spawn_outcome_marker],
            pending: Vec::new(),
            turn: 1,
            player: None,
            config,
        }
    }

    /// A world sized to fit `layout`, with its symbols placed.
    pub fn from_layout(name: &str, layout: &str) -> Result<Self, WorldError> {
        Self::from_layout_with(WorldConfig::new(name, 0, 0), layout)
    }

    /// Like [`from_layout`](Self::from_layout), keeping the name and allowed
    /// kinds of `config`. Its width and height are replaced by the layout's.
    pub fn from_layout_with(mut config: WorldConfig, layout: &str) -> Result<Self, WorldError> {
        let rows = parse_layout(layout)?;
        config.width = rows[0].len() as i32;
        config.height = rows.len() as i32;
        let mut world = Self::from_config(config);
        world.place_rows(&rows)?;
        Ok(world)
    }

    // -- driving ------------------------------------------------------------

    /// Advance one tick with `action` for the player.
    ///
    /// Returns `false` (and does nothing) once the game is finished.
    pub fn step(&mut self, action: Action) -> bool {
        self.step_with(Some(action), &[])
    }

    /// Advance one tick with an optional player action followed by actions
    /// for arbitrary entities, applied in order.
    pub fn step_with(&mut self, action: Option<Action>, extra: &[(EntityId, Action)]) -> bool {
        if self.state.is_finished() {
            return false;
        }

        if let Some(action) = action {
            match self.player {
                Some(player) => self.pending.push((player, action)),
                None => tracing::debug!(%action, "no player registered; action dropped"),
            }
        }
        self.pending.extend_from_slice(extra);

        let _span = tracing::debug_span!("tick", world = %self.config.name, turn = self.turn).entered();
        let mut ctx = TickContext::new(
            &mut self.em,
            &self.grid,
            &mut self.state,
            self.player,
            &mut self.pending,
            &self.observers,
        );
        self.pipeline.run(&mut ctx);
        self.pending.clear();
        self.turn += 1;
        true
    }

    /// Quit the session. Has no effect on a finished game.
    pub fn terminate(&mut self) {
        self.state.terminate();
    }

    /// Register an extra observer, run after the built-in ones.
    pub fn add_observer(&mut self, observer: OutcomeObserver) {
        self.observers.push(observer);
    }

    // -- queries ------------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn em(&self) -> &EntityManager {
        &self.em
    }

    /// Direct store access for level authoring.
    pub fn em_mut(&mut self) -> &mut EntityManager {
        &mut self.em
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn state(&self) -> &OutcomeState {
        &self.state
    }

    pub fn status(&self) -> Status {
        self.state.status()
    }

    /// The current turn, starting at 1.
    pub fn turn(&self) -> u64 {
        self.turn
    }

    pub fn player(&self) -> Option<EntityId> {
        self.player
    }

    /// Where `entity` stands, if it has a position.
    pub fn position(&self, entity: EntityId) -> Option<Position> {
        self.em.component::<Position>(entity).copied()
    }

    /// See [`digest::state_hash`].
    pub fn state_hash(&self) -> String {
        digest::state_hash(&self.em, &self.state, self.turn)
    }

    // -- factories ----------------------------------------------------------

    /// Place the player. Only one player may be registered.
    pub fn add_player(&mut self, x: i32, y: i32) -> Result<EntityId, WorldError> {
        if let Some(existing) = self.player {
            return Err(WorldError::DuplicatePlayer { existing });
        }
        let e = self.spawn(EntityKind::Player, x, y)?;
        self.em.add_component(e, Pusher);
        self.em.add_component(e, KeyCollector::default());
        self.player = Some(e);
        Ok(e)
    }

    pub fn add_goal(&mut self, x: i32, y: i32) -> Result<EntityId, WorldError> {
        let e = self.spawn(EntityKind::Goal, x, y)?;
        self.em.add_component(e, Goal);
        Ok(e)
    }

    /// A key; collectors pick it up by stepping on it.
    pub fn add_key(&mut self, x: i32, y: i32) -> Result<EntityId, WorldError> {
        let e = self.spawn(EntityKind::Key, x, y)?;
        self.em.add_component(e, Key);
        Ok(e)
    }

    /// A solid door, removed when a collector holding a key stands next to it.
    pub fn add_door(&mut self, x: i32, y: i32) -> Result<EntityId, WorldError> {
        let e = self.spawn(EntityKind::Door, x, y)?;
        self.em.add_component(e, Solid::default());
        self.em.add_component(e, Door);
        Ok(e)
    }

    pub fn add_wall(&mut self, x: i32, y: i32) -> Result<EntityId, WorldError> {
        let e = self.spawn(EntityKind::Wall, x, y)?;
        self.em.add_component(e, Solid::default());
        Ok(e)
    }

    /// A solid block the player can push.
    pub fn add_block(&mut self, x: i32, y: i32) -> Result<EntityId, WorldError> {
        let e = self.spawn(EntityKind::Block, x, y)?;
        self.em.add_component(e, Solid::default());
        self.em.add_component(e, Pushable);
        Ok(e)
    }

    /// A deadly, non-solid hazard.
    pub fn add_spike(&mut self, x: i32, y: i32) -> Result<EntityId, WorldError> {
        let e = self.spawn(EntityKind::Spike, x, y)?;
        self.em.add_component(e, Deadly);
        Ok(e)
    }

    pub fn add_fog(&mut self, x: i32, y: i32) -> Result<EntityId, WorldError> {
        let e = self.spawn(EntityKind::Fog, x, y)?;
        self.em.add_component(e, Fog);
        Ok(e)
    }

    pub fn add_timer_reset(&mut self, x: i32, y: i32) -> Result<EntityId, WorldError> {
        let e = self.spawn(EntityKind::TimerReset, x, y)?;
        self.em.add_component(e, TimerReset);
        Ok(e)
    }

    /// Attach a `limit`-tick timer to `entity`, or to the player when `None`.
    pub fn add_timer(&mut self, limit: u32, entity: Option<EntityId>) -> Result<(), WorldError> {
        let entity = match entity {
            Some(entity) => entity,
            None => self.player.ok_or(WorldError::PlayerNotRegistered)?,
        };
        self.em.add_component(entity, Timer::new(limit));
        Ok(())
    }

    /// An enemy that walks toward the player along A* paths.
    pub fn add_chase_enemy(&mut self, x: i32, y: i32, options: ChaseOptions) -> Result<EntityId, WorldError> {
        let target = self.player.ok_or(WorldError::PlayerNotRegistered)?;
        let e = self.spawn_enemy(x, y)?;
        self.em.add_component(
            e,
            ChaseAi {
                target,
                steps: options.steps,
                stagger: options.stagger,
                tick: 0,
                diagonal: options.diagonal,
            },
        );
        Ok(e)
    }

    /// An enemy that walks `delta` every tick and turns around when blocked.
    /// Like every enemy it needs the player placed first.
    pub fn add_patrol_enemy(&mut self, x: i32, y: i32, delta: Delta) -> Result<EntityId, WorldError> {
        let e = self.spawn_enemy(x, y)?;
        self.em.add_component(e, PatrolAi { delta });
        Ok(e)
    }

    /// An enemy that cycles through `moves`.
    pub fn add_fixed_enemy(&mut self, x: i32, y: i32, moves: Vec<Delta>) -> Result<EntityId, WorldError> {
        let e = self.spawn_enemy(x, y)?;
        self.em.add_component(e, FixedAi { moves, index: 0 });
        Ok(e)
    }

    /// An enemy that copies the player's moves, reflected per `options`.
    pub fn add_mirror_enemy(&mut self, x: i32, y: i32, options: MirrorOptions) -> Result<EntityId, WorldError> {
        let target = self.player.ok_or(WorldError::PlayerNotRegistered)?;
        let e = self.spawn_enemy(x, y)?;
        self.em.add_component(
            e,
            MirrorAi {
                target,
                mirror_x: options.mirror_x,
                mirror_y: options.mirror_y,
            },
        );
        Ok(e)
    }

    /// A multi-cell enemy, head first. With `delta == None` the head chases
    /// the player; otherwise it patrols along `delta`.
    pub fn add_snake_enemy(
        &mut self,
        positions: &[(i32, i32)],
        delta: Option<Delta>,
    ) -> Result<Vec<EntityId>, WorldError> {
        if positions.is_empty() {
            return Err(WorldError::EmptySnake);
        }
        let target = self.player.ok_or(WorldError::PlayerNotRegistered)?;
        self.check_kind(EntityKind::Enemy)?;
        for &(x, y) in positions {
            self.check_bounds(x, y)?;
        }

        let mut body = Vec::with_capacity(positions.len());
        for &(x, y) in positions {
            body.push(self.spawn_enemy(x, y)?);
        }
        let head = body[0];
        for &segment in &body[1..] {
            self.em.add_component(segment, SnakeSegment { head });
        }
        self.em.add_component(
            head,
            SnakeAi {
                target,
                segments: body[1..].to_vec(),
                steps: 1,
                diagonal: false,
                delta,
            },
        );
        Ok(body)
    }

    /// A solo switch toggling walls at `active` (initially solid) and
    /// `inactive` (initially open) positions.
    pub fn add_switch(
        &mut self,
        position: (i32, i32),
        active: &[(i32, i32)],
        inactive: &[(i32, i32)],
    ) -> Result<SwitchSet, WorldError> {
        self.check_switch(&[position], active, inactive)?;
        let switch = self.spawn(EntityKind::SwitchPressable, position.0, position.1)?;
        self.em.add_component(switch, Switch::solo());
        let switches = vec![switch];
        let switchables = self.add_switchables(&switches, active, inactive)?;
        Ok(SwitchSet {
            switches,
            switchables,
        })
    }

    /// Two switches forming a ring; `first` starts pressable.
    pub fn add_switch_toggle(
        &mut self,
        first: (i32, i32),
        second: (i32, i32),
        active: &[(i32, i32)],
        inactive: &[(i32, i32)],
    ) -> Result<SwitchSet, WorldError> {
        self.add_switch_ring(&[first, second], active, inactive)
    }

    /// A ring of switches where pressing the pressable member hands
    /// pressability to the next one. The first member starts pressable.
    pub fn add_switch_ring(
        &mut self,
        positions: &[(i32, i32)],
        active: &[(i32, i32)],
        inactive: &[(i32, i32)],
    ) -> Result<SwitchSet, WorldError> {
        if positions.len() < 2 {
            return Err(WorldError::RingTooSmall {
                len: positions.len(),
            });
        }
        self.check_switch(positions, active, inactive)?;

        let mut switches = Vec::with_capacity(positions.len());
        for (i, &(x, y)) in positions.iter().enumerate() {
            let kind = if i == 0 {
                EntityKind::SwitchPressable
            } else {
                EntityKind::SwitchUnpressable
            };
            switches.push(self.spawn(kind, x, y)?);
        }
        for (i, &switch) in switches.iter().enumerate() {
            self.em
                .add_component(switch, Switch::grouped(switches.clone(), i == 0));
        }
        let switchables = self.add_switchables(&switches, active, inactive)?;
        Ok(SwitchSet {
            switches,
            switchables,
        })
    }

    // -- layouts ------------------------------------------------------------

    /// Place the symbols of `layout` into this world.
    ///
    /// `.` empty, `#` wall, `@` player, `o` goal, `k` key, `!` door,
    /// `0` block, `+` timer reset, `^` spike, `~` fog. The player is placed
    /// before everything else.
    pub fn place_layout(&mut self, layout: &str) -> Result<(), WorldError> {
        let rows = parse_layout(layout)?;
        self.place_rows(&rows)
    }

    fn place_rows(&mut self, rows: &[Vec<char>]) -> Result<(), WorldError> {
        let cells: Vec<(char, i32, i32)> = rows
            .iter()
            .enumerate()
            .flat_map(|(y, row)| {
                row.iter()
                    .enumerate()
                    .map(move |(x, &symbol)| (symbol, x as i32, y as i32))
            })
            .collect();

        for &(symbol, x, y) in cells.iter().filter(|(s, _, _)| *s == '@') {
            self.place_symbol(symbol, x, y)?;
        }
        for &(symbol, x, y) in cells.iter().filter(|(s, _, _)| *s != '@') {
            self.place_symbol(symbol, x, y)?;
        }
        Ok(())
    }

    fn place_symbol(&mut self, symbol: char, x: i32, y: i32) -> Result<(), WorldError> {
        match symbol {
            '.' => return Ok(()),
            '#' => self.add_wall(x, y)?,
            '@' => self.add_player(x, y)?,
            'o' => self.add_goal(x, y)?,
            'k' => self.add_key(x, y)?,
            '!' => self.add_door(x, y)?,
            '0' => self.add_block(x, y)?,
            '+' => self.add_timer_reset(x, y)?,
            '^' => self.add_spike(x, y)?,
            '~' => self.add_fog(x, y)?,
            _ => return Err(WorldError::UnknownSymbol { symbol, x, y }),
        };
        Ok(())
    }

    // -- internals ----------------------------------------------------------

    fn check_kind(&self, kind: EntityKind) -> Result<(), WorldError> {
        if self.config.allows(kind) {
            Ok(())
        } else {
            Err(WorldError::KindNotAllowed { kind })
        }
    }

    fn check_bounds(&self, x: i32, y: i32) -> Result<(), WorldError> {
        if self.grid.in_bounds(x, y) {
            Ok(())
        } else {
            Err(WorldError::OutOfBounds {
                x,
                y,
                width: self.grid.width,
                height: self.grid.height,
            })
        }
    }

    /// Create an active entity with an identity and a position.
    fn spawn(&mut self, kind: EntityKind, x: i32, y: i32) -> Result<EntityId, WorldError> {
        self.check_kind(kind)?;
        self.check_bounds(x, y)?;
        let e = self.em.create();
        self.em.add_component(e, Identity { kind });
        self.em.add_component(e, Position::new(x, y));
        self.em.set_active(e, true);
        tracing::trace!(entity = %e, %kind, x, y, "spawned");
        Ok(e)
    }

    /// Enemies are deadly and solid to everything but the player, so the
    /// player has to exist first.
    fn spawn_enemy(&mut self, x: i32, y: i32) -> Result<EntityId, WorldError> {
        let player = self.player.ok_or(WorldError::PlayerNotRegistered)?;
        let e = self.spawn(EntityKind::Enemy, x, y)?;
        self.em.add_component(e, Solid::allowing([player]));
        self.em.add_component(e, Deadly);
        Ok(e)
    }

    /// Validate a switch factory call before anything is created.
    fn check_switch(
        &self,
        switches: &[(i32, i32)],
        active: &[(i32, i32)],
        inactive: &[(i32, i32)],
    ) -> Result<(), WorldError> {
        if active.is_empty() && inactive.is_empty() {
            return Err(WorldError::NoSwitchables);
        }
        self.check_kind(EntityKind::SwitchPressable)?;
        self.check_kind(EntityKind::SwitchUnpressable)?;
        self.check_kind(EntityKind::Wall)?;
        for &(x, y) in switches.iter().chain(active).chain(inactive) {
            self.check_bounds(x, y)?;
        }
        Ok(())
    }

    fn add_switchables(
        &mut self,
        triggers: &[EntityId],
        active: &[(i32, i32)],
        inactive: &[(i32, i32)],
    ) -> Result<Vec<EntityId>, WorldError> {
        let initial = active
            .iter()
            .map(|&p| (p, true))
            .chain(inactive.iter().map(|&p| (p, false)));

        let mut switchables = Vec::with_capacity(active.len() + inactive.len());
        for ((x, y), is_active) in initial {
            let wall = self.add_wall(x, y)?;
            self.em.add_component(
                wall,
                Switchable {
                    triggers: triggers.to_vec(),
                },
            );
            self.em.set_active(wall, is_active);
            switchables.push(wall);
        }
        Ok(switchables)
    }
}

/// Split a layout into rows of symbols, checking it is a non-empty
/// rectangle. Surrounding blank lines and indentation are ignored.
fn parse_layout(layout: &str) -> Result<Vec<Vec<char>>, WorldError> {
    let rows: Vec<Vec<char>> = layout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.chars().collect())
        .collect();

    let Some(expected) = rows.first().map(Vec::len) else {
        return Err(WorldError::EmptyLayout);
    };
    for (row, cells) in rows.iter().enumerate() {
        if cells.len() != expected {
            return Err(WorldError::RaggedLayout {
                row,
                expected,
                found: cells.len(),
            });
        }
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Outcome observers
// ---------------------------------------------------------------------------

/// Remove every fog entity.
fn clear_fog(_: Outcome, em: &mut EntityManager, _: Option<EntityId>) {
    let fog: Vec<EntityId> = em.get::<Fog>().keys().copied().collect();
    em.remove_all(fog);
}

/// Leave a marker where the player stood when the game ended.
fn spawn_outcome_marker(outcome: Outcome, em: &mut EntityManager, player: Option<EntityId>) {
    let Some(&position) = player.and_then(|p| em.component::<Position>(p)) else {
        return;
    };
    let kind = match outcome {
        Outcome::PlayerDead => EntityKind::PlayerDied,
        Outcome::GoalReached => EntityKind::GoalReached,
    };
    let marker = em.create();
    em.add_component(marker, Identity { kind });
    em.add_component(marker, position);
    em.set_active(marker, true);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
