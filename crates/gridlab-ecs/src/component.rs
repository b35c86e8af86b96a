//! The component catalogue.
//!
//! Every kind of state an entity can carry is a plain struct implementing
//! [`Component`]. The store keeps one sparse column (`EntityId -> value`) per
//! kind; [`ComponentKind`] is the runtime tag used in errors and queries.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

/// A unit grid displacement `(dx, dy)`.
pub type Delta = (i32, i32);

// ---------------------------------------------------------------------------
// EntityKind
// ---------------------------------------------------------------------------

/// What an entity *is*, as far as levels and renderers are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Player,
    Goal,
    Key,
    TimerReset,
    SwitchPressable,
    SwitchUnpressable,
    Enemy,
    Spike,
    Block,
    Door,
    Wall,
    Fog,
    GoalReached,
    PlayerDied,
}

impl EntityKind {
    /// Snake-case name, matching the serialized form.
    pub fn name(self) -> &'static str {
        match self {
            EntityKind::Player => "player",
            EntityKind::Goal => "goal",
            EntityKind::Key => "key",
            EntityKind::TimerReset => "timer_reset",
            EntityKind::SwitchPressable => "switch_pressable",
            EntityKind::SwitchUnpressable => "switch_unpressable",
            EntityKind::Enemy => "enemy",
            EntityKind::Spike => "spike",
            EntityKind::Block => "block",
            EntityKind::Door => "door",
            EntityKind::Wall => "wall",
            EntityKind::Fog => "fog",
            EntityKind::GoalReached => "goal_reached",
            EntityKind::PlayerDied => "player_died",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Component trait
// ---------------------------------------------------------------------------

/// A typed record of state attached to an entity.
///
/// Implemented by the `component_columns!` invocation below; each
/// implementation knows which column of [`ComponentColumns`] holds it.
pub trait Component: Clone + fmt::Debug + Serialize + 'static {
    /// Runtime tag of this component type.
    const KIND: ComponentKind;

    /// The sparse column holding every value of this type.
    fn column(columns: &ComponentColumns) -> &BTreeMap<EntityId, Self>;

    /// Mutable access to the column.
    fn column_mut(columns: &mut ComponentColumns) -> &mut BTreeMap<EntityId, Self>;
}

macro_rules! component_columns {
    ($($ty:ident => $field:ident),* $(,)?) => {
        /// Runtime tag for each component type.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum ComponentKind {
            $($ty,)*
        }

        impl ComponentKind {
            /// Human-readable name of the kind.
            pub fn name(self) -> &'static str {
                match self {
                    $(ComponentKind::$ty => stringify!($ty),)*
                }
            }
        }

        /// One sparse column per component type.
        ///
        /// Columns are `BTreeMap`s so iteration follows entity creation order
        /// and serialization is canonical.
        #[derive(Debug, Default, Clone, Serialize)]
        pub struct ComponentColumns {
            $($field: BTreeMap<EntityId, $ty>,)*
        }

        impl ComponentColumns {
            /// Drop `entity` from every column.
            pub(crate) fn purge(&mut self, entity: EntityId) {
                $(self.$field.remove(&entity);)*
            }

            /// The kinds of component currently attached to `entity`.
            pub(crate) fn kinds_of(&self, entity: EntityId) -> Vec<ComponentKind> {
                let mut kinds = Vec::new();
                $(
                    if self.$field.contains_key(&entity) {
                        kinds.push(ComponentKind::$ty);
                    }
                )*
                kinds
            }
        }

        $(
            impl Component for $ty {
                const KIND: ComponentKind = ComponentKind::$ty;

                fn column(columns: &ComponentColumns) -> &BTreeMap<EntityId, Self> {
                    &columns.$field
                }

                fn column_mut(columns: &mut ComponentColumns) -> &mut BTreeMap<EntityId, Self> {
                    &mut columns.$field
                }
            }
        )*
    };
}

component_columns! {
    Identity => identity,
    Position => position,
    PositionDelta => position_delta,
    Goal => goal,
    Door => door,
    Key => key,
    KeyCollector => key_collector,
    Solid => solid,
    Pusher => pusher,
    Pushable => pushable,
    Deadly => deadly,
    Fog => fog,
    Switch => switch,
    Switchable => switchable,
    ChaseAi => chase_ai,
    MirrorAi => mirror_ai,
    PatrolAi => patrol_ai,
    FixedAi => fixed_ai,
    SnakeAi => snake_ai,
    SnakeSegment => snake_segment,
    Timer => timer,
    TimerReset => timer_reset,
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Core components
// ---------------------------------------------------------------------------

/// Entity identity (player, enemy, wall, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub kind: EntityKind,
}

/// Cell an entity occupies. Also used as the cell type for searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The cell displaced by `(dx, dy)`.
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Displacement from `self` to `other`.
    pub fn delta_to(self, other: Position) -> Delta {
        (other.x - self.x, other.y - self.y)
    }

    /// Orthogonally adjacent (diagonals excluded, self excluded).
    pub fn is_adjacent(self, other: Position) -> bool {
        (self.x - other.x).abs() + (self.y - other.y).abs() == 1
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Last successful displacement of the entity during the current tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionDelta {
    pub dx: i32,
    pub dy: i32,
}

/// Reaching this entity's cell wins the level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal;

/// Removed when a key holder stands next to it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Door;

/// Picked up by a [`KeyCollector`] standing on it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key;

/// Holds collected keys. Goes negative when one key opens several doors
/// at once; the debt is paid off by later keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyCollector {
    pub count: i32,
}

/// Cannot be overlapped, except by entities in `allow`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solid {
    pub allow: BTreeSet<EntityId>,
}

impl Solid {
    /// A solid that lets the given entities through.
    pub fn allowing(allow: impl IntoIterator<Item = EntityId>) -> Self {
        Self {
            allow: allow.into_iter().collect(),
        }
    }

    /// Whether `mover` is refused entry.
    pub fn blocks(&self, mover: EntityId) -> bool {
        !self.allow.contains(&mover)
    }
}

/// Can push [`Pushable`] entities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pusher;

/// Moves when pushed, if the cell beyond is free.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pushable;

/// Kills the player on contact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deadly;

/// Hides whatever shares its cell. Cleared when the game ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fog;

// ---------------------------------------------------------------------------
// Switches
// ---------------------------------------------------------------------------

/// A pressure switch.
///
/// `group` is the ordered ring this switch belongs to (`None` for a solo
/// switch). Ring order decides which member becomes pressable next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Switch {
    pub group: Option<Vec<EntityId>>,
    pub pressed: bool,
    pub pressable: bool,
    pub trigger_kinds: BTreeSet<EntityKind>,
    pub trigger_entities: BTreeSet<EntityId>,
}

impl Switch {
    /// Kinds that press a switch unless configured otherwise.
    pub const DEFAULT_TRIGGER_KINDS: [EntityKind; 3] =
        [EntityKind::Player, EntityKind::Block, EntityKind::Enemy];

    /// A solo switch with the default trigger kinds.
    pub fn solo() -> Self {
        Self {
            group: None,
            pressed: false,
            pressable: true,
            trigger_kinds: Self::DEFAULT_TRIGGER_KINDS.into_iter().collect(),
            trigger_entities: BTreeSet::new(),
        }
    }

    /// A ring member with the default trigger kinds.
    pub fn grouped(group: Vec<EntityId>, pressable: bool) -> Self {
        Self {
            group: Some(group),
            pressable,
            ..Self::solo()
        }
    }

    /// Whether an entity of `kind` with id `entity` presses this switch.
    pub fn is_triggered_by(&self, entity: EntityId, kind: Option<EntityKind>) -> bool {
        self.trigger_entities.contains(&entity)
            || kind.is_some_and(|k| self.trigger_kinds.contains(&k))
    }
}

/// Toggles its active flag when any of `triggers` is pressed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Switchable {
    pub triggers: Vec<EntityId>,
}

// ---------------------------------------------------------------------------
// AI
// ---------------------------------------------------------------------------

/// Walks toward `target` along an A* path.
///
/// Acts every `stagger` ticks and consumes up to `steps` waypoints per turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChaseAi {
    pub target: EntityId,
    pub steps: u32,
    pub stagger: u32,
    pub tick: u32,
    pub diagonal: bool,
}

/// Copies the target's last displacement, optionally negated per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorAi {
    pub target: EntityId,
    pub mirror_x: bool,
    pub mirror_y: bool,
}

impl MirrorAi {
    pub fn reflect(&self, dx: i32, dy: i32) -> Delta {
        let dx = if self.mirror_x { -dx } else { dx };
        let dy = if self.mirror_y { -dy } else { dy };
        (dx, dy)
    }
}

/// Moves by `delta` each tick, reversing when blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatrolAi {
    pub delta: Delta,
}

/// Cycles through a fixed list of moves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedAi {
    pub moves: Vec<Delta>,
    pub index: usize,
}

impl FixedAi {
    /// The move for this tick; advances (and wraps) the index.
    pub fn next_move(&mut self) -> Option<Delta> {
        let delta = *self.moves.get(self.index)?;
        self.index = (self.index + 1) % self.moves.len();
        Some(delta)
    }
}

/// Head of a snake. `segments` lists the followers head-to-tail.
///
/// With `delta == None` the head chases `target`; otherwise it patrols along
/// `delta`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnakeAi {
    pub target: EntityId,
    pub segments: Vec<EntityId>,
    pub steps: u32,
    pub diagonal: bool,
    pub delta: Option<Delta>,
}

/// A follower in a snake chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnakeSegment {
    pub head: EntityId,
}

// ---------------------------------------------------------------------------
// Timers
// ---------------------------------------------------------------------------

/// Tick budget for the entity it is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timer {
    pub limit: u32,
    pub tick: u32,
}

impl Timer {
    pub fn new(limit: u32) -> Self {
        Self { limit, tick: 0 }
    }

    /// Ticks left before expiry.
    pub fn remain(&self) -> u32 {
        self.limit.saturating_sub(self.tick)
    }
}

/// Resets every timer when the player steps on it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerReset;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
