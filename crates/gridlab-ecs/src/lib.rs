//! Gridlab ECS -- sparse entity-component store for the grid puzzle engine.
//!
//! Entities are opaque, never-reused ids. All state lives in components, one
//! sparse column per component type, and every lookup of an absent component
//! yields an empty result rather than an error.
//!
//! # Quick Start
//!
//! ```
//! use gridlab_ecs::prelude::*;
//!
//! let mut em = EntityManager::new();
//! let wall = em.create();
//! em.add_component(wall, Identity { kind: EntityKind::Wall });
//! em.add_component(wall, Position::new(2, 3));
//! em.add_component(wall, Solid::default());
//! em.set_active(wall, true);
//!
//! assert_eq!(em.component::<Position>(wall), Some(&Position::new(2, 3)));
//! assert!(em.get::<Deadly>().is_empty());
//! ```

#![deny(unsafe_code)]

pub mod component;
pub mod entity;
pub mod manager;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EcsError {
    /// A component was removed from an entity that never had it.
    #[error("entity {entity} has no '{kind}' component")]
    MissingComponent {
        entity: entity::EntityId,
        kind: component::ComponentKind,
    },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::component::{
        ChaseAi, Component, ComponentKind, Deadly, Delta, Door, EntityKind, FixedAi, Fog, Goal,
        Identity, Key, KeyCollector, MirrorAi, PatrolAi, Position, PositionDelta, Pushable,
        Pusher, SnakeAi, SnakeSegment, Solid, Switch, Switchable, Timer, TimerReset,
    };
    pub use crate::entity::EntityId;
    pub use crate::manager::EntityManager;
    pub use crate::EcsError;
}

// ---------------------------------------------------------------------------
// Integration Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn error_message_names_entity_and_kind() {
        let mut em = EntityManager::new();
        let e = em.create();
        let err = em.remove_component::<Timer>(e).unwrap_err();
        assert_eq!(err.to_string(), "entity e0 has no 'Timer' component");
    }

    #[test]
    fn store_serializes_canonically() {
        let build = || {
            let mut em = EntityManager::new();
            for i in 0..5 {
                let e = em.create();
                em.add_component(e, Position::new(i, 0));
                em.set_active(e, i % 2 == 0);
            }
            em
        };
        let a = serde_json::to_string(&build()).unwrap();
        let b = serde_json::to_string(&build()).unwrap();
        assert_eq!(a, b);
    }
}
