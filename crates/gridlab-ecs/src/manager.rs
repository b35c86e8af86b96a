//! The [`EntityManager`] is the sparse component store every system reads
//! and writes. It owns the entity allocator, one column per component type,
//! and the per-entity active flag.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::component::{Component, ComponentColumns, ComponentKind};
use crate::entity::{EntityAllocator, EntityId};
use crate::EcsError;

// ---------------------------------------------------------------------------
// EntityManager
// ---------------------------------------------------------------------------

/// Sparse, typed component storage keyed by [`EntityId`].
///
/// Lookups never fail: an entity without a component simply has no entry in
/// that column. Whether an entity takes part in systems is tracked by a
/// separate active flag rather than a marker component.
#[derive(Debug, Default, Clone, Serialize)]
pub struct EntityManager {
    allocator: EntityAllocator,
    columns: ComponentColumns,
    active: BTreeSet<EntityId>,
}

impl EntityManager {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh entity with no components. Ids are never reused.
    pub fn create(&mut self) -> EntityId {
        self.allocator.allocate()
    }

    // -- component access ---------------------------------------------------

    /// Every `T` in the store, keyed by entity. Empty if none were added.
    pub fn get<T: Component>(&self) -> &BTreeMap<EntityId, T> {
        T::column(&self.columns)
    }

    /// Mutable access to the `T` column.
    pub fn get_mut<T: Component>(&mut self) -> &mut BTreeMap<EntityId, T> {
        T::column_mut(&mut self.columns)
    }

    /// The `T` attached to `entity`, if any.
    pub fn component<T: Component>(&self, entity: EntityId) -> Option<&T> {
        self.get::<T>().get(&entity)
    }

    /// Mutable access to the `T` attached to `entity`, if any.
    pub fn component_mut<T: Component>(&mut self, entity: EntityId) -> Option<&mut T> {
        self.get_mut::<T>().get_mut(&entity)
    }

    /// Whether `entity` carries a `T`.
    pub fn has<T: Component>(&self, entity: EntityId) -> bool {
        self.get::<T>().contains_key(&entity)
    }

    /// Attach `component` to `entity`, replacing any existing `T`.
    pub fn add_component<T: Component>(&mut self, entity: EntityId, component: T) {
        self.get_mut::<T>().insert(entity, component);
    }

    /// Detach the `T` from `entity` and return it.
    ///
    /// # Errors
    ///
    /// [`EcsError::MissingComponent`] if the entity has no `T`. Callers
    /// removing optional components should check [`has`](Self::has) first.
    pub fn remove_component<T: Component>(&mut self, entity: EntityId) -> Result<T, EcsError> {
        self.get_mut::<T>()
            .remove(&entity)
            .ok_or(EcsError::MissingComponent {
                entity,
                kind: T::KIND,
            })
    }

    /// The component kinds currently attached to `entity`.
    pub fn kinds_of(&self, entity: EntityId) -> Vec<ComponentKind> {
        self.columns.kinds_of(entity)
    }

    // -- lifecycle ----------------------------------------------------------

    /// Purge `entity` from every column and clear its active flag.
    ///
    /// Removing an entity that is already gone is a no-op.
    pub fn remove(&mut self, entity: EntityId) {
        self.columns.purge(entity);
        if self.active.remove(&entity) {
            tracing::trace!(%entity, "entity removed");
        }
    }

    /// [`remove`](Self::remove) every entity in `entities`.
    pub fn remove_all(&mut self, entities: impl IntoIterator<Item = EntityId>) {
        for entity in entities {
            self.remove(entity);
        }
    }

    /// Number of ids issued so far, removed entities included.
    pub fn issued(&self) -> u64 {
        self.allocator.issued()
    }

    // -- active flag --------------------------------------------------------

    /// Whether `entity` currently takes part in systems.
    pub fn is_active(&self, entity: EntityId) -> bool {
        self.active.contains(&entity)
    }

    /// Set or clear the active flag.
    pub fn set_active(&mut self, entity: EntityId, active: bool) {
        if active {
            self.active.insert(entity);
        } else {
            self.active.remove(&entity);
        }
    }

    /// Flip the active flag and return the new value.
    pub fn toggle_active(&mut self, entity: EntityId) -> bool {
        let now = !self.is_active(entity);
        self.set_active(entity, now);
        now
    }

    /// Every active entity, in creation order.
    pub fn active(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.active.iter().copied()
    }

    /// Active entities carrying a `T`, with their component.
    pub fn active_with<T: Component>(&self) -> impl Iterator<Item = (EntityId, &T)> + '_ {
        self.get::<T>()
            .iter()
            .filter(|(entity, _)| self.active.contains(entity))
            .map(|(&entity, component)| (entity, component))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
