//! Property tests for store operations.
//!
//! These tests use `proptest` to generate random sequences of store
//! operations and verify that the store's invariants hold after each one.

use std::collections::BTreeSet;

use gridlab_ecs::prelude::*;
use proptest::prelude::*;

/// Operations we can perform on the store.
#[derive(Debug, Clone)]
enum StoreOp {
    Create(i32, i32),
    Remove(usize),
    AddSolid(usize),
    RemoveSolid(usize),
    ToggleActive(usize),
    Move(usize, i32, i32),
}

fn store_op_strategy() -> impl Strategy<Value = StoreOp> {
    prop_oneof![
        (-50i32..50, -50i32..50).prop_map(|(x, y)| StoreOp::Create(x, y)),
        (0..100usize).prop_map(StoreOp::Remove),
        (0..100usize).prop_map(StoreOp::AddSolid),
        (0..100usize).prop_map(StoreOp::RemoveSolid),
        (0..100usize).prop_map(StoreOp::ToggleActive),
        (0..100usize, -1i32..=1, -1i32..=1).prop_map(|(i, dx, dy)| StoreOp::Move(i, dx, dy)),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2_000))]

    #[test]
    fn random_ops_preserve_invariants(ops in prop::collection::vec(store_op_strategy(), 1..60)) {
        let mut em = EntityManager::new();
        let mut alive: Vec<EntityId> = Vec::new();
        let mut removed: Vec<EntityId> = Vec::new();

        for op in ops {
            match op {
                StoreOp::Create(x, y) => {
                    let e = em.create();
                    em.add_component(e, Position::new(x, y));
                    em.set_active(e, true);
                    alive.push(e);
                }
                StoreOp::Remove(idx) => {
                    if !alive.is_empty() {
                        let e = alive.remove(idx % alive.len());
                        em.remove(e);
                        removed.push(e);
                    }
                }
                StoreOp::AddSolid(idx) => {
                    if !alive.is_empty() {
                        em.add_component(alive[idx % alive.len()], Solid::default());
                    }
                }
                StoreOp::RemoveSolid(idx) => {
                    if !alive.is_empty() {
                        let e = alive[idx % alive.len()];
                        let had = em.has::<Solid>(e);
                        prop_assert_eq!(em.remove_component::<Solid>(e).is_ok(), had);
                    }
                }
                StoreOp::ToggleActive(idx) => {
                    if !alive.is_empty() {
                        let e = alive[idx % alive.len()];
                        let before = em.is_active(e);
                        prop_assert_eq!(em.toggle_active(e), !before);
                    }
                }
                StoreOp::Move(idx, dx, dy) => {
                    if !alive.is_empty() {
                        let e = alive[idx % alive.len()];
                        if let Some(pos) = em.component_mut::<Position>(e) {
                            *pos = pos.offset(dx, dy);
                        }
                    }
                }
            }

            // Invariant: exactly the live entities have positions.
            prop_assert_eq!(em.get::<Position>().len(), alive.len());

            // Invariant: removed entities left nothing behind.
            for &e in &removed {
                prop_assert!(em.kinds_of(e).is_empty());
                prop_assert!(!em.is_active(e));
            }

            // Invariant: the active set only contains live entities.
            let live: BTreeSet<EntityId> = alive.iter().copied().collect();
            prop_assert!(em.active().all(|e| live.contains(&e)));
        }
    }

    /// Ids are never handed out twice, however many entities are removed.
    #[test]
    fn ids_are_never_reused(
        spawn_count in 1..40usize,
        remove_indices in prop::collection::vec(0..40usize, 1..20),
    ) {
        let mut em = EntityManager::new();
        let mut seen = BTreeSet::new();
        let mut entities: Vec<EntityId> = (0..spawn_count).map(|_| em.create()).collect();
        seen.extend(entities.iter().copied());

        for idx in remove_indices {
            if !entities.is_empty() {
                let e = entities.remove(idx % entities.len());
                em.remove(e);
            }
            let fresh = em.create();
            prop_assert!(seen.insert(fresh), "id {} issued twice", fresh);
            entities.push(fresh);
        }
    }
}
