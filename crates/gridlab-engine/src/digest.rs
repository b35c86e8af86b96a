//! BLAKE3 digest of the observable world state.
//!
//! Two worlds built the same way and fed the same actions must produce the
//! same digest; tests use it to check determinism without comparing every
//! component by hand.

use gridlab_ecs::manager::EntityManager;
use serde::Serialize;

use crate::state::OutcomeState;

/// BLAKE3 hex digest (64 lowercase hex chars) of the store, outcome flags
/// and turn counter.
pub fn state_hash(em: &EntityManager, state: &OutcomeState, turn: u64) -> String {
    #[derive(Serialize)]
    struct HashableState<'a> {
        em: &'a EntityManager,
        state: &'a OutcomeState,
        turn: u64,
    }

    let json_bytes = serde_json::to_vec(&HashableState { em, state, turn })
        .expect("world state should always be JSON-serializable");

    blake3::hash(&json_bytes).to_hex().to_string()
}
