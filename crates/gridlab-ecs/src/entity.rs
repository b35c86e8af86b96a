//! Entity identifiers and allocation.
//!
//! An [`EntityId`] is an opaque 64-bit handle. Identifiers are handed out by a
//! monotonically increasing counter and are never reused, so a handle to a
//! removed entity can never alias a newer one.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// EntityId
// ---------------------------------------------------------------------------

/// An opaque entity identifier.
///
/// Entities carry no data of their own; everything lives in components keyed
/// by this id. Ordering follows creation order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Raw `u64` representation.
    #[inline]
    pub fn to_raw(self) -> u64 {
        self.0
    }

    /// Reconstruct from a raw `u64`.
    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// EntityAllocator
// ---------------------------------------------------------------------------

/// Hands out fresh [`EntityId`]s from a monotonic counter.
#[derive(Debug, Default, Clone, Serialize)]
pub struct EntityAllocator {
    next: u64,
}

impl EntityAllocator {
    /// Create a new allocator starting at id 0.
    pub fn new() -> Self {
        Self { next: 0 }
    }

    /// Allocate a fresh [`EntityId`]. Never returns a previously issued id.
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }

    /// Total number of ids issued so far (including removed entities).
    pub fn issued(&self) -> u64 {
        self.next
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
