//! Entity identity and allocation utilities.
//!
//! An [`EntityId`] is a lightweight `u64` identifier with no inherent data.
//! IDs are allocated by the registry an entity is spawned from, so equality
//! and hashing stay stable no matter how the entity's tags or components
//! change afterwards.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// A unique entity identifier.
///
/// Identity lives here rather than in the entity's mutable state: two handles
/// refer to the same entity exactly when their IDs match, regardless of which
/// tags or components have been added or removed since.
///
/// IDs are unique within the registry that allocated them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl EntityId {
    /// The null / invalid entity sentinel.
    pub const INVALID: EntityId = EntityId(0);

    /// Create an ID from a raw `u64`.
    #[must_use]
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` identifier.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }

    /// Returns `true` if this is a valid (non-zero) ID.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Allocates monotonically increasing entity IDs.
///
/// One allocator lives inside each registry and is the single source of truth
/// for identity there. Allocation takes `&self` so a registry shared behind a
/// reference-counted handle can spawn entities without exclusive access.
#[derive(Debug)]
pub struct IdAllocator {
    next_id: AtomicU64,
}

impl IdAllocator {
    /// Creates a new allocator. IDs start at 1 (0 is reserved for [`EntityId::INVALID`]).
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
        }
    }

    /// Allocates a fresh entity ID.
    pub fn allocate(&self) -> EntityId {
        EntityId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the number of IDs handed out so far.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.next_id.load(Ordering::Relaxed) - 1
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_creation() {
        let id = EntityId::from_raw(42);
        assert_eq!(id.id(), 42);
        assert!(id.is_valid());
    }

    #[test]
    fn test_id_invalid() {
        assert!(!EntityId::INVALID.is_valid());
        assert_eq!(EntityId::INVALID.id(), 0);
    }

    #[test]
    fn test_allocator_produces_unique_ids() {
        let alloc = IdAllocator::new();
        let a = alloc.allocate();
        let b = alloc.allocate();
        let c = alloc.allocate();
        assert_eq!(a.id(), 1);
        assert_eq!(b.id(), 2);
        assert_eq!(c.id(), 3);
        assert_eq!(alloc.count(), 3);
    }

    #[test]
    fn test_allocator_shared_reference() {
        // `allocate` takes `&self`, so two borrows of one allocator still
        // hand out distinct IDs.
        let alloc = IdAllocator::new();
        let first = &alloc;
        let second = &alloc;
        assert_ne!(first.allocate(), second.allocate());
    }

    #[test]
    fn test_id_display() {
        assert_eq!(EntityId::from_raw(7).to_string(), "Entity(7)");
    }

    #[test]
    fn test_id_serialization_roundtrip() {
        let id = EntityId::from_raw(999);
        let json = serde_json::to_string(&id).unwrap();
        let restored: EntityId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, restored);
    }
}
