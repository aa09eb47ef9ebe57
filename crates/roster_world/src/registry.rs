//! Tag registry — the canonical tag → entity-set reverse index.
//!
//! The registry maps each tag string to the set of entities currently
//! carrying it. Buckets are created the first time a tag is seen and persist,
//! possibly empty, for the life of the registry, so an absent key always
//! means "tag never used". Entities update their local tag set and this
//! index through one internal pair of operations, so the two views never
//! diverge.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use dashmap::{DashMap, DashSet};
use thiserror::Error;
use tracing::{debug, trace};

use roster_component::{EntityId, IdAllocator};

use crate::entity::Entity;

/// Errors from registry operations that take an entity argument.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The entity was spawned by a different registry.
    #[error("{0} does not belong to this registry")]
    ForeignEntity(EntityId),
    /// The entity has been destroyed, or carries the invalid sentinel ID.
    #[error("{0} is not live in this registry")]
    DeadEntity(EntityId),
}

struct RegistryInner {
    ids: IdAllocator,
    /// Entities spawned here and not yet destroyed.
    live: DashSet<EntityId>,
    /// Tag buckets. Buckets hold strong entity handles, so an entity stays
    /// reachable through its tags until it is destroyed.
    index: DashMap<String, HashSet<Entity>>,
}

/// Shared handle to one tag index.
///
/// One registry is constructed at process start; cloning the handle is cheap
/// and every clone refers to the same underlying index. Entities spawned
/// from any clone observe the same shared state.
#[derive(Clone)]
pub struct Registry {
    inner: Arc<RegistryInner>,
}

impl Registry {
    /// Creates a fresh, empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                ids: IdAllocator::new(),
                live: DashSet::new(),
                index: DashMap::new(),
            }),
        }
    }

    // -- Entity lifecycle --

    /// Spawns a new entity with no components and no tags.
    pub fn spawn(&self) -> Entity {
        let id = self.inner.ids.allocate();
        self.inner.live.insert(id);
        debug!(%id, "spawned entity");
        Entity::new(id, self.clone())
    }

    /// Destroys an entity: removes it from every tag bucket it occupies,
    /// clears its tag set, and releases its components.
    ///
    /// After this the handle is inert: tag and component mutations through
    /// it are ignored, and registry operations on it fail with
    /// [`RegistryError::DeadEntity`]. Destroying twice is an error.
    pub fn destroy(&self, entity: &Entity) -> Result<(), RegistryError> {
        self.check_owned(entity)?;
        let id = entity.id();
        if self.inner.live.remove(&id).is_none() {
            return Err(RegistryError::DeadEntity(id));
        }
        for tag in entity.tags() {
            if let Some(mut bucket) = self.inner.index.get_mut(&tag) {
                bucket.remove(entity);
            }
        }
        entity.purge();
        debug!(%id, "destroyed entity");
        Ok(())
    }

    /// Returns `true` if the ID belongs to a live entity of this registry.
    #[must_use]
    pub fn exists(&self, id: EntityId) -> bool {
        self.inner.live.contains(&id)
    }

    /// Number of live entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.inner.live.len()
    }

    /// Total number of entities spawned over this registry's lifetime,
    /// including destroyed ones.
    #[must_use]
    pub fn spawned_count(&self) -> u64 {
        self.inner.ids.count()
    }

    // -- Tag index --

    /// Inserts `entity` into the bucket for `tag`, creating the bucket on
    /// first use, and records the tag on the entity itself. Idempotent.
    ///
    /// This is the checked equivalent of [`Entity::add_tag`] for callers
    /// that drive tagging through the registry.
    ///
    /// # Errors
    ///
    /// Fails if the entity belongs to another registry or has been
    /// destroyed.
    pub fn add_entity_to_tag(&self, entity: &Entity, tag: &str) -> Result<(), RegistryError> {
        self.check_live(entity)?;
        self.apply_tag(entity, tag);
        Ok(())
    }

    /// Removes `entity` from the bucket for `tag`, and the tag from the
    /// entity itself. A silent no-op if the entity was never in that bucket
    /// or the tag has no bucket.
    ///
    /// # Errors
    ///
    /// Fails if the entity belongs to another registry or has been
    /// destroyed.
    pub fn remove_entity_from_tag(&self, entity: &Entity, tag: &str) -> Result<(), RegistryError> {
        self.check_live(entity)?;
        self.clear_tag(entity, tag);
        Ok(())
    }

    /// All entities currently tagged `tag`.
    ///
    /// Returns `None` if the tag has never been used with this registry; a
    /// tag whose last entity was removed yields `Some` with an empty set.
    /// The returned set is a snapshot; later mutations are not reflected
    /// in it.
    #[must_use]
    pub fn entities_with_tag(&self, tag: &str) -> Option<HashSet<Entity>> {
        self.inner.index.get(tag).map(|bucket| bucket.value().clone())
    }

    /// Number of tags that have ever been used with this registry.
    ///
    /// Buckets persist once created, so this counts known tags, not
    /// currently non-empty ones.
    #[must_use]
    pub fn tag_count(&self) -> usize {
        self.inner.index.len()
    }

    // -- Internal both-sides bookkeeping --
    //
    // Every tag mutation funnels through these two, whether it started on
    // the entity or on the registry, so the entity's local set and the
    // reverse index cannot diverge.

    pub(crate) fn apply_tag(&self, entity: &Entity, tag: &str) {
        entity.insert_local(tag);
        let newly = self
            .inner
            .index
            .entry(tag.to_owned())
            .or_default()
            .insert(entity.clone());
        if newly {
            trace!(entity = %entity.id(), tag, "tagged");
        }
    }

    pub(crate) fn clear_tag(&self, entity: &Entity, tag: &str) {
        entity.remove_local(tag);
        if let Some(mut bucket) = self.inner.index.get_mut(tag) {
            if bucket.remove(entity) {
                trace!(entity = %entity.id(), tag, "untagged");
            }
        }
        // An emptied bucket stays in the index: `entities_with_tag` must
        // keep distinguishing "known but empty" from "never used".
    }

    fn check_owned(&self, entity: &Entity) -> Result<(), RegistryError> {
        if Arc::ptr_eq(&self.inner, &entity.registry().inner) {
            Ok(())
        } else {
            Err(RegistryError::ForeignEntity(entity.id()))
        }
    }

    fn check_live(&self, entity: &Entity) -> Result<(), RegistryError> {
        self.check_owned(entity)?;
        let id = entity.id();
        if id.is_valid() && self.inner.live.contains(&id) {
            Ok(())
        } else {
            Err(RegistryError::DeadEntity(id))
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("entities", &self.entity_count())
            .field("tags", &self.tag_count())
            .finish()
    }
}
