//! Live entity handles.
//!
//! An [`Entity`] is a cheaply cloneable handle to one object in the
//! registry. It owns two sets: opaque components (behaviour units this layer
//! never interprets) and string tags. Tag mutations go through the owning
//! registry so the reverse index stays accurate; component mutations are
//! purely local.

use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use dashmap::{DashMap, DashSet};
use tracing::warn;

use roster_component::{ComponentRef, EntityId, component_key};

use crate::registry::Registry;

struct EntityInner {
    id: EntityId,
    registry: Registry,
    /// Local tag set, duplicated from the registry's buckets: the copy makes
    /// `has_tag` and `tags` O(1)-cheap on the entity, while the buckets keep
    /// per-tag enumeration on the registry.
    tags: DashSet<String>,
    /// Components keyed by instance identity.
    components: DashMap<usize, ComponentRef>,
}

/// A handle to one live entity.
///
/// Handles are cheap to clone and all clones refer to the same entity.
/// Equality and hashing use the entity's ID only, so a handle stays usable
/// as a set or map key while its tags and components change underneath it.
/// IDs are unique within one registry; handles spawned from different
/// registries should not share a collection.
#[derive(Clone)]
pub struct Entity {
    inner: Arc<EntityInner>,
}

impl Entity {
    pub(crate) fn new(id: EntityId, registry: Registry) -> Self {
        Self {
            inner: Arc::new(EntityInner {
                id,
                registry,
                tags: DashSet::new(),
                components: DashMap::new(),
            }),
        }
    }

    /// This entity's stable identifier.
    #[must_use]
    pub fn id(&self) -> EntityId {
        self.inner.id
    }

    /// The registry this entity was spawned from.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    /// Returns `true` until the entity is destroyed.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.inner.registry.exists(self.inner.id)
    }

    // -- Tags --

    /// Adds `tag` to this entity and to the registry's reverse index.
    ///
    /// Adding a tag the entity already carries is a no-op. Tags are
    /// arbitrary non-empty strings. On a destroyed entity the call is
    /// ignored with a warning.
    pub fn add_tag(&self, tag: impl Into<String>) {
        let tag = tag.into();
        debug_assert!(!tag.is_empty(), "tags are non-empty strings");
        if !self.is_live() {
            warn!(entity = %self.inner.id, tag = %tag, "add_tag on destroyed entity ignored");
            return;
        }
        self.inner.registry.apply_tag(self, &tag);
    }

    /// Removes `tag` from this entity and from the reverse index.
    ///
    /// Removing a tag the entity does not carry is a no-op. On a destroyed
    /// entity the call is ignored with a warning.
    pub fn remove_tag(&self, tag: &str) {
        if !self.is_live() {
            warn!(entity = %self.inner.id, tag, "remove_tag on destroyed entity ignored");
            return;
        }
        self.inner.registry.clear_tag(self, tag);
    }

    /// Membership test against the entity's local tag set.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.inner.tags.contains(tag)
    }

    /// A snapshot of this entity's tags.
    ///
    /// Mutation goes through [`Entity::add_tag`] and [`Entity::remove_tag`]
    /// only; changing the returned set has no effect on the entity.
    #[must_use]
    pub fn tags(&self) -> HashSet<String> {
        self.inner.tags.iter().map(|tag| tag.key().clone()).collect()
    }

    // -- Components --

    /// Attaches a component.
    ///
    /// Attaching the same instance twice is a no-op; two separately created
    /// components of the same type are distinct. On a destroyed entity the
    /// call is ignored with a warning.
    pub fn attach(&self, component: ComponentRef) {
        if !self.is_live() {
            warn!(
                entity = %self.inner.id,
                component = component.name(),
                "attach on destroyed entity ignored"
            );
            return;
        }
        self.inner
            .components
            .insert(component_key(&component), component);
    }

    /// Detaches a component by instance identity.
    ///
    /// Returns `true` if the instance was attached.
    pub fn detach(&self, component: &ComponentRef) -> bool {
        self.inner
            .components
            .remove(&component_key(component))
            .is_some()
    }

    /// Returns `true` if this exact component instance is attached.
    #[must_use]
    pub fn has_component(&self, component: &ComponentRef) -> bool {
        self.inner.components.contains_key(&component_key(component))
    }

    /// A snapshot of the attached components.
    #[must_use]
    pub fn components(&self) -> Vec<ComponentRef> {
        self.inner
            .components
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Number of attached components.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.inner.components.len()
    }

    // -- Registry-internal bookkeeping --

    pub(crate) fn insert_local(&self, tag: &str) {
        self.inner.tags.insert(tag.to_owned());
    }

    pub(crate) fn remove_local(&self, tag: &str) {
        self.inner.tags.remove(tag);
    }

    /// Clears tags and releases components. Called on destroy, after the
    /// entity has been removed from every bucket.
    pub(crate) fn purge(&self) {
        self.inner.tags.clear();
        self.inner.components.clear();
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Entity {}

impl Hash for Entity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.inner.id)
            .field("tags", &self.tags())
            .field("components", &self.component_count())
            .finish()
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner.id)
    }
}

#[cfg(test)]
mod tests {
    use roster_component::Component;

    use super::*;

    struct Health {
        #[allow(dead_code)]
        current: f32,
    }

    impl Component for Health {
        fn name(&self) -> &'static str {
            "Health"
        }
    }

    fn health() -> ComponentRef {
        Arc::new(Health { current: 100.0 })
    }

    #[test]
    fn test_add_and_has_tag() {
        let registry = Registry::new();
        let entity = registry.spawn();
        assert!(!entity.has_tag("enemy"));
        entity.add_tag("enemy");
        assert!(entity.has_tag("enemy"));
    }

    #[test]
    fn test_remove_tag() {
        let registry = Registry::new();
        let entity = registry.spawn();
        entity.add_tag("enemy");
        entity.remove_tag("enemy");
        assert!(!entity.has_tag("enemy"));
    }

    #[test]
    fn test_remove_absent_tag_is_noop() {
        let registry = Registry::new();
        let entity = registry.spawn();
        entity.remove_tag("never-added");
        assert!(entity.tags().is_empty());
    }

    #[test]
    fn test_add_tag_idempotent() {
        let registry = Registry::new();
        let entity = registry.spawn();
        entity.add_tag("enemy");
        entity.add_tag("enemy");
        assert_eq!(entity.tags().len(), 1);
    }

    #[test]
    fn test_tags_snapshot_does_not_alias() {
        let registry = Registry::new();
        let entity = registry.spawn();
        entity.add_tag("enemy");
        let mut snapshot = entity.tags();
        snapshot.insert("boss".to_string());
        assert!(!entity.has_tag("boss"));
    }

    #[test]
    fn test_attach_idempotent_by_identity() {
        let registry = Registry::new();
        let entity = registry.spawn();
        let component = health();
        entity.attach(component.clone());
        entity.attach(component.clone());
        assert_eq!(entity.component_count(), 1);
        assert!(entity.has_component(&component));
    }

    #[test]
    fn test_distinct_instances_are_distinct() {
        let registry = Registry::new();
        let entity = registry.spawn();
        entity.attach(health());
        entity.attach(health());
        assert_eq!(entity.component_count(), 2);
    }

    #[test]
    fn test_detach() {
        let registry = Registry::new();
        let entity = registry.spawn();
        let component = health();
        entity.attach(component.clone());
        assert!(entity.detach(&component));
        assert!(!entity.has_component(&component));
        assert!(!entity.detach(&component));
    }

    #[test]
    fn test_equality_by_id_only() {
        let registry = Registry::new();
        let a = registry.spawn();
        let b = registry.spawn();
        let alias = a.clone();
        alias.add_tag("enemy");
        assert_eq!(a, alias);
        assert_ne!(a, b);
    }

    #[test]
    fn test_mutations_after_destroy_are_ignored() {
        let registry = Registry::new();
        let entity = registry.spawn();
        registry.destroy(&entity).unwrap();
        assert!(!entity.is_live());

        entity.add_tag("enemy");
        entity.attach(health());
        assert!(entity.tags().is_empty());
        assert_eq!(entity.component_count(), 0);
        assert!(registry.entities_with_tag("enemy").is_none());
    }

    #[test]
    fn test_display_uses_id() {
        let registry = Registry::new();
        let entity = registry.spawn();
        assert_eq!(entity.to_string(), "Entity(1)");
    }
}
