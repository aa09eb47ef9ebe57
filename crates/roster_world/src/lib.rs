//! # roster_world
//!
//! The identity and classification layer of the roster object model.
//!
//! A [`Registry`] owns the canonical tag → entity reverse index and spawns
//! [`Entity`] handles bound to it. Entities carry opaque components and
//! free-form string tags; every tag mutation updates the entity's local set
//! and the reverse index in the same step, so "all entities tagged X" is
//! answered in better than linear time and the two views never diverge.
//!
//! One registry is constructed at process start and shared by cheap cloning
//! of the handle; every clone and every entity spawned from it observes the
//! same index.

pub mod entity;
pub mod registry;

pub use entity::Entity;
pub use registry::{Registry, RegistryError};
