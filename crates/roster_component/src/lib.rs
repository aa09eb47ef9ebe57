//! # roster_component
//!
//! Identity and behaviour primitives for the roster object model.
//!
//! This crate provides:
//!
//! - [`EntityId`] — lightweight `u64` entity identifiers.
//! - [`IdAllocator`] — monotonically increasing ID allocator.
//! - [`Component`] trait — the contract for opaque behaviour units attached
//!   to entities.
//! - [`ComponentRef`] — shared handle to a component instance.

pub mod component;
pub mod id;

pub use component::{Component, ComponentRef, component_key};
pub use id::{EntityId, IdAllocator};
