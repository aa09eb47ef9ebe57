//! Core [`Component`] trait.
//!
//! A component is an opaque unit of behaviour attached to an entity. This
//! layer never interprets a component — entities only hold them so that the
//! behaviour subsystems that created them can find and invoke them. The
//! trait requires `Send + Sync + 'static` so component handles can travel
//! with entity handles across threads.

use std::sync::Arc;

/// The core component trait.
///
/// What a component does is entirely up to the subsystem that attached it.
/// The only thing this layer asks of a component is a name for diagnostics.
///
/// # Examples
///
/// ```rust
/// use roster_component::Component;
///
/// struct Health {
///     current: f32,
///     max: f32,
/// }
///
/// impl Component for Health {
///     fn name(&self) -> &'static str { "Health" }
/// }
/// ```
pub trait Component: Send + Sync + 'static {
    /// A human-readable name for this component (e.g. `"Health"`).
    fn name(&self) -> &'static str;
}

/// A shared handle to a component instance.
pub type ComponentRef = Arc<dyn Component>;

/// Returns the identity key for a component instance.
///
/// Attachment is tracked by instance identity: two `ComponentRef`s map to the
/// same key exactly when they point at the same instance. Two separately
/// created components of the same type are distinct.
#[must_use]
pub fn component_key(component: &ComponentRef) -> usize {
    Arc::as_ptr(component) as *const () as usize
}
