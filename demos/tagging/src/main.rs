//! Tagging demo — spawns a handful of entities, classifies them with tags,
//! and answers "who carries tag X" through the registry's reverse index.
//!
//! Run with `RUST_LOG=tagging=info,roster_world=debug` to watch the registry
//! bookkeeping as well.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use roster_component::{Component, ComponentRef};
use roster_world::Registry;

/// Sample behaviour unit. The object model never looks inside it.
struct Health {
    #[allow(dead_code)]
    current: f32,
}

impl Component for Health {
    fn name(&self) -> &'static str {
        "Health"
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("tagging=info".parse()?))
        .init();

    let registry = Registry::new();

    let grunt = registry.spawn();
    let archer = registry.spawn();
    let dragon = registry.spawn();

    grunt.add_tag("enemy");
    archer.add_tag("enemy");
    dragon.add_tag("enemy");
    dragon.add_tag("boss");

    let health: ComponentRef = Arc::new(Health { current: 500.0 });
    dragon.attach(health);

    for tag in ["enemy", "boss", "friendly"] {
        match registry.entities_with_tag(tag) {
            Some(bucket) => info!(tag, count = bucket.len(), "query"),
            None => info!(tag, "query: tag never used"),
        }
    }

    // The dragon goes down; its buckets are cleaned up with it.
    registry.destroy(&dragon)?;
    let enemies = registry.entities_with_tag("enemy").unwrap_or_default();
    info!(
        remaining = enemies.len(),
        bosses = registry.entities_with_tag("boss").map_or(0, |b| b.len()),
        "after destroying the dragon"
    );

    info!(
        entities = registry.entity_count(),
        tags = registry.tag_count(),
        "registry state at shutdown"
    );
    Ok(())
}
