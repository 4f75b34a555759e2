//! Metadata registry keyed by schema identity
//!
//! `describe` and `meta` record their data here in addition to the schema's
//! own internals, so tooling can look metadata up by [`SchemaId`] without
//! holding the schema. Entries do not keep their schema alive; entries whose
//! schema was dropped are pruned on the next [`MetadataRegistry::add`].

use crate::internals::SchemaId;
use crate::node::{SchemaNode, SchemaRef};
use crate::value::Value;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Weak};
use tracing::trace;

/// Metadata attached to a schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SchemaMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl SchemaMetadata {
    /// Overlays the fields set in `other`.
    fn merge(&mut self, other: Self) {
        if other.description.is_some() {
            self.description = other.description;
        }
        if other.meta.is_some() {
            self.meta = other.meta;
        }
    }
}

#[derive(Debug)]
struct Entry {
    owner: Weak<SchemaNode>,
    metadata: SchemaMetadata,
}

/// Thread-safe map from schema identity to metadata.
#[derive(Debug, Default)]
pub struct MetadataRegistry {
    entries: RwLock<HashMap<SchemaId, Entry>>,
}

impl MetadataRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds metadata for `node`, merging with what is already recorded.
    pub fn add(&self, node: &SchemaRef, metadata: SchemaMetadata) {
        let id = node.internals.id;
        trace!(schema = %id, "registering schema metadata");
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| entry.owner.strong_count() > 0);
        if entries.len() < before {
            trace!(pruned = before - entries.len(), "pruned dropped schemas");
        }
        entries
            .entry(id)
            .or_insert_with(|| Entry {
                owner: Arc::downgrade(node),
                metadata: SchemaMetadata::default(),
            })
            .metadata
            .merge(metadata);
    }

    #[must_use]
    pub fn get(&self, id: SchemaId) -> Option<SchemaMetadata> {
        self.entries.read().get(&id).map(|entry| entry.metadata.clone())
    }

    pub fn remove(&self, id: SchemaId) -> Option<SchemaMetadata> {
        self.entries.write().remove(&id).map(|entry| entry.metadata)
    }

    #[must_use]
    pub fn contains(&self, id: SchemaId) -> bool {
        self.entries.read().contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

static GLOBAL: LazyLock<MetadataRegistry> = LazyLock::new(MetadataRegistry::new);

/// Process-wide registry used by `describe` and `meta`.
#[must_use]
pub fn global() -> &'static MetadataRegistry {
    &GLOBAL
}

/// Adds metadata to the global registry.
pub fn add(node: &SchemaRef, metadata: SchemaMetadata) {
    GLOBAL.add(node, metadata);
}

#[must_use]
pub fn get(id: SchemaId) -> Option<SchemaMetadata> {
    GLOBAL.get(id)
}

pub fn remove(id: SchemaId) -> Option<SchemaMetadata> {
    GLOBAL.remove(id)
}

#[must_use]
pub fn len() -> usize {
    GLOBAL.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::string;
    use crate::schema::SchemaType;

    #[test]
    fn test_add_merges() {
        let registry = MetadataRegistry::new();
        let schema = string();
        registry.add(
            schema.node(),
            SchemaMetadata {
                description: Some("user".into()),
                meta: None,
            },
        );
        registry.add(
            schema.node(),
            SchemaMetadata {
                description: None,
                meta: Some(Value::from("x")),
            },
        );
        let md = registry.get(schema.node().internals.id).unwrap();
        assert_eq!(md.description.as_deref(), Some("user"));
        assert_eq!(md.meta, Some(Value::from("x")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_remove() {
        let registry = MetadataRegistry::new();
        let schema = string();
        let id = schema.node().internals.id;
        registry.add(schema.node(), SchemaMetadata::default());
        assert!(registry.contains(id));
        assert!(registry.remove(id).is_some());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_dropped_schemas_are_pruned_on_add() {
        let registry = MetadataRegistry::new();
        for _ in 0..100 {
            let temporary = string();
            registry.add(temporary.node(), SchemaMetadata::default());
        }
        assert_eq!(registry.len(), 1);

        let kept = string();
        registry.add(kept.node(), SchemaMetadata::default());
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(kept.node().internals.id));
    }
}
