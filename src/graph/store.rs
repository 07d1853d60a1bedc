//! In-memory entity/relationship store with an insertion-ordered adjacency index.

use std::collections::HashMap;

use indexmap::IndexMap;

use super::{Entity, Relationship, DEFAULT_ENTITY_TYPE, DEFAULT_RELATIONSHIP};

/// Owns the entities and relationships of one knowledge graph.
///
/// Adjacency lists record one entry per `add_relation` call, so ingesting the
/// same pair twice lists the neighbor twice while the pair keeps a single
/// (last written) label.
#[derive(Debug, Default, Clone)]
pub struct GraphStore {
    entities: IndexMap<String, Entity>,
    relationships: IndexMap<(String, String), Relationship>,
    adjacency: HashMap<String, Vec<String>>,
}

/// Canonical key for an unordered pair.
fn pair_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entity or update its type.
    ///
    /// A `None` type creates the entity untyped if it is new and leaves an
    /// existing type untouched; a `Some` type always overwrites.
    pub fn add_entity(&mut self, id: &str, entity_type: Option<&str>) {
        let entity = self
            .entities
            .entry(id.to_string())
            .or_insert_with(|| Entity {
                id: id.to_string(),
                entity_type: None,
            });
        if let Some(t) = entity_type {
            entity.entity_type = Some(t.to_string());
        }
    }

    /// Connect two entities, creating either endpoint if it does not exist yet.
    ///
    /// The pair's label follows the same rule as entity types: `Some` overwrites,
    /// `None` keeps whatever was stored. Each call appends to both adjacency lists
    /// (a self-loop is listed once).
    pub fn add_relation(&mut self, source: &str, target: &str, relationship: Option<&str>) {
        self.add_entity(source, None);
        self.add_entity(target, None);

        let edge = self
            .relationships
            .entry(pair_key(source, target))
            .or_insert_with(|| Relationship {
                source: source.to_string(),
                target: target.to_string(),
                label: None,
            });
        if let Some(label) = relationship {
            edge.label = Some(label.to_string());
        }

        self.adjacency
            .entry(source.to_string())
            .or_default()
            .push(target.to_string());
        if source != target {
            self.adjacency
                .entry(target.to_string())
                .or_default()
                .push(source.to_string());
        }
    }

    /// Adjacent entity ids in insertion order; empty for unknown or isolated ids.
    pub fn neighbors(&self, id: &str) -> &[String] {
        self.adjacency.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Entity ids in insertion order. Call again (or clone) to restart.
    pub fn all_entities(&self) -> impl Iterator<Item = &str> + Clone + '_ {
        self.entities.keys().map(String::as_str)
    }

    /// Entities in insertion order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.values()
    }

    /// Relationships in insertion order of their first ingestion.
    pub fn relationships(&self) -> impl Iterator<Item = &Relationship> + '_ {
        self.relationships.values()
    }

    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entities.contains_key(id)
    }

    /// Type of `id`, `concept` if untyped or unknown.
    pub fn entity_type(&self, id: &str) -> &str {
        self.entities
            .get(id)
            .map(Entity::type_or_default)
            .unwrap_or(DEFAULT_ENTITY_TYPE)
    }

    /// Label stored for the unordered pair, `related` if none was ever set.
    pub fn relationship_label(&self, a: &str, b: &str) -> &str {
        self.relationships
            .get(&pair_key(a, b))
            .map(Relationship::label_or_default)
            .unwrap_or(DEFAULT_RELATIONSHIP)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
