//! Knowledge graph module: entity store, query engine and report formatting.
//!
//! The graph is simple and undirected. Entities are keyed by their
//! case-sensitive identifier; each unordered pair of entities carries at most
//! one relationship label. Ingestion mutates a `GraphStore`; once it is handed
//! to a `QueryEngine` it is only ever read.

mod format;
mod query;
mod store;

pub use format::{GraphAnalysis, ResponseFormatter, NO_MATCH_RESPONSE};
pub use query::{DirectRelationship, MatchResult, PathStep, QueryEngine, MAX_PATH_HOPS};
pub use store::GraphStore;

use serde::{Deserialize, Serialize};

/// Entity type reported when none was ever assigned.
pub const DEFAULT_ENTITY_TYPE: &str = "concept";

/// Relationship label reported when none was ever assigned.
pub const DEFAULT_RELATIONSHIP: &str = "related";

/// A named node in the knowledge graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Unique, case-sensitive identifier, e.g. `HER2`.
    pub id: String,
    /// Optional type tag, e.g. `protein`.
    pub entity_type: Option<String>,
}

impl Entity {
    /// Type tag, or `concept` when the entity was only created implicitly.
    pub fn type_or_default(&self) -> &str {
        self.entity_type.as_deref().unwrap_or(DEFAULT_ENTITY_TYPE)
    }
}

/// A labeled undirected connection between two entities.
///
/// `source` and `target` keep the orientation of the first ingestion of the
/// pair; lookups treat the pair as unordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub source: String,
    pub target: String,
    pub label: Option<String>,
}

impl Relationship {
    /// Relationship label, or `related` when none was set.
    pub fn label_or_default(&self) -> &str {
        self.label.as_deref().unwrap_or(DEFAULT_RELATIONSHIP)
    }
}
