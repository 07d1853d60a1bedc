//! Ingestion of knowledge records into a `GraphStore`.
//!
//! A record names a primary entity, its optional type, and a `related_to`
//! list. Inside `related_to` the `type` field is the relationship label, not
//! an entity type:
//!
//! ```json
//! { "entity": "Trastuzumab", "type": "drug",
//!   "related_to": [ { "entity": "HER2", "type": "targets" } ] }
//! ```

pub mod loader;

pub use loader::{discover_knowledge_files, load_records, parse_records};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::GraphRagError;
use crate::graph::GraphStore;

/// One primary record of the knowledge base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeRecord {
    pub entity: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub related_to: Vec<RelatedEntity>,
}

/// An entry of `related_to`: target entity plus the relationship label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedEntity {
    pub entity: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<RelatedEntity>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<RelatedEntity>>::deserialize(deserializer)?.unwrap_or_default())
}

impl KnowledgeRecord {
    /// Decode one raw record. `index` is its position in the input, for reporting.
    pub fn from_value(index: usize, value: Value) -> Result<Self, GraphRagError> {
        Self::decode(value).map_err(|reason| GraphRagError::IngestionMalformed { index, reason })
    }

    /// Blank or whitespace-only ids are rejected along with undecodable records.
    fn decode(value: Value) -> Result<Self, String> {
        let record: KnowledgeRecord = serde_json::from_value(value).map_err(|e| e.to_string())?;
        if record.entity.trim().is_empty() {
            return Err("empty `entity`".to_string());
        }
        if record.related_to.iter().any(|r| r.entity.trim().is_empty()) {
            return Err("empty `entity` in `related_to`".to_string());
        }
        Ok(record)
    }
}

/// A rejected input record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    pub index: usize,
    pub reason: String,
}

/// Outcome of decoding a batch of raw records.
#[derive(Debug, Clone, Default)]
pub struct DecodedRecords {
    pub records: Vec<KnowledgeRecord>,
    pub skipped: Vec<SkippedRecord>,
}

/// Summary returned to the caller after ingestion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub records_ingested: usize,
    pub skipped: Vec<SkippedRecord>,
}

impl IngestReport {
    pub fn records_skipped(&self) -> usize {
        self.skipped.len()
    }
}

/// Decode raw values, rejecting malformed ones individually.
pub fn decode_records(values: impl IntoIterator<Item = Value>) -> DecodedRecords {
    let mut decoded = DecodedRecords::default();
    for (index, value) in values.into_iter().enumerate() {
        match KnowledgeRecord::decode(value) {
            Ok(record) => decoded.records.push(record),
            Err(reason) => {
                log::warn!("Skipping malformed record #{}: {}", index, reason);
                decoded.skipped.push(SkippedRecord { index, reason });
            }
        }
    }
    decoded
}

/// Add decoded records to the graph, in order.
pub fn apply_records(graph: &mut GraphStore, records: &[KnowledgeRecord]) {
    for record in records {
        graph.add_entity(&record.entity, record.entity_type.as_deref());
        for related in &record.related_to {
            graph.add_relation(&record.entity, &related.entity, related.relationship.as_deref());
        }
    }
}

/// Decode and ingest raw records; malformed ones are skipped and reported.
pub fn ingest_records(graph: &mut GraphStore, values: impl IntoIterator<Item = Value>) -> IngestReport {
    ingest_decoded(graph, &decode_records(values))
}

/// Apply already decoded records and summarize.
pub fn ingest_decoded(graph: &mut GraphStore, decoded: &DecodedRecords) -> IngestReport {
    apply_records(graph, &decoded.records);
    let report = IngestReport {
        records_ingested: decoded.records.len(),
        skipped: decoded.skipped.clone(),
    };
    log::info!(
        "Ingested {} records ({} skipped): {} entities, {} relationships",
        report.records_ingested,
        report.records_skipped(),
        graph.entity_count(),
        graph.relationship_count()
    );
    report
}
