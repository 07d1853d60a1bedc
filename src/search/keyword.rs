//! Flat keyword lookup over raw records: the no-graph baseline.
//!
//! A record matches when its entity id appears verbatim (case-insensitively)
//! inside the query. Nothing reachable through relationships is pulled in.

use crate::graph::{DEFAULT_ENTITY_TYPE, DEFAULT_RELATIONSHIP};
use crate::ingest::KnowledgeRecord;

/// Returned by `KeywordIndex::answer` when no record id occurs in the query.
pub const NO_ANSWER_RESPONSE: &str = "I don't have enough information to answer that query.";

/// Keyword index over the records exactly as ingested.
#[derive(Debug, Clone, Default)]
pub struct KeywordIndex {
    records: Vec<KnowledgeRecord>,
}

impl KeywordIndex {
    pub fn new(records: Vec<KnowledgeRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[KnowledgeRecord] {
        &self.records
    }

    /// Records whose entity id is contained in the query, in input order.
    pub fn lookup(&self, query: &str) -> Vec<&KnowledgeRecord> {
        let query = query.to_lowercase();
        self.records
            .iter()
            .filter(|record| query.contains(&record.entity.to_lowercase()))
            .collect()
    }

    /// Template answer built from the matching records, one sentence per line.
    pub fn answer(&self, query: &str) -> String {
        let hits = self.lookup(query);
        if hits.is_empty() {
            return NO_ANSWER_RESPONSE.to_string();
        }
        hits.into_iter()
            .map(describe_record)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Every record, flat, as handed to the baseline prompt.
    pub fn flat_context(&self) -> String {
        let mut context = String::from("Knowledge Base:\n\n");
        for record in &self.records {
            context.push_str(&format!(
                "• {} ({}):\n",
                record.entity,
                record.entity_type.as_deref().unwrap_or(DEFAULT_ENTITY_TYPE)
            ));
            for related in &record.related_to {
                context.push_str(&format!(
                    "  - {} {}\n",
                    related.relationship.as_deref().unwrap_or(DEFAULT_RELATIONSHIP),
                    related.entity
                ));
            }
            context.push('\n');
        }
        context
    }
}

/// `Trastuzumab is a drug that targets HER2, and treats Breast Cancer`
pub fn describe_record(record: &KnowledgeRecord) -> String {
    let mut sentence = format!(
        "{} is a {}",
        record.entity,
        record.entity_type.as_deref().unwrap_or(DEFAULT_ENTITY_TYPE)
    );
    if !record.related_to.is_empty() {
        let relations: Vec<String> = record
            .related_to
            .iter()
            .map(|related| {
                format!(
                    "{} {}",
                    related.relationship.as_deref().unwrap_or(DEFAULT_RELATIONSHIP),
                    related.entity
                )
            })
            .collect();
        sentence.push_str(" that ");
        sentence.push_str(&relations.join(", and "));
    }
    sentence
}
