//! Deterministic text rendering of query results, plus the structured form
//! handed to the language-model client.

use serde::{Deserialize, Serialize};

use super::query::{MatchResult, PathStep};
use super::DEFAULT_ENTITY_TYPE;
use crate::error::{GraphRagError, Result};

/// Returned by `ResponseFormatter::format` when nothing matched.
pub const NO_MATCH_RESPONSE: &str = "No directly relevant information found in the knowledge graph.";

/// Renders `MatchResult`s as a human-readable report.
pub struct ResponseFormatter;

impl ResponseFormatter {
    pub fn format(results: &[MatchResult]) -> String {
        if results.is_empty() {
            return NO_MATCH_RESPONSE.to_string();
        }

        let mut response = String::from("\nKnowledge Graph Analysis:\n");
        for result in results {
            response.push_str(&format!("\n• {}", result.entity));
            if result.entity_type != DEFAULT_ENTITY_TYPE {
                response.push_str(&format!(" ({})", result.entity_type));
            }
            response.push_str(":\n");

            if !result.direct.is_empty() {
                let connections: Vec<String> = result
                    .direct
                    .iter()
                    .map(|d| format!("{} {}", d.relationship, d.entity))
                    .collect();
                response.push_str("  Direct relationships:\n");
                response.push_str(&format!("   - {}\n", connections.join("\n   - ")));
            }

            // Header follows any path; only multi-hop paths are listed under it.
            if !result.paths.is_empty() {
                response.push_str("  Extended relationships:\n");
                for path in result.extended_paths() {
                    response.push_str(&format!("   - {}\n", Self::format_path(path)));
                }
            }
        }
        response
    }

    /// `A treats B → B causes C`
    pub fn format_path(path: &[PathStep]) -> String {
        path.iter()
            .map(|step| format!("{} {} {}", step.from, step.relationship, step.to))
            .collect::<Vec<_>>()
            .join(" → ")
    }
}

/// Structured result of one graph query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphAnalysis {
    pub query: String,
    pub matches: Vec<MatchResult>,
}

impl GraphAnalysis {
    pub fn new(query: impl Into<String>, matches: Vec<MatchResult>) -> Self {
        Self {
            query: query.into(),
            matches,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Text report, identical to `ResponseFormatter::format(&self.matches)`.
    pub fn render(&self) -> String {
        ResponseFormatter::format(&self.matches)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| GraphRagError::Parse(format!("Failed to serialize analysis: {}", e)))
    }
}
