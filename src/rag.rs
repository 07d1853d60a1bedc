//! `KnowledgeBase`: one ingested dataset, queryable both through the graph and
//! through the flat keyword baseline.

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;

use crate::cache::AnalysisCache;
use crate::config::QueryConfig;
use crate::error::Result;
use crate::graph::{GraphAnalysis, GraphStore, QueryEngine, MAX_PATH_HOPS};
use crate::ingest::{decode_records, ingest_decoded, load_records, IngestReport, KnowledgeRecord};
use crate::search::KeywordIndex;

/// Query-time knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    pub max_hops: usize,
    /// 0 disables the analysis cache.
    pub cache_capacity: usize,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            max_hops: MAX_PATH_HOPS,
            cache_capacity: 0,
        }
    }
}

impl From<&QueryConfig> for QueryOptions {
    fn from(config: &QueryConfig) -> Self {
        Self {
            max_hops: config.max_hops,
            cache_capacity: config.cache_capacity,
        }
    }
}

/// An ingested, read-only knowledge base.
///
/// Ingestion happens once in the constructor; afterwards the graph is only
/// reachable through shared references, so a `KnowledgeBase` can serve
/// queries from several threads at once.
pub struct KnowledgeBase {
    graph: Arc<GraphStore>,
    keywords: KeywordIndex,
    ingest_report: IngestReport,
    max_hops: usize,
    cache: Option<AnalysisCache>,
}

impl KnowledgeBase {
    /// Ingest raw records into a fresh graph.
    pub fn from_records(values: Vec<Value>, options: QueryOptions) -> Self {
        let decoded = decode_records(values);
        let mut graph = GraphStore::new();
        let ingest_report = ingest_decoded(&mut graph, &decoded);

        let cache = (options.cache_capacity > 0).then(|| AnalysisCache::new(options.cache_capacity));

        Self {
            graph: Arc::new(graph),
            keywords: KeywordIndex::new(decoded.records),
            ingest_report,
            max_hops: options.max_hops.max(1),
            cache,
        }
    }

    /// Load records from a knowledge file or directory and ingest them.
    pub fn load(path: &Path, options: QueryOptions) -> Result<Self> {
        let values = load_records(path)?;
        Ok(Self::from_records(values, options))
    }

    pub fn graph(&self) -> &GraphStore {
        &self.graph
    }

    /// Shared handle to the frozen graph, for readers on other threads.
    pub fn shared_graph(&self) -> Arc<GraphStore> {
        Arc::clone(&self.graph)
    }

    pub fn engine(&self) -> QueryEngine<'_> {
        QueryEngine::new(&self.graph).with_max_hops(self.max_hops)
    }

    pub fn ingest_report(&self) -> &IngestReport {
        &self.ingest_report
    }

    pub fn records(&self) -> &[KnowledgeRecord] {
        self.keywords.records()
    }

    /// Graph analysis for `query`, served from the cache when possible.
    pub fn analyze(&self, query: &str) -> Arc<GraphAnalysis> {
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(query) {
                log::debug!("Analysis cache hit for query: {}", query);
                return hit;
            }
        }

        let analysis = Arc::new(GraphAnalysis::new(query, self.engine().query(query)));

        if let Some(cache) = &self.cache {
            cache.put(query.to_string(), Arc::clone(&analysis));
        }
        analysis
    }

    /// Rendered graph report for `query`.
    pub fn report(&self, query: &str) -> String {
        self.analyze(query).render()
    }

    /// Flat keyword lookup, no graph expansion.
    pub fn keyword_lookup(&self, query: &str) -> Vec<&KnowledgeRecord> {
        self.keywords.lookup(query)
    }

    /// Template answer from the keyword baseline.
    pub fn keyword_answer(&self, query: &str) -> String {
        self.keywords.answer(query)
    }

    /// The whole knowledge base as a flat listing.
    pub fn flat_context(&self) -> String {
        self.keywords.flat_context()
    }

    pub fn cached_analyses(&self) -> usize {
        self.cache.as_ref().map(AnalysisCache::len).unwrap_or(0)
    }
}
