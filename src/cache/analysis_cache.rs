use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use crate::graph::GraphAnalysis;

/// Thread-safe LRU cache of graph analyses keyed by query text
///
/// The graph is read-only once ingestion is complete, so an analysis never
/// goes stale for the lifetime of the cache.
pub struct AnalysisCache {
    cache: Mutex<LruCache<String, Arc<GraphAnalysis>>>,
}

impl AnalysisCache {
    /// Create a new analysis cache with the specified capacity
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum number of analyses to keep (clamped to at least 1)
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);

        Self {
            cache: Mutex::new(LruCache::new(cap)),
        }
    }

    /// Get the cached analysis for a query, if any
    pub fn get(&self, query: &str) -> Option<Arc<GraphAnalysis>> {
        self.cache.lock().unwrap().get(query).cloned()
    }

    /// Store an analysis in the cache
    pub fn put(&self, query: String, analysis: Arc<GraphAnalysis>) {
        self.cache.lock().unwrap().put(query, analysis);
    }

    /// Get the current number of cached entries
    pub fn len(&self) -> usize {
        self.cache.lock().unwrap().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.cache.lock().unwrap().is_empty()
    }

    /// Clear all entries from the cache
    pub fn clear(&self) {
        self.cache.lock().unwrap().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis(query: &str) -> Arc<GraphAnalysis> {
        Arc::new(GraphAnalysis::new(query, Vec::new()))
    }

    #[test]
    fn test_cache_put_and_get() {
        let cache = AnalysisCache::new(10);
        cache.put("her2".to_string(), analysis("her2"));

        let retrieved = cache.get("her2");
        assert!(retrieved.is_some());
        assert_eq!(retrieved.unwrap().query, "her2");
        assert!(cache.get("brca1").is_none());
    }

    #[test]
    fn test_cache_eviction() {
        let cache = AnalysisCache::new(2);
        cache.put("query1".to_string(), analysis("query1"));
        cache.put("query2".to_string(), analysis("query2"));

        // Touch query1 so query2 is least recently used
        let _ = cache.get("query1");
        cache.put("query3".to_string(), analysis("query3"));

        assert!(cache.get("query1").is_some());
        assert!(cache.get("query2").is_none());
        assert!(cache.get("query3").is_some());
    }

    #[test]
    fn test_cache_len_and_clear() {
        let cache = AnalysisCache::new(0);
        assert!(cache.is_empty());

        cache.put("query1".to_string(), analysis("query1"));
        cache.put("query2".to_string(), analysis("query2"));
        // Zero capacity is clamped to one
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }
}
