//! Free-text matching and bounded BFS path expansion over a `GraphStore`.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use super::GraphStore;

/// Longest path (in edges) reported for a matched entity.
pub const MAX_PATH_HOPS: usize = 2;

/// One relationship where the matched entity is an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectRelationship {
    pub relationship: String,
    pub entity: String,
}

/// One traversed edge of a path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathStep {
    pub from: String,
    pub relationship: String,
    pub to: String,
}

/// Everything the graph knows about one matched entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub entity: String,
    pub entity_type: String,
    /// Neighbors in adjacency order, duplicates included.
    pub direct: Vec<DirectRelationship>,
    /// Shortest paths to every entity reachable within the hop limit,
    /// in entity insertion order. Single-hop paths are included.
    pub paths: Vec<Vec<PathStep>>,
}

impl MatchResult {
    /// Paths of more than one hop.
    pub fn extended_paths(&self) -> impl Iterator<Item = &[PathStep]> + '_ {
        self.paths
            .iter()
            .filter(|path| path.len() > 1)
            .map(Vec::as_slice)
    }
}

/// Read-only query view over a populated graph.
#[derive(Debug, Clone, Copy)]
pub struct QueryEngine<'g> {
    graph: &'g GraphStore,
    max_hops: usize,
}

impl<'g> QueryEngine<'g> {
    pub fn new(graph: &'g GraphStore) -> Self {
        Self {
            graph,
            max_hops: MAX_PATH_HOPS,
        }
    }

    /// Override the path hop limit (at least 1).
    pub fn with_max_hops(mut self, max_hops: usize) -> Self {
        self.max_hops = max_hops.max(1);
        self
    }

    pub fn max_hops(&self) -> usize {
        self.max_hops
    }

    /// Whitespace tokens, lowercased.
    pub fn tokenize(text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_lowercase).collect()
    }

    /// Entity ids containing at least one query token (case-insensitive substring),
    /// in insertion order.
    pub fn matching_entities(&self, text: &str) -> Vec<&'g str> {
        let tokens = Self::tokenize(text);
        if tokens.is_empty() {
            return Vec::new();
        }
        self.graph
            .all_entities()
            .filter(|id| {
                let lowered = id.to_lowercase();
                tokens.iter().any(|t| lowered.contains(t.as_str()))
            })
            .collect()
    }

    /// Match `text` against entity ids and expand each match.
    /// No match yields an empty list.
    pub fn query(&self, text: &str) -> Vec<MatchResult> {
        let results: Vec<MatchResult> = self
            .matching_entities(text)
            .into_iter()
            .map(|id| self.expand(id))
            .collect();
        log::debug!("Query {:?} matched {} entities", text, results.len());
        results
    }

    fn expand(&self, id: &'g str) -> MatchResult {
        let direct = self
            .graph
            .neighbors(id)
            .iter()
            .map(|neighbor| DirectRelationship {
                relationship: self.graph.relationship_label(id, neighbor).to_string(),
                entity: neighbor.clone(),
            })
            .collect();

        let parents = self.bfs_parents(id);
        let paths = self
            .graph
            .all_entities()
            .filter(|target| *target != id)
            .filter_map(|target| self.path_to(&parents, target))
            .collect();

        MatchResult {
            entity: id.to_string(),
            entity_type: self.graph.entity_type(id).to_string(),
            direct,
            paths,
        }
    }

    /// BFS tree rooted at `start`, limited to `max_hops`.
    /// Neighbors are expanded in adjacency order, so the first path discovered
    /// to each entity is the one kept.
    fn bfs_parents(&self, start: &'g str) -> HashMap<&'g str, &'g str> {
        let mut parents: HashMap<&'g str, &'g str> = HashMap::new();
        let mut queue = VecDeque::new();
        queue.push_back((start, 0));

        while let Some((entity, depth)) = queue.pop_front() {
            if depth >= self.max_hops {
                continue;
            }
            for neighbor in self.graph.neighbors(entity) {
                let neighbor = neighbor.as_str();
                if neighbor == start || parents.contains_key(neighbor) {
                    continue;
                }
                parents.insert(neighbor, entity);
                queue.push_back((neighbor, depth + 1));
            }
        }

        parents
    }

    fn path_to(&self, parents: &HashMap<&'g str, &'g str>, target: &'g str) -> Option<Vec<PathStep>> {
        let mut steps = Vec::new();
        let mut current = target;
        while let Some(&previous) = parents.get(current) {
            steps.push(PathStep {
                from: previous.to_string(),
                relationship: self.graph.relationship_label(previous, current).to_string(),
                to: current.to_string(),
            });
            current = previous;
        }
        if steps.is_empty() {
            return None;
        }
        steps.reverse();
        Some(steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A(drug) -treats- B(protein) -causes- C
    fn chain_graph() -> GraphStore {
        let mut graph = GraphStore::new();
        graph.add_entity("A", Some("drug"));
        graph.add_relation("A", "B", Some("treats"));
        graph.add_entity("B", Some("protein"));
        graph.add_relation("B", "C", Some("causes"));
        graph
    }

    fn step(from: &str, relationship: &str, to: &str) -> PathStep {
        PathStep {
            from: from.to_string(),
            relationship: relationship.to_string(),
            to: to.to_string(),
        }
    }

    #[test]
    fn test_tokenize_lowercases() {
        assert_eq!(QueryEngine::tokenize("  HER2  Pathway "), vec!["her2", "pathway"]);
        assert!(QueryEngine::tokenize("   ").is_empty());
    }

    #[test]
    fn test_match_is_case_insensitive_substring() {
        let mut graph = GraphStore::new();
        graph.add_entity("HER2", Some("protein"));
        graph.add_entity("PI3K Pathway", Some("pathway"));
        graph.add_entity("BRCA1", Some("gene"));
        let engine = QueryEngine::new(&graph);
        assert_eq!(engine.matching_entities("her2 pathway"), vec!["HER2", "PI3K Pathway"]);
        // Substring, not token boundary.
        assert_eq!(engine.matching_entities("rca"), vec!["BRCA1"]);
    }

    #[test]
    fn test_scenario_chain() {
        let graph = chain_graph();
        let engine = QueryEngine::new(&graph);
        let results = engine.query("A");
        assert_eq!(results.len(), 1);

        let a = &results[0];
        assert_eq!(a.entity, "A");
        assert_eq!(a.entity_type, "drug");
        assert_eq!(
            a.direct,
            vec![DirectRelationship {
                relationship: "treats".to_string(),
                entity: "B".to_string(),
            }]
        );
        assert_eq!(
            a.paths,
            vec![
                vec![step("A", "treats", "B")],
                vec![step("A", "treats", "B"), step("B", "causes", "C")],
            ]
        );
        let extended: Vec<_> = a.extended_paths().collect();
        assert_eq!(extended.len(), 1);
        assert_eq!(extended[0].len(), 2);
    }

    #[test]
    fn test_no_match_is_empty() {
        let graph = chain_graph();
        let engine = QueryEngine::new(&graph);
        assert!(engine.query("Z").is_empty());
        assert!(engine.query("").is_empty());
    }

    #[test]
    fn test_untyped_entity_reports_concept() {
        let graph = chain_graph();
        let results = QueryEngine::new(&graph).query("c");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].entity_type, "concept");
    }

    #[test]
    fn test_paths_never_exceed_two_hops() {
        let mut graph = GraphStore::new();
        for (a, b) in [("N0", "N1"), ("N1", "N2"), ("N2", "N3"), ("N3", "N4")] {
            graph.add_relation(a, b, Some("next"));
        }
        let results = QueryEngine::new(&graph).query("n0");
        assert_eq!(results.len(), 1);
        let targets: Vec<_> = results[0]
            .paths
            .iter()
            .map(|p| p.last().unwrap().to.as_str())
            .collect();
        assert_eq!(targets, vec!["N1", "N2"]);
        assert!(results[0].paths.iter().all(|p| p.len() <= MAX_PATH_HOPS));
    }

    #[test]
    fn test_max_hops_override() {
        let mut graph = GraphStore::new();
        for (a, b) in [("N0", "N1"), ("N1", "N2"), ("N2", "N3")] {
            graph.add_relation(a, b, None);
        }
        let engine = QueryEngine::new(&graph).with_max_hops(3);
        let results = engine.query("n0");
        assert_eq!(results[0].paths.len(), 3);
        assert_eq!(results[0].paths[2].len(), 3);
        assert_eq!(QueryEngine::new(&graph).with_max_hops(0).max_hops(), 1);
    }

    #[test]
    fn test_unreachable_targets_skipped() {
        let mut graph = chain_graph();
        graph.add_entity("Island", Some("gene"));
        let results = QueryEngine::new(&graph).query("A");
        assert!(results[0]
            .paths
            .iter()
            .all(|p| p.last().unwrap().to != "Island"));
    }

    #[test]
    fn test_tie_break_follows_adjacency_order() {
        // Two shortest routes A-X-D and A-Y-D; X was connected to A first.
        let mut graph = GraphStore::new();
        graph.add_relation("A", "X", Some("via_x"));
        graph.add_relation("A", "Y", Some("via_y"));
        graph.add_relation("Y", "D", Some("y_to_d"));
        graph.add_relation("X", "D", Some("x_to_d"));
        let results = QueryEngine::new(&graph).query("a");
        let to_d = results[0]
            .paths
            .iter()
            .find(|p| p.last().unwrap().to == "D")
            .unwrap();
        assert_eq!(to_d, &vec![step("A", "via_x", "X"), step("X", "x_to_d", "D")]);
    }

    #[test]
    fn test_duplicate_adjacency_surfaces_in_direct_relationships() {
        let mut graph = GraphStore::new();
        graph.add_relation("A", "B", Some("treats"));
        graph.add_relation("A", "B", Some("cures"));
        let results = QueryEngine::new(&graph).query("a");
        let a = results.iter().find(|r| r.entity == "A").unwrap();
        assert_eq!(a.direct.len(), 2);
        assert!(a.direct.iter().all(|d| d.relationship == "cures" && d.entity == "B"));
        // Paths are still one per target.
        assert_eq!(a.paths.len(), 1);
    }

    #[test]
    fn test_results_follow_insertion_order() {
        let mut graph = GraphStore::new();
        graph.add_entity("Gamma", None);
        graph.add_entity("Alpha", None);
        graph.add_entity("Beta", None);
        let ids: Vec<_> = QueryEngine::new(&graph)
            .query("a")
            .into_iter()
            .map(|r| r.entity)
            .collect();
        assert_eq!(ids, vec!["Gamma", "Alpha", "Beta"]);
    }

    #[test]
    fn test_concurrent_readers() {
        let graph = chain_graph();
        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| QueryEngine::new(&graph).query("A B")))
                .collect();
            for handle in handles {
                let results = handle.join().unwrap();
                assert_eq!(results.len(), 2);
            }
        });
    }
}
