//! Node/edge export for an external graph renderer.
//!
//! The exported JSON uses the `nodes` / `edges` layout that vis-network style
//! renderers accept directly.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GraphRagError, Result};
use crate::graph::GraphStore;

pub const DEFAULT_NODE_COLOR: &str = "#808080";
pub const EDGE_COLOR: &str = "#666666";
/// Type shown for entities that were only created implicitly.
pub const UNTYPED_NODE_TYPE: &str = "default";

/// Entity type to display color, with a fallback for unlisted types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorTable {
    colors: BTreeMap<String, String>,
    default_color: String,
}

impl Default for ColorTable {
    fn default() -> Self {
        Self::new(default_colors(), DEFAULT_NODE_COLOR.to_string())
    }
}

/// Built-in palette for the biomedical sample data.
pub fn default_colors() -> BTreeMap<String, String> {
    [
        ("drug", "#00ff1e"),
        ("protein", "#ff00f7"),
        ("pathway", "#0000ff"),
        ("cancer_type", "#ffa500"),
        ("side_effect", "#ff0000"),
        ("gene", "#800080"),
    ]
    .into_iter()
    .map(|(t, c)| (t.to_string(), c.to_string()))
    .collect()
}

impl ColorTable {
    pub fn new(colors: BTreeMap<String, String>, default_color: String) -> Self {
        Self {
            colors,
            default_color,
        }
    }

    pub fn color_for(&self, entity_type: &str) -> &str {
        self.colors
            .get(entity_type)
            .map(String::as_str)
            .unwrap_or(&self.default_color)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualNode {
    pub id: String,
    pub label: String,
    pub entity_type: String,
    /// Hover text.
    pub title: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualEdge {
    pub from: String,
    pub to: String,
    pub relationship: String,
    pub color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphExport {
    pub nodes: Vec<VisualNode>,
    pub edges: Vec<VisualEdge>,
}

/// Snapshot every entity and relationship of `graph`, in insertion order.
pub fn export_graph(graph: &GraphStore, colors: &ColorTable) -> GraphExport {
    let nodes = graph
        .entities()
        .map(|entity| {
            let entity_type = entity.entity_type.as_deref().unwrap_or(UNTYPED_NODE_TYPE);
            VisualNode {
                id: entity.id.clone(),
                label: entity.id.clone(),
                entity_type: entity_type.to_string(),
                title: format!("Type: {}", entity_type),
                color: colors.color_for(entity_type).to_string(),
            }
        })
        .collect();

    let edges = graph
        .relationships()
        .map(|rel| VisualEdge {
            from: rel.source.clone(),
            to: rel.target.clone(),
            relationship: rel.label_or_default().to_string(),
            color: EDGE_COLOR.to_string(),
        })
        .collect();

    GraphExport { nodes, edges }
}

impl GraphExport {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| GraphRagError::Parse(format!("Failed to serialize graph export: {}", e)))
    }

    /// Write the export as pretty JSON, creating parent directories as needed.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        log::info!(
            "Wrote {} nodes and {} edges to {}",
            self.nodes.len(),
            self.edges.len(),
            path.display()
        );
        Ok(())
    }
}
