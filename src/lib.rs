pub mod config;
pub mod error;
pub mod graph;
pub mod ingest;
pub mod search;
pub mod cache;
pub mod export;
pub mod llm;
pub mod rag;

pub use config::Config;
pub use error::{GraphRagError, Result};
pub use graph::{GraphAnalysis, GraphStore, MatchResult, QueryEngine, ResponseFormatter};
pub use rag::{KnowledgeBase, QueryOptions};
