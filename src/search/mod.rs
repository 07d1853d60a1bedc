//! Retrieval without the graph: flat keyword lookup over raw records.

pub mod keyword;

pub use keyword::{describe_record, KeywordIndex, NO_ANSWER_RESPONSE};
