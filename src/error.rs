use thiserror::Error;

/// Main error type for GraphRAG
#[derive(Error, Debug)]
pub enum GraphRagError {
    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Knowledge file parse errors (whole file unreadable)
    #[error("Parse error: {0}")]
    Parse(String),

    /// A single ingestion record that could not be decoded
    #[error("Malformed record #{index}: {reason}")]
    IngestionMalformed { index: usize, reason: String },

    /// Remote model is busy or rate limited (retryable)
    #[error("Model busy: {0}")]
    ModelBusy(String),

    /// Network failure talking to the model endpoint (retryable)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Non-transient language-model failure
    #[error("Language model error: {0}")]
    Llm(String),
}

impl GraphRagError {
    /// Whether a retry may succeed where this attempt failed.
    pub fn is_transient(&self) -> bool {
        matches!(self, GraphRagError::ModelBusy(_) | GraphRagError::Transport(_))
    }
}

/// Convenient Result type using GraphRagError
pub type Result<T> = std::result::Result<T, GraphRagError>;
