use thiserror::Error;

/// Error type crossing the domain boundary. Adapters map their native
/// failures into the matching variant; use cases propagate with `?`.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Storage-layer failure (connection, statement, transaction).
    #[error("database error: {0}")]
    Database(String),

    /// Embedding collaborator failure. Retrieval degrades to tag channels
    /// on this one; dedup falls back to singleton stories.
    #[error("embedding error: {0}")]
    Embedding(String),

    /// NER collaborator failure; isolated per chunk by the extract stage.
    #[error("extraction error: {0}")]
    Extraction(String),

    /// Malformed collaborator output or unreadable input file.
    #[error("parse error: {0}")]
    Parse(String),

    /// A pipeline stage exhausted its retries. Distinguishes an aborted run
    /// from an empty one.
    #[error("pipeline stage '{stage}' failed after {attempts} attempts: {cause}")]
    Pipeline {
        stage: String,
        attempts: u32,
        cause: String,
    },
}

impl From<String> for DomainError {
    fn from(s: String) -> Self {
        DomainError::Database(s)
    }
}

impl From<&str> for DomainError {
    fn from(s: &str) -> Self {
        DomainError::InvalidInput(s.to_string())
    }
}
