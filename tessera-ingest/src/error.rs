//! Error types for tessera-ingest

use thiserror::Error;

/// Result type alias using IngestError
pub type Result<T> = std::result::Result<T, IngestError>;

/// Ingestion and reading errors
#[derive(Error, Debug)]
pub enum IngestError {
    /// A predicate was observed (or installed) with incompatible value
    /// shapes; surfaced, never retried
    #[error("Schema conflict on {predicate}: {detail}")]
    SchemaConflict { predicate: String, detail: String },

    /// Data references a predicate with no installed attribute
    #[error("Unknown predicate: {0}")]
    UnknownPredicate(String),

    /// The triple source failed mid-stream
    #[error("Parse error: {0}")]
    Parse(String),

    /// Core library error
    #[error(transparent)]
    Core(#[from] tessera_core::Error),

    /// Directory error (prefix allocation, namespace table)
    #[error(transparent)]
    Directory(#[from] tessera_directory::DirectoryError),

    /// Backend store error, propagated unchanged
    #[error(transparent)]
    Store(#[from] tessera_store::StoreError),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl IngestError {
    /// Create a schema conflict error
    pub fn schema_conflict(predicate: impl Into<String>, detail: impl Into<String>) -> Self {
        IngestError::SchemaConflict {
            predicate: predicate.into(),
            detail: detail.into(),
        }
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        IngestError::Parse(msg.into())
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        IngestError::Other(msg.into())
    }
}
