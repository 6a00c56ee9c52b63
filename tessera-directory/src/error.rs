//! Error types for tessera-directory

use thiserror::Error;

/// Result type alias using DirectoryError
pub type Result<T> = std::result::Result<T, DirectoryError>;

/// Directory-related errors
#[derive(Error, Debug)]
pub enum DirectoryError {
    /// Storage URL matches no known grammar; fatal, never retried
    #[error("Unrecognized storage URL scheme: {0}")]
    UnrecognizedScheme(String),

    /// The system store references a graph whose backing store cannot
    /// be connected to; indicates external corruption or manual store
    /// deletion
    #[error("Inconsistent directory: {0}")]
    InconsistentDirectory(String),

    /// Graph IRI cannot be split into usable namespace/local parts
    #[error("Invalid graph IRI: {0}")]
    InvalidGraphIri(String),

    /// Malformed directory configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Core library error
    #[error(transparent)]
    Core(#[from] tessera_core::Error),

    /// Backend store error, propagated unchanged
    #[error(transparent)]
    Store(#[from] tessera_store::StoreError),
}

impl DirectoryError {
    /// Create an unrecognized scheme error
    pub fn unrecognized_scheme(url: impl Into<String>) -> Self {
        DirectoryError::UnrecognizedScheme(url.into())
    }

    /// Create an inconsistent directory error
    pub fn inconsistent(msg: impl Into<String>) -> Self {
        DirectoryError::InconsistentDirectory(msg.into())
    }

    /// Create an invalid graph IRI error
    pub fn invalid_graph_iri(msg: impl Into<String>) -> Self {
        DirectoryError::InvalidGraphIri(msg.into())
    }

    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        DirectoryError::InvalidConfig(msg.into())
    }
}
