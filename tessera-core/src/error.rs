//! Error types for tessera-core

use thiserror::Error;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed IRI
    #[error("Invalid IRI: {0}")]
    InvalidIri(String),

    /// Malformed prefixed name (expected `prefix:local`)
    #[error("Invalid prefixed name: {0}")]
    InvalidPrefixedName(String),

    /// Prefix has no namespace binding in the supplied table
    #[error("Unknown prefix: {0}")]
    UnknownPrefix(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an invalid IRI error
    pub fn invalid_iri(msg: impl Into<String>) -> Self {
        Error::InvalidIri(msg.into())
    }

    /// Create an invalid prefixed name error
    pub fn invalid_prefixed_name(msg: impl Into<String>) -> Self {
        Error::InvalidPrefixedName(msg.into())
    }

    /// Create an unknown prefix error
    pub fn unknown_prefix(prefix: impl Into<String>) -> Self {
        Error::UnknownPrefix(prefix.into())
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }
}
