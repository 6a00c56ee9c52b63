//! Error types for tessera-store

use crate::fact::{Ident, Value, ValueType};
use thiserror::Error;

/// Result type alias using StoreError
pub type Result<T> = std::result::Result<T, StoreError>;

/// Store-related errors
///
/// Commit conflicts from conditional transactions are NOT errors — they
/// are expected outcomes of concurrent writes, reported through
/// `TransactResult::Conflict` so callers can retry.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Backend cannot be reached or the store does not exist
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Assertion references an attribute with no installed definition
    #[error("Unknown attribute: {0}")]
    UnknownAttribute(Ident),

    /// Installing an attribute whose definition conflicts with an
    /// existing one
    #[error("Attribute definition conflict: {0}")]
    AttributeConflict(Ident),

    /// Asserted value does not match the attribute's declared type
    #[error("Type mismatch on {attribute}: expected {expected:?}, got {value:?}")]
    TypeMismatch {
        attribute: Ident,
        expected: ValueType,
        value: Value,
    },

    /// Unique attribute value already owned by a different entity
    #[error("Unique conflict on {attribute}: value {value:?} already asserted")]
    UniqueConflict { attribute: Ident, value: Value },

    /// Reference to an entity id that does not exist in the store
    #[error("Dangling entity reference: {0}")]
    DanglingRef(u64),

    /// Tempid used in value position but never asserted as an entity
    #[error("Unresolved tempid: {0}")]
    UnresolvedTempId(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl StoreError {
    /// Create an unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        StoreError::Unavailable(msg.into())
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        StoreError::Other(msg.into())
    }
}
