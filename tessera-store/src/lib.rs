//! # Tessera Store
//!
//! The transactional fact-store boundary consumed by the graph
//! directory and ingestion pipeline, plus an in-memory backend.
//!
//! The store's native data model is entity/attribute/value facts, not
//! triples. This crate defines three traits at the backend seam:
//!
//! - [`StoreBackend`]: store creation and connection by URL
//! - [`Connection`]: point-in-time snapshots and atomic transactions
//! - [`Snapshot`]: queries and entity dereferencing against one basis
//!
//! Transactions are all-or-nothing. A transaction may carry a
//! [`Precondition`] binding the commit to a snapshot basis; if the
//! store's log has advanced past that basis the commit reports
//! [`TransactResult::Conflict`] — an expected outcome, not an error —
//! which is the compare-and-swap primitive the prefix allocator's
//! optimistic protocol builds on.
//!
//! # Implementations
//!
//! - [`MemoryBackend`]: in-memory stores keyed by URL, for tests and
//!   embedders

pub mod error;
pub mod fact;
pub mod memory;

pub use error::{Result, StoreError};
pub use fact::{
    Assertion, AttributeDef, Cardinality, CommitReceipt, EntityId, EntitySpec, EntityView, Fact,
    Ident, Precondition, Transaction, TransactResult, TxOp, Uniqueness, Value, ValueSpec,
    ValueType,
};
pub use memory::MemoryBackend;

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

/// Backend store factory: creation and connection by storage URL.
#[async_trait]
pub trait StoreBackend: Debug + Send + Sync {
    /// Create a store at the given URL.
    ///
    /// Returns `true` if the store was created, `false` if it already
    /// existed. Creation is near-idempotent by design.
    async fn create_store(&self, url: &str) -> Result<bool>;

    /// Connect to an existing store.
    ///
    /// Fails with `StoreError::Unavailable` when no store exists at the
    /// URL or the backend cannot be reached.
    async fn connect(&self, url: &str) -> Result<Arc<dyn Connection>>;
}

/// A live connection to one store.
#[async_trait]
pub trait Connection: Debug + Send + Sync {
    /// The storage URL this connection was opened against
    fn url(&self) -> &str;

    /// Take a point-in-time snapshot of the store
    async fn snapshot(&self) -> Result<Arc<dyn Snapshot>>;

    /// Commit a transaction atomically.
    ///
    /// Preconditioned transactions report `TransactResult::Conflict`
    /// when stale; everything else either commits fully or fails with a
    /// typed error and no observable partial application.
    async fn transact(&self, tx: Transaction) -> Result<TransactResult>;
}

/// A point-in-time view of one store.
#[async_trait]
pub trait Snapshot: Debug + Send + Sync {
    /// Log position this snapshot was taken at
    fn basis_t(&self) -> u64;

    /// Look up one attribute definition
    async fn attribute(&self, ident: &Ident) -> Result<Option<AttributeDef>>;

    /// All installed attribute definitions
    async fn attributes(&self) -> Result<Vec<AttributeDef>>;

    /// Entities holding `attribute = value`
    async fn entities_with(&self, attribute: &Ident, value: &Value) -> Result<Vec<EntityId>>;

    /// All `(entity, value)` pairs for an attribute
    async fn facts_of(&self, attribute: &Ident) -> Result<Vec<(EntityId, Value)>>;

    /// Dereference an entity into a materialized view
    async fn entity(&self, id: EntityId) -> Result<Option<EntityView>>;
}
