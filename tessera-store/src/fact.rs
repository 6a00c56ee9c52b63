//! Fact, attribute, and transaction types.
//!
//! The store's native unit is the attribute fact
//! `(entity, attribute, value, t)`. Attributes are declared up front via
//! `AttributeDef`; value types are a closed variant set with exhaustive
//! matching at every consumer.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Internal entity identifier, allocated by the store.
pub type EntityId = u64;

/// Attribute identifier (e.g., `graph/name`, `ns1:knows`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ident(String);

impl Ident {
    /// Create an identifier
    pub fn new(name: impl Into<String>) -> Self {
        Ident(name.into())
    }

    /// View as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Ident {
    fn from(s: &str) -> Self {
        Ident::new(s)
    }
}

impl From<String> for Ident {
    fn from(s: String) -> Self {
        Ident(s)
    }
}

/// Declared value type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueType {
    /// Reference to another entity
    Ref,
    /// String value
    Str,
    /// Integer value
    Long,
    /// Floating value
    Double,
    /// Boolean value
    Bool,
}

/// Declared cardinality of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cardinality {
    /// At most one value per entity; re-assertion replaces
    One,
    /// Any number of values per entity
    Many,
}

/// Uniqueness constraint on an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Uniqueness {
    /// Unique and upserting: asserting an existing value against a
    /// tempid resolves the tempid to the owning entity
    Identity,
    /// Unique only: a second entity asserting the value fails the commit
    Value,
}

/// Attribute schema definition, installed once per store.
///
/// `rdf` marks attributes that encode RDF triple data; the triple
/// reader enumerates only flagged attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDef {
    pub ident: Ident,
    pub value_type: ValueType,
    pub cardinality: Cardinality,
    pub unique: Option<Uniqueness>,
    pub rdf: bool,
}

impl AttributeDef {
    /// Create a definition with no uniqueness and no RDF flag
    pub fn new(ident: impl Into<Ident>, value_type: ValueType, cardinality: Cardinality) -> Self {
        Self {
            ident: ident.into(),
            value_type,
            cardinality,
            unique: None,
            rdf: false,
        }
    }

    /// Mark as unique-identity (upserting)
    pub fn unique_identity(mut self) -> Self {
        self.unique = Some(Uniqueness::Identity);
        self
    }

    /// Mark as unique-value
    pub fn unique_value(mut self) -> Self {
        self.unique = Some(Uniqueness::Value);
        self
    }

    /// Flag as RDF-originated
    pub fn rdf(mut self) -> Self {
        self.rdf = true;
        self
    }
}

/// A stored value.
///
/// `PartialEq` only — `Double` carries an `f64`. Uniqueness checks
/// compare through `PartialEq`, so `NaN` never satisfies a uniqueness
/// match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Ref(EntityId),
    Str(String),
    Long(i64),
    Double(f64),
    Bool(bool),
}

impl Value {
    /// The declared type this value satisfies
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Ref(_) => ValueType::Ref,
            Value::Str(_) => ValueType::Str,
            Value::Long(_) => ValueType::Long,
            Value::Double(_) => ValueType::Double,
            Value::Bool(_) => ValueType::Bool,
        }
    }

    /// String constructor
    pub fn str(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    /// View a string value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// View a reference value
    pub fn as_ref_id(&self) -> Option<EntityId> {
        match self {
            Value::Ref(id) => Some(*id),
            _ => None,
        }
    }
}

/// One persisted fact.
#[derive(Debug, Clone, PartialEq)]
pub struct Fact {
    pub entity: EntityId,
    pub attribute: Ident,
    pub value: Value,
    pub t: u64,
}

/// Entity position of an assertion: an existing id or a tempid resolved
/// at commit time.
#[derive(Debug, Clone, PartialEq)]
pub enum EntitySpec {
    /// Existing entity
    Id(EntityId),
    /// Transaction-local placeholder, resolved (possibly by identity
    /// upsert) when the transaction commits
    Temp(String),
}

/// Value position of an assertion.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueSpec {
    /// Concrete value
    Val(Value),
    /// Reference to an entity named by tempid in this transaction
    TempRef(String),
}

/// A single assertion.
#[derive(Debug, Clone, PartialEq)]
pub struct Assertion {
    pub entity: EntitySpec,
    pub attribute: Ident,
    pub value: ValueSpec,
}

/// One operation in a transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum TxOp {
    Assert(Assertion),
    InstallAttribute(AttributeDef),
}

/// Commit precondition for optimistic concurrency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    /// Fail the commit if the store's log has advanced past `t`
    BasisT(u64),
}

/// An atomic batch of operations.
///
/// All operations commit together or not at all. With a precondition
/// attached, a stale basis reports `TransactResult::Conflict` instead of
/// committing.
#[derive(Debug, Clone, Default)]
pub struct Transaction {
    pub ops: Vec<TxOp>,
    pub precondition: Option<Precondition>,
}

impl Transaction {
    /// Create an empty transaction
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an assertion against an existing entity
    pub fn assert(
        mut self,
        entity: EntitySpec,
        attribute: impl Into<Ident>,
        value: ValueSpec,
    ) -> Self {
        self.ops.push(TxOp::Assert(Assertion {
            entity,
            attribute: attribute.into(),
            value,
        }));
        self
    }

    /// Append an attribute installation
    pub fn install(mut self, def: AttributeDef) -> Self {
        self.ops.push(TxOp::InstallAttribute(def));
        self
    }

    /// Bind the commit to a snapshot basis
    pub fn with_basis(mut self, t: u64) -> Self {
        self.precondition = Some(Precondition::BasisT(t));
        self
    }

    /// True if the transaction carries no operations
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Receipt for a committed transaction.
#[derive(Debug, Clone)]
pub struct CommitReceipt {
    /// Log position of this commit
    pub t: u64,
    /// Resolved tempid bindings
    pub tempids: HashMap<String, EntityId>,
}

/// Outcome of `Connection::transact`.
///
/// Conflicts are expected outcomes of concurrent preconditioned writes,
/// not errors; callers retry or report as appropriate.
#[derive(Debug, Clone)]
pub enum TransactResult {
    /// The transaction committed
    Committed(CommitReceipt),
    /// The precondition failed: the log advanced past the basis
    Conflict { basis_t: u64, current_t: u64 },
}

impl TransactResult {
    /// Unwrap a committed receipt, mapping conflicts to an error.
    ///
    /// For transactions with no precondition (which cannot conflict) and
    /// for callers that treat an unexpected conflict as fatal.
    pub fn committed(self) -> crate::error::Result<CommitReceipt> {
        match self {
            TransactResult::Committed(receipt) => Ok(receipt),
            TransactResult::Conflict { basis_t, current_t } => Err(crate::StoreError::other(
                format!("unexpected commit conflict: basis_t={basis_t}, current_t={current_t}"),
            )),
        }
    }
}

/// Materialized view of one entity, as returned by dereferencing.
#[derive(Debug, Clone, Default)]
pub struct EntityView {
    pub id: EntityId,
    attrs: HashMap<Ident, Vec<Value>>,
}

impl EntityView {
    /// Build a view from facts
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            attrs: HashMap::new(),
        }
    }

    /// Append a value under an attribute
    pub fn push(&mut self, attribute: Ident, value: Value) {
        self.attrs.entry(attribute).or_default().push(value);
    }

    /// All values of an attribute
    pub fn get(&self, attribute: &Ident) -> &[Value] {
        self.attrs.get(attribute).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Single value of a cardinality-one attribute
    pub fn get_one(&self, attribute: &Ident) -> Option<&Value> {
        self.get(attribute).first()
    }

    /// Iterate `(attribute, values)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&Ident, &[Value])> {
        self.attrs.iter().map(|(k, v)| (k, v.as_slice()))
    }
}
