//! In-memory store backend.
//!
//! Stores are registered per URL and held behind `Arc<RwLock>` for
//! interior mutability, making the backend thread-safe and suitable for
//! multi-threaded async runtimes. Each store keeps a current fact set
//! and a monotonically increasing log position `t`; snapshots clone the
//! state at their basis, so readers never observe a half-applied
//! transaction.

use crate::error::{Result, StoreError};
use crate::fact::{
    Assertion, AttributeDef, Cardinality, CommitReceipt, EntityId, EntitySpec, EntityView, Fact,
    Ident, Precondition, Transaction, TransactResult, TxOp, Uniqueness, Value, ValueSpec,
};
use crate::{Connection, Snapshot, StoreBackend};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;
use tracing::{debug, info};

/// In-memory backend holding stores keyed by URL.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    stores: Arc<RwLock<HashMap<String, Arc<MemoryStore>>>>,
}

impl Debug for MemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stores = self.stores.read();
        f.debug_struct("MemoryBackend")
            .field("store_count", &stores.len())
            .finish()
    }
}

impl MemoryBackend {
    /// Create a new empty backend
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StoreBackend for MemoryBackend {
    async fn create_store(&self, url: &str) -> Result<bool> {
        let mut stores = self.stores.write();
        if stores.contains_key(url) {
            return Ok(false);
        }
        stores.insert(url.to_string(), Arc::new(MemoryStore::new(url)));
        info!(url, "created store");
        Ok(true)
    }

    async fn connect(&self, url: &str) -> Result<Arc<dyn Connection>> {
        let store = self
            .stores
            .read()
            .get(url)
            .cloned()
            .ok_or_else(|| StoreError::unavailable(format!("no store at {}", url)))?;
        Ok(Arc::new(MemoryConnection {
            url: url.to_string(),
            store,
        }))
    }
}

/// One in-memory store: current facts plus log position.
struct MemoryStore {
    url: String,
    state: RwLock<StoreState>,
}

#[derive(Default)]
struct StoreState {
    /// Current log position; 0 = empty store
    t: u64,
    /// Next entity id to allocate; ids start at 1
    next_entity: EntityId,
    attributes: HashMap<Ident, AttributeDef>,
    facts: Vec<Fact>,
}

impl MemoryStore {
    fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            state: RwLock::new(StoreState {
                t: 0,
                next_entity: 1,
                attributes: HashMap::new(),
                facts: Vec::new(),
            }),
        }
    }
}

impl Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("MemoryStore")
            .field("url", &self.url)
            .field("t", &state.t)
            .field("fact_count", &state.facts.len())
            .finish()
    }
}

/// Connection to one in-memory store.
struct MemoryConnection {
    url: String,
    store: Arc<MemoryStore>,
}

impl Debug for MemoryConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryConnection")
            .field("url", &self.url)
            .finish()
    }
}

#[async_trait]
impl Connection for MemoryConnection {
    fn url(&self) -> &str {
        &self.url
    }

    async fn snapshot(&self) -> Result<Arc<dyn Snapshot>> {
        let state = self.store.state.read();
        Ok(Arc::new(MemorySnapshot {
            basis_t: state.t,
            attributes: state.attributes.clone(),
            facts: state.facts.clone(),
        }))
    }

    async fn transact(&self, tx: Transaction) -> Result<TransactResult> {
        let mut state = self.store.state.write();
        apply(&mut state, tx)
    }
}

/// Validate and apply a transaction against locked state.
///
/// Validation runs to completion before any mutation, so a failing
/// transaction leaves the store untouched.
fn apply(state: &mut StoreState, tx: Transaction) -> Result<TransactResult> {
    if let Some(Precondition::BasisT(basis_t)) = tx.precondition {
        if state.t > basis_t {
            debug!(basis_t, current_t = state.t, "commit conflict");
            return Ok(TransactResult::Conflict {
                basis_t,
                current_t: state.t,
            });
        }
    }

    let mut installs: Vec<AttributeDef> = Vec::new();
    let mut asserts: Vec<Assertion> = Vec::new();
    for op in tx.ops {
        match op {
            TxOp::InstallAttribute(def) => installs.push(def),
            TxOp::Assert(a) => asserts.push(a),
        }
    }

    // Attribute installs: identical re-install is a no-op, any
    // difference fails the whole commit.
    let mut new_attrs: HashMap<Ident, AttributeDef> = HashMap::new();
    for def in installs {
        match state.attributes.get(&def.ident).or_else(|| new_attrs.get(&def.ident)) {
            Some(existing) if *existing != def => {
                return Err(StoreError::AttributeConflict(def.ident));
            }
            Some(_) => {}
            None => {
                new_attrs.insert(def.ident.clone(), def);
            }
        }
    }
    let attr_of = |ident: &Ident| -> Option<AttributeDef> {
        new_attrs
            .get(ident)
            .or_else(|| state.attributes.get(ident))
            .cloned()
    };

    // Tempid resolution pass 1: identity upsert against existing facts.
    let mut bindings: HashMap<String, EntityId> = HashMap::new();
    for a in &asserts {
        let EntitySpec::Temp(tempid) = &a.entity else {
            continue;
        };
        let Some(def) = attr_of(&a.attribute) else {
            return Err(StoreError::UnknownAttribute(a.attribute.clone()));
        };
        if def.unique != Some(Uniqueness::Identity) {
            continue;
        }
        let ValueSpec::Val(value) = &a.value else {
            continue;
        };
        if let Some(owner) = owner_of(&state.facts, &a.attribute, value) {
            match bindings.get(tempid) {
                Some(&bound) if bound != owner => {
                    return Err(StoreError::other(format!(
                        "tempid {} upserts to two entities ({} and {})",
                        tempid, bound, owner
                    )));
                }
                _ => {
                    bindings.insert(tempid.clone(), owner);
                }
            }
        }
    }

    // Pass 2: allocate fresh ids for unbound tempids, in first-seen order.
    let mut next_entity = state.next_entity;
    for a in &asserts {
        if let EntitySpec::Temp(tempid) = &a.entity {
            bindings.entry(tempid.clone()).or_insert_with(|| {
                let id = next_entity;
                next_entity += 1;
                id
            });
        }
    }

    // Stage facts with full validation; nothing mutates yet.
    let next_t = state.t + 1;
    let mut staged: Vec<Fact> = Vec::with_capacity(asserts.len());
    for a in asserts {
        let entity = match &a.entity {
            EntitySpec::Id(id) => {
                if *id == 0 || *id >= state.next_entity {
                    return Err(StoreError::DanglingRef(*id));
                }
                *id
            }
            // Bound in pass 2
            EntitySpec::Temp(tempid) => bindings[tempid],
        };
        let def = attr_of(&a.attribute)
            .ok_or_else(|| StoreError::UnknownAttribute(a.attribute.clone()))?;
        let value = match a.value {
            ValueSpec::Val(v) => v,
            ValueSpec::TempRef(tempid) => {
                let id = bindings
                    .get(&tempid)
                    .copied()
                    .ok_or(StoreError::UnresolvedTempId(tempid))?;
                Value::Ref(id)
            }
        };
        if value.value_type() != def.value_type {
            return Err(StoreError::TypeMismatch {
                attribute: a.attribute,
                expected: def.value_type,
                value,
            });
        }
        if let Value::Ref(target) = value {
            if target == 0 || target >= next_entity {
                return Err(StoreError::DanglingRef(target));
            }
        }

        if def.unique.is_some() {
            let existing = owner_of(&state.facts, &a.attribute, &value)
                .or_else(|| owner_of(&staged, &a.attribute, &value));
            if let Some(owner) = existing {
                if owner != entity {
                    return Err(StoreError::UniqueConflict {
                        attribute: a.attribute,
                        value,
                    });
                }
            }
        }

        match def.cardinality {
            Cardinality::One => {
                // Replacement within the staged batch: last assertion wins
                staged.retain(|f| !(f.entity == entity && f.attribute == a.attribute));
                staged.push(Fact {
                    entity,
                    attribute: a.attribute,
                    value,
                    t: next_t,
                });
            }
            Cardinality::Many => {
                let dup_in = |facts: &[Fact]| {
                    facts.iter().any(|f| {
                        f.entity == entity && f.attribute == a.attribute && f.value == value
                    })
                };
                if !dup_in(&state.facts) && !dup_in(&staged) {
                    staged.push(Fact {
                        entity,
                        attribute: a.attribute,
                        value,
                        t: next_t,
                    });
                }
            }
        }
    }

    // Apply: cardinality-one re-assertions replace the prior fact.
    let replaced: Vec<(EntityId, Ident)> = staged
        .iter()
        .filter(|f| {
            attr_of(&f.attribute).map(|d| d.cardinality) == Some(Cardinality::One)
        })
        .map(|f| (f.entity, f.attribute.clone()))
        .collect();
    state
        .facts
        .retain(|f| !replaced.iter().any(|(e, a)| f.entity == *e && f.attribute == *a));
    state.facts.extend(staged);
    state.attributes.extend(new_attrs);
    state.next_entity = next_entity;
    state.t = next_t;

    Ok(TransactResult::Committed(CommitReceipt {
        t: next_t,
        tempids: bindings,
    }))
}

/// Find the entity currently owning `attribute = value`, if any.
fn owner_of(facts: &[Fact], attribute: &Ident, value: &Value) -> Option<EntityId> {
    facts
        .iter()
        .find(|f| f.attribute == *attribute && f.value == *value)
        .map(|f| f.entity)
}

/// Point-in-time view cloned from store state.
struct MemorySnapshot {
    basis_t: u64,
    attributes: HashMap<Ident, AttributeDef>,
    facts: Vec<Fact>,
}

impl Debug for MemorySnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySnapshot")
            .field("basis_t", &self.basis_t)
            .field("fact_count", &self.facts.len())
            .finish()
    }
}

#[async_trait]
impl Snapshot for MemorySnapshot {
    fn basis_t(&self) -> u64 {
        self.basis_t
    }

    async fn attribute(&self, ident: &Ident) -> Result<Option<AttributeDef>> {
        Ok(self.attributes.get(ident).cloned())
    }

    async fn attributes(&self) -> Result<Vec<AttributeDef>> {
        Ok(self.attributes.values().cloned().collect())
    }

    async fn entities_with(&self, attribute: &Ident, value: &Value) -> Result<Vec<EntityId>> {
        Ok(self
            .facts
            .iter()
            .filter(|f| f.attribute == *attribute && f.value == *value)
            .map(|f| f.entity)
            .collect())
    }

    async fn facts_of(&self, attribute: &Ident) -> Result<Vec<(EntityId, Value)>> {
        Ok(self
            .facts
            .iter()
            .filter(|f| f.attribute == *attribute)
            .map(|f| (f.entity, f.value.clone()))
            .collect())
    }

    async fn entity(&self, id: EntityId) -> Result<Option<EntityView>> {
        let mut view = EntityView::new(id);
        let mut found = false;
        for f in self.facts.iter().filter(|f| f.entity == id) {
            view.push(f.attribute.clone(), f.value.clone());
            found = true;
        }
        Ok(found.then_some(view))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fact::ValueType;

    fn name_attr() -> AttributeDef {
        AttributeDef::new("person/name", ValueType::Str, Cardinality::One)
    }

    fn id_attr() -> AttributeDef {
        AttributeDef::new("person/id", ValueType::Str, Cardinality::One).unique_identity()
    }

    #[tokio::test]
    async fn test_create_and_connect() {
        let backend = MemoryBackend::new();
        assert!(backend.create_store("tessera:mem://a").await.unwrap());
        assert!(!backend.create_store("tessera:mem://a").await.unwrap());
        let conn = backend.connect("tessera:mem://a").await.unwrap();
        assert_eq!(conn.url(), "tessera:mem://a");
    }

    #[tokio::test]
    async fn test_connect_missing_store_is_unavailable() {
        let backend = MemoryBackend::new();
        let err = backend.connect("tessera:mem://nope").await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_commit_and_query() {
        let backend = MemoryBackend::new();
        backend.create_store("tessera:mem://a").await.unwrap();
        let conn = backend.connect("tessera:mem://a").await.unwrap();

        let tx = Transaction::new().install(name_attr()).assert(
            EntitySpec::Temp("p".into()),
            "person/name",
            ValueSpec::Val(Value::str("Alice")),
        );
        let receipt = conn.transact(tx).await.unwrap().committed().unwrap();
        assert_eq!(receipt.t, 1);
        let alice = receipt.tempids["p"];

        let snap = conn.snapshot().await.unwrap();
        assert_eq!(snap.basis_t(), 1);
        assert_eq!(
            snap.entities_with(&Ident::new("person/name"), &Value::str("Alice"))
                .await
                .unwrap(),
            vec![alice]
        );
        let view = snap.entity(alice).await.unwrap().unwrap();
        assert_eq!(
            view.get_one(&Ident::new("person/name")),
            Some(&Value::str("Alice"))
        );
    }

    #[tokio::test]
    async fn test_snapshot_isolation() {
        let backend = MemoryBackend::new();
        backend.create_store("tessera:mem://a").await.unwrap();
        let conn = backend.connect("tessera:mem://a").await.unwrap();

        conn.transact(Transaction::new().install(name_attr()))
            .await
            .unwrap();
        let before = conn.snapshot().await.unwrap();

        conn.transact(Transaction::new().assert(
            EntitySpec::Temp("p".into()),
            "person/name",
            ValueSpec::Val(Value::str("Alice")),
        ))
        .await
        .unwrap();

        // The old snapshot still sees the empty store
        assert!(before
            .facts_of(&Ident::new("person/name"))
            .await
            .unwrap()
            .is_empty());
        let after = conn.snapshot().await.unwrap();
        assert_eq!(
            after.facts_of(&Ident::new("person/name")).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn test_preconditioned_commit_conflicts_when_stale() {
        let backend = MemoryBackend::new();
        backend.create_store("tessera:mem://a").await.unwrap();
        let conn = backend.connect("tessera:mem://a").await.unwrap();
        conn.transact(Transaction::new().install(name_attr()))
            .await
            .unwrap();

        let snap = conn.snapshot().await.unwrap();

        // A competing writer advances the log past the snapshot basis
        conn.transact(Transaction::new().assert(
            EntitySpec::Temp("x".into()),
            "person/name",
            ValueSpec::Val(Value::str("Bob")),
        ))
        .await
        .unwrap();

        let stale = Transaction::new()
            .assert(
                EntitySpec::Temp("y".into()),
                "person/name",
                ValueSpec::Val(Value::str("Carol")),
            )
            .with_basis(snap.basis_t());
        match conn.transact(stale).await.unwrap() {
            TransactResult::Conflict { basis_t, current_t } => {
                assert_eq!(basis_t, 1);
                assert_eq!(current_t, 2);
            }
            TransactResult::Committed(_) => panic!("stale commit must conflict"),
        }

        // Nothing from the conflicted transaction is visible
        let snap = conn.snapshot().await.unwrap();
        assert!(snap
            .entities_with(&Ident::new("person/name"), &Value::str("Carol"))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_identity_upsert_resolves_to_existing_entity() {
        let backend = MemoryBackend::new();
        backend.create_store("tessera:mem://a").await.unwrap();
        let conn = backend.connect("tessera:mem://a").await.unwrap();

        let tx = Transaction::new()
            .install(id_attr())
            .install(name_attr())
            .assert(
                EntitySpec::Temp("p".into()),
                "person/id",
                ValueSpec::Val(Value::str("ex:alice")),
            );
        let first = conn.transact(tx).await.unwrap().committed().unwrap();
        let alice = first.tempids["p"];

        // Second transaction re-asserts the identity value with a fresh
        // tempid; it must resolve to the same entity.
        let tx = Transaction::new()
            .assert(
                EntitySpec::Temp("q".into()),
                "person/id",
                ValueSpec::Val(Value::str("ex:alice")),
            )
            .assert(
                EntitySpec::Temp("q".into()),
                "person/name",
                ValueSpec::Val(Value::str("Alice")),
            );
        let second = conn.transact(tx).await.unwrap().committed().unwrap();
        assert_eq!(second.tempids["q"], alice);
    }

    #[tokio::test]
    async fn test_unique_conflict_fails_whole_commit() {
        let backend = MemoryBackend::new();
        backend.create_store("tessera:mem://a").await.unwrap();
        let conn = backend.connect("tessera:mem://a").await.unwrap();

        let unique_url =
            AttributeDef::new("graph/url", ValueType::Str, Cardinality::One).unique_value();
        conn.transact(
            Transaction::new().install(unique_url).assert(
                EntitySpec::Temp("g".into()),
                "graph/url",
                ValueSpec::Val(Value::str("tessera:mem://g1")),
            ),
        )
        .await
        .unwrap();

        let err = conn
            .transact(Transaction::new().assert(
                EntitySpec::Temp("h".into()),
                "graph/url",
                ValueSpec::Val(Value::str("tessera:mem://g1")),
            ))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UniqueConflict { .. }));
    }

    #[tokio::test]
    async fn test_cardinality_one_replaces() {
        let backend = MemoryBackend::new();
        backend.create_store("tessera:mem://a").await.unwrap();
        let conn = backend.connect("tessera:mem://a").await.unwrap();

        let tx = Transaction::new().install(name_attr()).assert(
            EntitySpec::Temp("p".into()),
            "person/name",
            ValueSpec::Val(Value::str("Alice")),
        );
        let receipt = conn.transact(tx).await.unwrap().committed().unwrap();
        let alice = receipt.tempids["p"];

        conn.transact(Transaction::new().assert(
            EntitySpec::Id(alice),
            "person/name",
            ValueSpec::Val(Value::str("Alicia")),
        ))
        .await
        .unwrap();

        let snap = conn.snapshot().await.unwrap();
        let view = snap.entity(alice).await.unwrap().unwrap();
        assert_eq!(view.get(&Ident::new("person/name")).len(), 1);
        assert_eq!(
            view.get_one(&Ident::new("person/name")),
            Some(&Value::str("Alicia"))
        );
    }

    #[tokio::test]
    async fn test_failed_commit_is_invisible() {
        let backend = MemoryBackend::new();
        backend.create_store("tessera:mem://a").await.unwrap();
        let conn = backend.connect("tessera:mem://a").await.unwrap();
        conn.transact(Transaction::new().install(name_attr()))
            .await
            .unwrap();

        // Two good assertions plus one against an unknown attribute:
        // the whole batch must vanish.
        let tx = Transaction::new()
            .assert(
                EntitySpec::Temp("p".into()),
                "person/name",
                ValueSpec::Val(Value::str("Alice")),
            )
            .assert(
                EntitySpec::Temp("q".into()),
                "person/name",
                ValueSpec::Val(Value::str("Bob")),
            )
            .assert(
                EntitySpec::Temp("p".into()),
                "person/age",
                ValueSpec::Val(Value::Long(30)),
            );
        let err = conn.transact(tx).await.unwrap_err();
        assert!(matches!(err, StoreError::UnknownAttribute(_)));

        let snap = conn.snapshot().await.unwrap();
        assert_eq!(snap.basis_t(), 1);
        assert!(snap
            .facts_of(&Ident::new("person/name"))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_tempref_links_entities() {
        let backend = MemoryBackend::new();
        backend.create_store("tessera:mem://a").await.unwrap();
        let conn = backend.connect("tessera:mem://a").await.unwrap();

        let knows = AttributeDef::new("person/knows", ValueType::Ref, Cardinality::Many);
        let tx = Transaction::new()
            .install(id_attr())
            .install(knows)
            .assert(
                EntitySpec::Temp("a".into()),
                "person/id",
                ValueSpec::Val(Value::str("ex:a")),
            )
            .assert(
                EntitySpec::Temp("b".into()),
                "person/id",
                ValueSpec::Val(Value::str("ex:b")),
            )
            .assert(
                EntitySpec::Temp("a".into()),
                "person/knows",
                ValueSpec::TempRef("b".into()),
            );
        let receipt = conn.transact(tx).await.unwrap().committed().unwrap();
        let (a, b) = (receipt.tempids["a"], receipt.tempids["b"]);

        let snap = conn.snapshot().await.unwrap();
        let view = snap.entity(a).await.unwrap().unwrap();
        assert_eq!(
            view.get_one(&Ident::new("person/knows")),
            Some(&Value::Ref(b))
        );
    }

    #[tokio::test]
    async fn test_type_mismatch_rejected() {
        let backend = MemoryBackend::new();
        backend.create_store("tessera:mem://a").await.unwrap();
        let conn = backend.connect("tessera:mem://a").await.unwrap();

        let err = conn
            .transact(
                Transaction::new().install(name_attr()).assert(
                    EntitySpec::Temp("p".into()),
                    "person/name",
                    ValueSpec::Val(Value::Long(42)),
                ),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::TypeMismatch { .. }));
    }

    #[tokio::test]
    async fn test_reinstall_identical_attribute_is_noop() {
        let backend = MemoryBackend::new();
        backend.create_store("tessera:mem://a").await.unwrap();
        let conn = backend.connect("tessera:mem://a").await.unwrap();

        conn.transact(Transaction::new().install(name_attr()))
            .await
            .unwrap();
        conn.transact(Transaction::new().install(name_attr()))
            .await
            .unwrap();

        // Conflicting redefinition fails
        let changed = AttributeDef::new("person/name", ValueType::Str, Cardinality::Many);
        let err = conn
            .transact(Transaction::new().install(changed))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::AttributeConflict(_)));
    }
}
