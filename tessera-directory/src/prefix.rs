//! Namespace prefix allocation under optimistic concurrency.
//!
//! Prefixes live in the system store as `(ns/prefix, ns/iri)` entry
//! pairs, unique on both sides and never reassigned. Minting a new
//! prefix is the system's only optimistic-retry loop:
//!
//! 1. snapshot the system store
//! 2. return the existing prefix if the namespace is already entered
//! 3. scan generated prefixes (`ns{N}`) for the maximum suffix and
//!    propose `ns{max+1}`
//! 4. commit the new entry conditioned on the snapshot basis
//! 5. on conflict, re-read and retry from 3 — unbounded, convergence
//!    follows from the store's monotonic log
//!
//! The candidate scan is a pure snapshot scan on every attempt; no
//! maximum is ever cached in process memory. Skipping the conditional
//! check would let concurrent writers mint one prefix for two different
//! namespaces, so the commit is always preconditioned.

use crate::error::{DirectoryError, Result};
use crate::vocab::{GENERATED_PREFIX_STEM, NS_IRI, NS_PREFIX};
use std::collections::HashMap;
use std::sync::Arc;
use tessera_core::bare_prefix;
use tessera_store::{
    Connection, EntitySpec, Ident, Snapshot, Transaction, TransactResult, Value, ValueSpec,
};
use tracing::debug;

/// Bidirectional prefix ⇄ namespace lookup table.
///
/// Materialized from the system store; the ingestion pipeline extends
/// it as new namespaces are minted mid-stream.
#[derive(Debug, Clone, Default)]
pub struct NamespaceTable {
    by_prefix: HashMap<String, String>,
    by_iri: HashMap<String, String>,
}

impl NamespaceTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a `(prefix, namespace)` pair
    pub fn insert(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        let prefix = prefix.into();
        let namespace = namespace.into();
        self.by_prefix.insert(prefix.clone(), namespace.clone());
        self.by_iri.insert(namespace, prefix);
    }

    /// Prefix registered for a namespace IRI
    pub fn prefix_for(&self, namespace: &str) -> Option<&str> {
        self.by_iri.get(namespace).map(String::as_str)
    }

    /// Namespace IRI registered for a prefix
    pub fn iri_for(&self, prefix: &str) -> Option<&str> {
        self.by_prefix.get(prefix).map(String::as_str)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.by_prefix.len()
    }

    /// True if no entries are registered
    pub fn is_empty(&self) -> bool {
        self.by_prefix.is_empty()
    }
}

/// Materialize the namespace table from the system store.
pub async fn namespace_table(system: &Arc<dyn Connection>) -> Result<NamespaceTable> {
    let snap = system.snapshot().await?;
    let mut table = NamespaceTable::new();
    for (entity, value) in snap.facts_of(&Ident::new(NS_PREFIX)).await? {
        let Some(prefix) = value.as_str() else {
            continue;
        };
        let view = snap.entity(entity).await?.ok_or_else(|| {
            DirectoryError::inconsistent(format!("namespace entry {} has no facts", entity))
        })?;
        let iri = view
            .get_one(&Ident::new(NS_IRI))
            .and_then(Value::as_str)
            .ok_or_else(|| {
                DirectoryError::inconsistent(format!(
                    "namespace entry for prefix {} has no IRI",
                    prefix
                ))
            })?;
        table.insert(prefix, iri);
    }
    Ok(table)
}

/// Resolve the prefix for a namespace IRI, minting a fresh one when the
/// system store has no entry yet.
///
/// Caller-supplied bare prefix tokens (e.g. `"ex:"`) short-circuit:
/// the trailing separator is stripped and the token returned without
/// touching the store. Every successful mint is globally unique; a call
/// for an already-entered namespace returns the previously minted
/// prefix. Retries on commit conflict are unbounded and logged at debug
/// level.
pub async fn resolve_or_mint_prefix(
    system: &Arc<dyn Connection>,
    namespace: &str,
) -> Result<String> {
    if let Some(token) = bare_prefix(namespace) {
        return Ok(token.to_string());
    }

    loop {
        let snap = system.snapshot().await?;
        if let Some(prefix) = lookup_prefix(&snap, namespace).await? {
            return Ok(prefix);
        }

        let candidate = next_generated_prefix(&snap).await?;
        let tx = Transaction::new()
            .assert(
                EntitySpec::Temp("ns-entry".into()),
                NS_PREFIX,
                ValueSpec::Val(Value::str(candidate.clone())),
            )
            .assert(
                EntitySpec::Temp("ns-entry".into()),
                NS_IRI,
                ValueSpec::Val(Value::str(namespace)),
            )
            .with_basis(snap.basis_t());

        match system.transact(tx).await? {
            TransactResult::Committed(_) => {
                debug!(prefix = %candidate, namespace, "minted namespace prefix");
                return Ok(candidate);
            }
            TransactResult::Conflict { basis_t, current_t } => {
                debug!(
                    candidate = %candidate,
                    basis_t,
                    current_t,
                    "prefix mint conflicted, retrying"
                );
            }
        }
    }
}

/// Look up the prefix entered for a namespace IRI in one snapshot.
async fn lookup_prefix(snap: &Arc<dyn Snapshot>, namespace: &str) -> Result<Option<String>> {
    let entities = snap
        .entities_with(&Ident::new(NS_IRI), &Value::str(namespace))
        .await?;
    let Some(&entity) = entities.first() else {
        return Ok(None);
    };
    let view = snap.entity(entity).await?.ok_or_else(|| {
        DirectoryError::inconsistent(format!("namespace entry {} has no facts", entity))
    })?;
    let prefix = view
        .get_one(&Ident::new(NS_PREFIX))
        .and_then(Value::as_str)
        .ok_or_else(|| {
            DirectoryError::inconsistent(format!(
                "namespace entry for {} has no prefix",
                namespace
            ))
        })?;
    Ok(Some(prefix.to_string()))
}

/// Scan all generated prefixes (`ns{N}`) and propose `ns{max+1}`.
async fn next_generated_prefix(snap: &Arc<dyn Snapshot>) -> Result<String> {
    let mut max: u64 = 0;
    for (_, value) in snap.facts_of(&Ident::new(NS_PREFIX)).await? {
        let Some(prefix) = value.as_str() else {
            continue;
        };
        if let Some(n) = prefix
            .strip_prefix(GENERATED_PREFIX_STEM)
            .and_then(|digits| digits.parse::<u64>().ok())
        {
            max = max.max(n);
        }
    }
    Ok(format!("{}{}", GENERATED_PREFIX_STEM, max + 1))
}
