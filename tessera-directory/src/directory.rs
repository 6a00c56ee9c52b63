//! Graph directory: IRI → storage-URL mapping over the system store.
//!
//! Graph records are facts in the system store (`graph/name`,
//! `graph/url`, and the `graph/default` reference on the system graph's
//! own record). The directory never caches records beyond a single
//! lookup; every operation reads a fresh snapshot.

use crate::error::{DirectoryError, Result};
use crate::prefix::resolve_or_mint_prefix;
use crate::rewrite::rewrite_store_url;
use crate::vocab::{graph_base_schema, GRAPH_DEFAULT, GRAPH_NAME, GRAPH_URL, SYSTEM_GRAPH_IRI};
use std::sync::Arc;
use tessera_core::split_iri;
use tessera_store::{
    Connection, EntitySpec, Ident, Snapshot, StoreBackend, Transaction, Value, ValueSpec,
};
use tracing::{info, warn};

/// Directory of named graphs recorded in the system store.
#[derive(Debug, Clone)]
pub struct GraphDirectory {
    backend: Arc<dyn StoreBackend>,
    system: Arc<dyn Connection>,
}

impl GraphDirectory {
    /// Create a directory over a backend and an open system connection
    pub fn new(backend: Arc<dyn StoreBackend>, system: Arc<dyn Connection>) -> Self {
        Self { backend, system }
    }

    /// The system store connection
    pub fn system(&self) -> &Arc<dyn Connection> {
        &self.system
    }

    /// Point query: storage URL recorded for a graph IRI, if any.
    pub async fn lookup(&self, graph_iri: &str) -> Result<Option<String>> {
        let snap = self.system.snapshot().await?;
        recorded_url(&snap, graph_iri).await
    }

    /// Connect to the graph's store, creating and recording it first if
    /// the directory has no entry.
    ///
    /// The creation path splits the IRI into namespace and local parts,
    /// resolves the namespace prefix, derives `db_name = prefix-local`,
    /// and rewrites the system store's own URL to the sibling location.
    ///
    /// There is a race window between the lookup miss and the record
    /// commit: two concurrent callers for the same IRI may both create.
    /// This is an accepted limitation — both derive the identical URL
    /// (store creation is near-idempotent) and the loser's record
    /// commit upserts onto the winner's record, so the directory stays
    /// consistent. It is deliberately not protected by the conditional
    /// commit discipline used for prefixes.
    pub async fn get_or_create(&self, graph_iri: &str) -> Result<Arc<dyn Connection>> {
        if let Some(url) = self.lookup(graph_iri).await? {
            return Ok(self.backend.connect(&url).await?);
        }

        let (namespace, local) = split_iri(graph_iri);
        if namespace.is_empty() || local.is_empty() {
            return Err(DirectoryError::invalid_graph_iri(graph_iri));
        }
        let prefix = resolve_or_mint_prefix(&self.system, namespace).await?;
        let db_name = format!("{}-{}", prefix, local);
        let url = rewrite_store_url(self.system.url(), &db_name)?;

        let created = self.backend.create_store(&url).await?;
        let conn = self.backend.connect(&url).await?;
        if created {
            let mut tx = Transaction::new();
            for def in graph_base_schema() {
                tx = tx.install(def);
            }
            conn.transact(tx).await?.committed()?;
        }

        let record = Transaction::new()
            .assert(
                EntitySpec::Temp("graph".into()),
                GRAPH_NAME,
                ValueSpec::Val(Value::str(graph_iri)),
            )
            .assert(
                EntitySpec::Temp("graph".into()),
                GRAPH_URL,
                ValueSpec::Val(Value::str(url.clone())),
            );
        self.system.transact(record).await?.committed()?;
        info!(graph_iri, url = %url, "created graph store");

        Ok(conn)
    }

    /// Storage URL of the default graph.
    ///
    /// Returns the recorded default when the system store has one
    /// established. Otherwise creates a store at `fallback_url` and
    /// returns that URL without recording it — recording is the
    /// caller's responsibility during first-time initialization.
    pub async fn default_graph_url(&self, fallback_url: &str) -> Result<String> {
        if let Some(url) = self.recorded_default().await? {
            return Ok(url);
        }
        self.backend.create_store(fallback_url).await?;
        Ok(fallback_url.to_string())
    }

    /// Connect to a graph by IRI; `None` (or an empty IRI) selects the
    /// default graph.
    ///
    /// Returns `Ok(None)` when the directory has no entry. A recorded
    /// graph whose store cannot be connected to fails with
    /// `InconsistentDirectory` — the system store references a store
    /// that no longer exists.
    pub async fn find(&self, graph_iri: Option<&str>) -> Result<Option<Arc<dyn Connection>>> {
        let url = match graph_iri {
            None | Some("") => self.recorded_default().await?,
            Some(iri) => self.lookup(iri).await?,
        };
        let Some(url) = url else {
            return Ok(None);
        };
        match self.backend.connect(&url).await {
            Ok(conn) => Ok(Some(conn)),
            Err(err) => {
                warn!(url = %url, %err, "directory references unreachable store");
                Err(DirectoryError::inconsistent(format!(
                    "recorded store {} cannot be connected: {}",
                    url, err
                )))
            }
        }
    }

    /// The default-graph URL recorded on the system graph's record.
    async fn recorded_default(&self) -> Result<Option<String>> {
        let snap = self.system.snapshot().await?;
        let entities = snap
            .entities_with(&Ident::new(GRAPH_NAME), &Value::str(SYSTEM_GRAPH_IRI))
            .await?;
        let Some(&system_entity) = entities.first() else {
            return Ok(None);
        };
        let Some(view) = snap.entity(system_entity).await? else {
            return Ok(None);
        };
        let Some(default_ref) = view
            .get_one(&Ident::new(GRAPH_DEFAULT))
            .and_then(Value::as_ref_id)
        else {
            return Ok(None);
        };
        let default_view = snap.entity(default_ref).await?.ok_or_else(|| {
            DirectoryError::inconsistent("default graph reference points at no entity")
        })?;
        let url = default_view
            .get_one(&Ident::new(GRAPH_URL))
            .and_then(Value::as_str)
            .ok_or_else(|| {
                DirectoryError::inconsistent("default graph record has no storage URL")
            })?;
        Ok(Some(url.to_string()))
    }
}

/// Read the storage URL off a graph record in one snapshot.
async fn recorded_url(snap: &Arc<dyn Snapshot>, graph_iri: &str) -> Result<Option<String>> {
    let entities = snap
        .entities_with(&Ident::new(GRAPH_NAME), &Value::str(graph_iri))
        .await?;
    let Some(&entity) = entities.first() else {
        return Ok(None);
    };
    let view = snap.entity(entity).await?.ok_or_else(|| {
        DirectoryError::inconsistent(format!("graph record {} has no facts", entity))
    })?;
    let url = view
        .get_one(&Ident::new(GRAPH_URL))
        .and_then(Value::as_str)
        .ok_or_else(|| {
            DirectoryError::inconsistent(format!("graph record for {} has no URL", graph_iri))
        })?;
    Ok(Some(url.to_string()))
}
