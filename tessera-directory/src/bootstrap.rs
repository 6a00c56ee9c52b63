//! Bootstrap surface: opening a system handle.
//!
//! `System::open` assembles the pieces in the order first-time
//! initialization requires: create/connect the system store, install
//! the directory schema, establish the default graph, then record the
//! system graph and its single default relationship. Reopening against
//! an initialized system store is idempotent and re-uses the recorded
//! state.

use crate::config::{DirectoryConfig, SystemDefaults};
use crate::directory::GraphDirectory;
use crate::error::Result;
use crate::rewrite::rewrite_store_url;
use crate::vocab::{
    system_schema, DEFAULT_GRAPH_IRI, GRAPH_DEFAULT, GRAPH_NAME, GRAPH_URL, SYSTEM_GRAPH_IRI,
};
use std::sync::Arc;
use tessera_store::{Connection, EntitySpec, Ident, StoreBackend, Transaction, Value, ValueSpec};
use tracing::info;

/// Name of the default graph's derived store when no URL is supplied
const DEFAULT_DB_NAME: &str = "default";

/// Open handle bundling the backend, the system store connection, and
/// the default-graph connection.
#[derive(Debug, Clone)]
pub struct System {
    backend: Arc<dyn StoreBackend>,
    system: Arc<dyn Connection>,
    default_graph: Arc<dyn Connection>,
}

impl System {
    /// Open (initializing on first use) the system at `system_url`.
    ///
    /// With no `default_url`, the default graph's store is derived as
    /// the system URL's sibling named `default`.
    pub async fn open(
        backend: Arc<dyn StoreBackend>,
        system_url: &str,
        default_url: Option<&str>,
    ) -> Result<Self> {
        let created = backend.create_store(system_url).await?;
        let system = backend.connect(system_url).await?;

        // Identical re-installs are no-ops, so this is safe on reopen.
        let mut schema = Transaction::new();
        for def in system_schema() {
            schema = schema.install(def);
        }
        system.transact(schema).await?.committed()?;
        if created {
            info!(system_url, "initialized system store");
        }

        let directory = GraphDirectory::new(backend.clone(), system.clone());
        let fallback = match default_url {
            Some(url) => url.to_string(),
            None => rewrite_store_url(system_url, DEFAULT_DB_NAME)?,
        };
        let default_graph_url = directory.default_graph_url(&fallback).await?;
        let default_graph = backend.connect(&default_graph_url).await?;

        ensure_system_record(&system, system_url, &default_graph_url).await?;

        Ok(Self {
            backend,
            system,
            default_graph,
        })
    }

    /// Convenience form: build the system URL from
    /// method/host/port/system-name defaults.
    pub async fn open_with_defaults(
        backend: Arc<dyn StoreBackend>,
        defaults: &SystemDefaults,
    ) -> Result<Self> {
        Self::open(backend, &defaults.system_url(), None).await
    }

    /// Open from a parsed configuration document.
    pub async fn open_from_config(
        backend: Arc<dyn StoreBackend>,
        config: &DirectoryConfig,
    ) -> Result<Self> {
        Self::open(
            backend,
            &config.effective_system_url(),
            config.default_url.as_deref(),
        )
        .await
    }

    /// The backend this system was opened against
    pub fn backend(&self) -> &Arc<dyn StoreBackend> {
        &self.backend
    }

    /// The system store connection
    pub fn system(&self) -> &Arc<dyn Connection> {
        &self.system
    }

    /// The default graph's connection
    pub fn default_graph(&self) -> &Arc<dyn Connection> {
        &self.default_graph
    }

    /// A directory over this system
    pub fn directory(&self) -> GraphDirectory {
        GraphDirectory::new(self.backend.clone(), self.system.clone())
    }
}

/// Record the system graph and its default relationship, once.
///
/// The system graph record upserts on `graph/name`, and the default
/// relationship is cardinality-one, so the invariant "exactly one
/// default recorded on the system graph" holds across reopens.
async fn ensure_system_record(
    system: &Arc<dyn Connection>,
    system_url: &str,
    default_graph_url: &str,
) -> Result<()> {
    let snap = system.snapshot().await?;
    let existing = snap
        .entities_with(&Ident::new(GRAPH_NAME), &Value::str(SYSTEM_GRAPH_IRI))
        .await?;
    if let Some(&entity) = existing.first() {
        let view = snap.entity(entity).await?;
        let has_default = view
            .as_ref()
            .and_then(|v| v.get_one(&Ident::new(GRAPH_DEFAULT)))
            .is_some();
        if has_default {
            return Ok(());
        }
    }

    let tx = Transaction::new()
        .assert(
            EntitySpec::Temp("system".into()),
            GRAPH_NAME,
            ValueSpec::Val(Value::str(SYSTEM_GRAPH_IRI)),
        )
        .assert(
            EntitySpec::Temp("system".into()),
            GRAPH_URL,
            ValueSpec::Val(Value::str(system_url)),
        )
        .assert(
            EntitySpec::Temp("default".into()),
            GRAPH_NAME,
            ValueSpec::Val(Value::str(DEFAULT_GRAPH_IRI)),
        )
        .assert(
            EntitySpec::Temp("default".into()),
            GRAPH_URL,
            ValueSpec::Val(Value::str(default_graph_url)),
        )
        .assert(
            EntitySpec::Temp("system".into()),
            GRAPH_DEFAULT,
            ValueSpec::TempRef("default".into()),
        );
    system.transact(tx).await?.committed()?;
    info!(system_url, default_graph_url, "recorded system graph");
    Ok(())
}
