//! IRI ⇄ prefixed-name translation against the namespace table.
//!
//! Encoding splits an IRI on its namespace boundary and joins the
//! system-global prefix with the local name; namespaces without an
//! entry mint one through the allocator and extend the working table in
//! place. Decoding is the pure inverse and never touches the store.

use crate::error::Result;
use std::sync::Arc;
use tessera_core::{expand_prefixed, join_prefixed, split_iri, Error as CoreError};
use tessera_directory::{resolve_or_mint_prefix, NamespaceTable};
use tessera_store::Connection;

/// Ensure the namespace has a system-global prefix, extending the table.
pub async fn ensure_namespace(
    namespace: &str,
    table: &mut NamespaceTable,
    system: &Arc<dyn Connection>,
) -> Result<String> {
    if let Some(prefix) = table.prefix_for(namespace) {
        return Ok(prefix.to_string());
    }
    let prefix = resolve_or_mint_prefix(system, namespace).await?;
    table.insert(prefix.clone(), namespace);
    Ok(prefix)
}

/// Encode an IRI as a prefixed name, minting a prefix for a
/// newly-encountered namespace.
pub async fn encode_iri(
    iri: &str,
    table: &mut NamespaceTable,
    system: &Arc<dyn Connection>,
) -> Result<String> {
    let (namespace, local) = split_iri(iri);
    if namespace.is_empty() {
        return Err(CoreError::invalid_iri(format!("{} has no namespace component", iri)).into());
    }
    let prefix = ensure_namespace(namespace, table, system).await?;
    Ok(join_prefixed(&prefix, local))
}

/// Expand a stored prefixed name back to its IRI.
pub fn decode_name(name: &str, table: &NamespaceTable) -> Result<String> {
    Ok(expand_prefixed(name, |prefix| table.iri_for(prefix))?)
}
