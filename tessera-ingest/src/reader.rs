//! Triple reconstruction from stored facts.
//!
//! The reader enumerates facts of RDF-flagged attributes, expands
//! subject and predicate identifiers back to IRIs through the namespace
//! table, and dereferences reference-typed values to the referenced
//! entity's declared identifier instead of exposing internal ids. The
//! result is a finite, materialized sequence with no ordering contract
//! beyond the store's enumeration order.

use crate::error::{IngestError, Result};
use crate::names::decode_name;
use std::sync::Arc;
use tessera_core::{Literal, Term, Triple};
use tessera_directory::vocab::SUBJECT_ID;
use tessera_directory::NamespaceTable;
use tessera_store::{Connection, EntityId, Ident, Snapshot, Value};

/// Read every triple stored in the graph.
///
/// `namespaces` is the table to expand stored prefixed names with —
/// materialize it from the system store via
/// [`tessera_directory::namespace_table`].
pub async fn read_triples(
    graph: &Arc<dyn Connection>,
    namespaces: &NamespaceTable,
) -> Result<Vec<Triple>> {
    let snap = graph.snapshot().await?;
    let subject_id = Ident::new(SUBJECT_ID);

    let mut triples = Vec::new();
    for attr in snap.attributes().await? {
        if !attr.rdf {
            continue;
        }
        let predicate_iri = decode_name(attr.ident.as_str(), namespaces)?;
        for (entity, value) in snap.facts_of(&attr.ident).await? {
            let subject_iri = declared_iri(&snap, entity, &subject_id, namespaces).await?;
            // Closed variant set: exhaustive by construction
            let object = match value {
                Value::Ref(target) => {
                    Term::Iri(declared_iri(&snap, target, &subject_id, namespaces).await?)
                }
                Value::Str(s) => Term::Literal(Literal::Str(s)),
                Value::Long(n) => Term::Literal(Literal::Long(n)),
                Value::Double(d) => Term::Literal(Literal::Double(d)),
                Value::Bool(b) => Term::Literal(Literal::Bool(b)),
            };
            triples.push(Triple::new(subject_iri, predicate_iri.clone(), object));
        }
    }
    Ok(triples)
}

/// Dereference an entity and expand its declared identifier.
async fn declared_iri(
    snap: &Arc<dyn Snapshot>,
    entity: EntityId,
    subject_id: &Ident,
    namespaces: &NamespaceTable,
) -> Result<String> {
    let view = snap
        .entity(entity)
        .await?
        .ok_or_else(|| IngestError::other(format!("entity {} has no facts", entity)))?;
    let name = view
        .get_one(subject_id)
        .and_then(Value::as_str)
        .ok_or_else(|| {
            IngestError::other(format!("entity {} has no declared identifier", entity))
        })?;
    decode_name(name, namespaces)
}
