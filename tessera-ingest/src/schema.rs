//! Attribute schema inference and installation.
//!
//! One attribute is inferred per distinct predicate: the value type
//! from the shape of observed objects, the cardinality from whether any
//! subject exhibits the predicate more than once. `Long` and `Double`
//! observations under one predicate widen to `Double`; any other mix —
//! reference vs. literal in particular — is a schema conflict and
//! fails inference outright rather than silently picking one side.
//!
//! Installation commits the full attribute set in one transaction,
//! before any data commit. Re-inference against an already-schematized
//! store is only accepted when every inferred definition matches the
//! installed one exactly; a fresh store per load is the expected path.

use crate::error::{IngestError, Result};
use crate::names::{encode_iri, ensure_namespace};
use crate::source::{ParseEvent, TripleSource};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tessera_core::{Literal, Term};
use tessera_directory::NamespaceTable;
use tessera_store::{AttributeDef, Cardinality, Connection, Ident, Transaction, ValueType};
use tracing::info;

/// One inferred predicate: shape summary ahead of ident resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferredPredicate {
    /// Predicate IRI
    pub iri: String,
    pub value_type: ValueType,
    pub cardinality: Cardinality,
}

/// Outcome of an inference pass over one triple stream.
#[derive(Debug, Clone, Default)]
pub struct SchemaInference {
    /// Inferred predicates in first-appearance order
    pub predicates: Vec<InferredPredicate>,
    /// Namespace IRIs declared by the stream
    pub declared_namespaces: Vec<String>,
}

/// Infer one attribute per distinct predicate from a triple stream.
///
/// Pure with respect to the store: consumes the stream and nothing
/// else. Fails with `SchemaConflict` when a predicate's observed
/// objects do not share a value type (after `Long ⊔ Double` widening).
pub fn infer_schema(source: &mut dyn TripleSource) -> Result<SchemaInference> {
    let mut order: Vec<String> = Vec::new();
    let mut shapes: HashMap<String, (ValueType, Cardinality)> = HashMap::new();
    let mut seen_pairs: HashSet<(String, String)> = HashSet::new();
    let mut declared: Vec<String> = Vec::new();

    while let Some(event) = source.next_event()? {
        let triple = match event {
            ParseEvent::Prefix { namespace, .. } => {
                if !declared.contains(&namespace) {
                    declared.push(namespace);
                }
                continue;
            }
            ParseEvent::Triple(triple) => triple,
        };

        let observed = match &triple.object {
            Term::Iri(_) => ValueType::Ref,
            Term::Literal(Literal::Str(_)) => ValueType::Str,
            Term::Literal(Literal::Long(_)) => ValueType::Long,
            Term::Literal(Literal::Double(_)) => ValueType::Double,
            Term::Literal(Literal::Bool(_)) => ValueType::Bool,
        };

        let repeated = !seen_pairs.insert((triple.subject.clone(), triple.predicate.clone()));

        match shapes.get_mut(&triple.predicate) {
            None => {
                order.push(triple.predicate.clone());
                shapes.insert(triple.predicate, (observed, Cardinality::One));
            }
            Some((value_type, cardinality)) => {
                match merge_types(*value_type, observed) {
                    Some(merged) => *value_type = merged,
                    None => {
                        return Err(IngestError::schema_conflict(
                            &triple.predicate,
                            format!(
                                "observed both {:?} and {:?} objects",
                                *value_type, observed
                            ),
                        ));
                    }
                }
                if repeated {
                    *cardinality = Cardinality::Many;
                }
            }
        }
    }

    let predicates = order
        .into_iter()
        .map(|iri| {
            let (value_type, cardinality) = shapes[&iri];
            InferredPredicate {
                iri,
                value_type,
                cardinality,
            }
        })
        .collect();

    Ok(SchemaInference {
        predicates,
        declared_namespaces: declared,
    })
}

/// Combine two observed value types, or report incompatibility.
fn merge_types(a: ValueType, b: ValueType) -> Option<ValueType> {
    use ValueType::*;
    match (a, b) {
        _ if a == b => Some(a),
        (Long, Double) | (Double, Long) => Some(Double),
        _ => None,
    }
}

/// Infer the schema from a stream and install it into the graph's
/// store in one transaction.
///
/// `namespaces` is the working table (seed it from the system store via
/// [`tessera_directory::namespace_table`]); prefixes are resolved or
/// minted for every declared namespace and every predicate namespace.
/// Returns the attribute definitions now in force for the stream's
/// predicates.
pub async fn load_schema(
    graph: &Arc<dyn Connection>,
    source: &mut dyn TripleSource,
    namespaces: &mut NamespaceTable,
    system: &Arc<dyn Connection>,
) -> Result<Vec<AttributeDef>> {
    let inference = infer_schema(source)?;
    for namespace in &inference.declared_namespaces {
        ensure_namespace(namespace, namespaces, system).await?;
    }

    let snap = graph.snapshot().await?;
    let mut tx = Transaction::new();
    let mut defs = Vec::with_capacity(inference.predicates.len());
    for predicate in &inference.predicates {
        let ident = Ident::new(encode_iri(&predicate.iri, namespaces, system).await?);
        let def = AttributeDef::new(ident, predicate.value_type, predicate.cardinality).rdf();
        match snap.attribute(&def.ident).await? {
            Some(existing) if existing != def => {
                return Err(IngestError::schema_conflict(
                    &predicate.iri,
                    format!(
                        "inferred {:?}/{:?} but store has {:?}/{:?}",
                        def.value_type, def.cardinality, existing.value_type, existing.cardinality
                    ),
                ));
            }
            Some(_) => defs.push(def),
            None => {
                tx = tx.install(def.clone());
                defs.push(def);
            }
        }
    }

    if !tx.is_empty() {
        graph.transact(tx).await?.committed()?;
        info!(
            url = graph.url(),
            attributes = defs.len(),
            "installed inferred schema"
        );
    }
    Ok(defs)
}
