//! Triple-to-fact encoding and atomic data loading.
//!
//! Every triple becomes one fact: the subject resolves to an entity via
//! the upserting subject-identifier attribute, the predicate resolves
//! to its installed attribute, and the object becomes either an entity
//! reference (when the attribute is reference-typed) or a literal
//! value. The whole stream commits as a single transaction — partial
//! application of a stream is never observable.

use crate::error::{IngestError, Result};
use crate::names::{encode_iri, ensure_namespace};
use crate::source::{ParseEvent, TripleSource};
use std::collections::HashMap;
use std::sync::Arc;
use tessera_core::{Literal, Term};
use tessera_directory::vocab::SUBJECT_ID;
use tessera_directory::NamespaceTable;
use tessera_store::{
    CommitReceipt, Connection, EntitySpec, Ident, Transaction, Value, ValueSpec, ValueType,
};
use tracing::info;

/// Load a triple stream into the graph's store in one atomic commit.
///
/// The store must already carry the schema for every predicate in the
/// stream (see [`crate::load_schema`]); a predicate with no installed
/// attribute fails the whole load. `namespaces` is the working table
/// (seed it from the system store via
/// [`tessera_directory::namespace_table`]); prefixes are minted through
/// the allocator for any newly-encountered namespace, declared or not.
pub async fn load_data(
    graph: &Arc<dyn Connection>,
    source: &mut dyn TripleSource,
    namespaces: &mut NamespaceTable,
    system: &Arc<dyn Connection>,
) -> Result<CommitReceipt> {
    let snap = graph.snapshot().await?;
    let mut tx = Transaction::new();
    let mut subjects: HashMap<String, String> = HashMap::new();
    let mut triple_count: usize = 0;

    while let Some(event) = source.next_event()? {
        let triple = match event {
            ParseEvent::Prefix { namespace, .. } => {
                ensure_namespace(&namespace, namespaces, system).await?;
                continue;
            }
            ParseEvent::Triple(triple) => triple,
        };
        triple_count += 1;

        let subject_name = encode_iri(&triple.subject, namespaces, system).await?;
        let (tx2, subject_temp) = ensure_subject(tx, &mut subjects, &subject_name);
        tx = tx2;

        let predicate_ident = Ident::new(encode_iri(&triple.predicate, namespaces, system).await?);
        let attr = snap
            .attribute(&predicate_ident)
            .await?
            .ok_or_else(|| IngestError::UnknownPredicate(triple.predicate.clone()))?;

        let value = match (&triple.object, attr.value_type) {
            (Term::Iri(object_iri), ValueType::Ref) => {
                let object_name = encode_iri(object_iri, namespaces, system).await?;
                let (tx2, object_temp) = ensure_subject(tx, &mut subjects, &object_name);
                tx = tx2;
                ValueSpec::TempRef(object_temp)
            }
            (Term::Iri(_), other) => {
                return Err(IngestError::schema_conflict(
                    &triple.predicate,
                    format!("reference object against {:?}-typed attribute", other),
                ));
            }
            (Term::Literal(literal), expected) => {
                ValueSpec::Val(literal_value(literal, expected, &triple.predicate)?)
            }
        };

        tx = tx.assert(EntitySpec::Temp(subject_temp), predicate_ident, value);
    }

    let receipt = graph.transact(tx).await?.committed()?;
    info!(
        url = graph.url(),
        triples = triple_count,
        t = receipt.t,
        "loaded triple stream"
    );
    Ok(receipt)
}

/// Ensure a subject has a tempid, asserting its declared identifier on
/// first sight.
fn ensure_subject(
    mut tx: Transaction,
    subjects: &mut HashMap<String, String>,
    subject_name: &str,
) -> (Transaction, String) {
    if let Some(temp) = subjects.get(subject_name) {
        return (tx, temp.clone());
    }
    let temp = format!("s{}", subjects.len());
    subjects.insert(subject_name.to_string(), temp.clone());
    tx = tx.assert(
        EntitySpec::Temp(temp.clone()),
        SUBJECT_ID,
        ValueSpec::Val(Value::str(subject_name)),
    );
    (tx, temp)
}

/// Map a literal onto the attribute's declared type, widening `Long`
/// into `Double` attributes.
fn literal_value(literal: &Literal, expected: ValueType, predicate: &str) -> Result<Value> {
    match (literal, expected) {
        (Literal::Str(s), ValueType::Str) => Ok(Value::Str(s.clone())),
        (Literal::Long(n), ValueType::Long) => Ok(Value::Long(*n)),
        (Literal::Long(n), ValueType::Double) => Ok(Value::Double(*n as f64)),
        (Literal::Double(d), ValueType::Double) => Ok(Value::Double(*d)),
        (Literal::Bool(b), ValueType::Bool) => Ok(Value::Bool(*b)),
        (literal, expected) => Err(IngestError::schema_conflict(
            predicate,
            format!("literal {} against {:?}-typed attribute", literal, expected),
        )),
    }
}
