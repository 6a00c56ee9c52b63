//! Directory vocabulary: well-known attribute idents and graph IRIs.
//!
//! The system store's own schema lives here so the allocator, the
//! directory, and the bootstrap path all transact against the same
//! attribute identifiers.

use tessera_store::{AttributeDef, Cardinality, ValueType};

/// Graph record: the graph's IRI (unique, upserting)
pub const GRAPH_NAME: &str = "graph/name";
/// Graph record: the backing store's URL (unique)
pub const GRAPH_URL: &str = "graph/url";
/// System graph record: reference to the default graph record
pub const GRAPH_DEFAULT: &str = "graph/default";

/// Namespace entry: short prefix token (unique)
pub const NS_PREFIX: &str = "ns/prefix";
/// Namespace entry: namespace IRI (unique)
pub const NS_IRI: &str = "ns/iri";

/// Subject-identifier attribute installed in every graph store; holds
/// the subject's prefixed name and upserts on re-assertion
pub const SUBJECT_ID: &str = "rdf/id";

/// IRI of the system graph's own record in the directory
pub const SYSTEM_GRAPH_IRI: &str = "urn:tessera:system";
/// IRI recorded for the default graph when none is named by the caller
pub const DEFAULT_GRAPH_IRI: &str = "urn:tessera:default";

/// Stem of generated namespace prefixes (`ns1`, `ns2`, ...)
pub const GENERATED_PREFIX_STEM: &str = "ns";

/// Attribute definitions installed into the system store at bootstrap.
pub fn system_schema() -> Vec<AttributeDef> {
    vec![
        AttributeDef::new(GRAPH_NAME, ValueType::Str, Cardinality::One).unique_identity(),
        AttributeDef::new(GRAPH_URL, ValueType::Str, Cardinality::One).unique_value(),
        AttributeDef::new(GRAPH_DEFAULT, ValueType::Ref, Cardinality::One),
        AttributeDef::new(NS_PREFIX, ValueType::Str, Cardinality::One).unique_value(),
        AttributeDef::new(NS_IRI, ValueType::Str, Cardinality::One).unique_value(),
    ]
}

/// Baseline attribute definitions installed into every newly created
/// graph store, ahead of any inferred data schema.
pub fn graph_base_schema() -> Vec<AttributeDef> {
    vec![AttributeDef::new(SUBJECT_ID, ValueType::Str, Cardinality::One).unique_identity()]
}
