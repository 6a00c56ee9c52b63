//! # Tessera Ingest
//!
//! Schema inference, triple ingestion, and triple reading for Tessera
//! graph stores.
//!
//! Loading is two-pass by design: [`load_schema`] infers one attribute
//! per distinct predicate from a stream and installs the set in a
//! single transaction, then [`load_data`] encodes a stream of the same
//! shape as backend facts and commits them atomically. [`read_triples`]
//! reconstructs triples from the stored facts, expanding reference
//! values into the referenced subject's identifier.
//!
//! The serialization parser lives outside this crate; it owes the
//! pipeline a [`TripleSource`] — a lazy, single-pass event stream of
//! triples and namespace declarations.

pub mod error;
pub mod load;
pub mod names;
pub mod reader;
pub mod schema;
pub mod source;

pub use error::{IngestError, Result};
pub use load::load_data;
pub use names::{decode_name, encode_iri, ensure_namespace};
pub use reader::read_triples;
pub use schema::{infer_schema, load_schema, InferredPredicate, SchemaInference};
pub use source::{ParseEvent, TripleSource, VecSource};
