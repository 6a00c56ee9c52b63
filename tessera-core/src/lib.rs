//! # Tessera Core
//!
//! Shared data model for the Tessera graph directory and ingestion
//! pipeline.
//!
//! This crate provides:
//! - The transient triple model: `Triple`, `Term`, `Literal`
//! - IRI utilities: namespace/local splitting, bare-prefix detection,
//!   prefixed-name (CURIE) join/split
//! - The core error type
//!
//! Triples are never persisted as such — the stores hold attribute facts
//! (see `tessera-store`) and the ingestion pipeline translates between
//! the two representations.

pub mod error;
pub mod iri;
pub mod triple;

pub use error::{Error, Result};
pub use iri::{bare_prefix, expand_prefixed, join_prefixed, split_iri, split_prefixed};
pub use triple::{Literal, Term, Triple};
