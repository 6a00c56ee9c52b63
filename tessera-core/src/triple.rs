//! Transient triple model.
//!
//! A `Triple` is the unit the parser boundary delivers and the reader
//! reconstructs. It is never persisted directly; the stores hold
//! attribute facts and the ingestion pipeline owns the translation.
//!
//! The literal variants are a closed set with exhaustive matching at the
//! ingestion and reader boundaries — there is no open-ended datatype
//! dispatch.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An RDF literal value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    /// String literal
    Str(String),
    /// Integer literal
    Long(i64),
    /// Decimal/floating literal
    Double(f64),
    /// Boolean literal
    Bool(bool),
}

impl Literal {
    /// String literal constructor
    pub fn str(s: impl Into<String>) -> Self {
        Literal::Str(s.into())
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Str(s) => write!(f, "\"{}\"", s),
            Literal::Long(n) => write!(f, "{}", n),
            Literal::Double(d) => write!(f, "{}", d),
            Literal::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::Str(s.to_string())
    }
}

impl From<i64> for Literal {
    fn from(n: i64) -> Self {
        Literal::Long(n)
    }
}

impl From<f64> for Literal {
    fn from(d: f64) -> Self {
        Literal::Double(d)
    }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Literal::Bool(b)
    }
}

/// Object position of a triple: a node reference or a literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Term {
    /// Node reference by IRI
    Iri(String),
    /// Literal value
    Literal(Literal),
}

impl Term {
    /// Node-reference constructor
    pub fn iri(iri: impl Into<String>) -> Self {
        Term::Iri(iri.into())
    }

    /// Literal constructor
    pub fn literal(lit: impl Into<Literal>) -> Self {
        Term::Literal(lit.into())
    }

    /// True if this term is a node reference
    pub fn is_iri(&self) -> bool {
        matches!(self, Term::Iri(_))
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{}>", iri),
            Term::Literal(lit) => write!(f, "{}", lit),
        }
    }
}

/// An RDF statement.
///
/// Subject and predicate are IRIs; the object is either a node
/// reference or a literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: Term,
}

impl Triple {
    /// Create a triple
    pub fn new(subject: impl Into<String>, predicate: impl Into<String>, object: Term) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object,
        }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{}> <{}> {} .",
            self.subject, self.predicate, self.object
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_constructors() {
        assert!(Term::iri("http://example.org/a").is_iri());
        assert!(!Term::literal("hello").is_iri());
        assert_eq!(Term::literal(42i64), Term::Literal(Literal::Long(42)));
        assert_eq!(Term::literal(true), Term::Literal(Literal::Bool(true)));
    }

    #[test]
    fn test_triple_display() {
        let t = Triple::new(
            "http://example.org/a",
            "http://example.org/p",
            Term::literal("lit"),
        );
        assert_eq!(
            t.to_string(),
            "<http://example.org/a> <http://example.org/p> \"lit\" ."
        );
    }

    #[test]
    fn test_literal_equality() {
        assert_eq!(Literal::from(1.5), Literal::Double(1.5));
        assert_ne!(Literal::Long(1), Literal::Double(1.0));
    }
}
