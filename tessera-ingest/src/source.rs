//! Triple source boundary.
//!
//! A serialization parser sits outside this crate; what it owes the
//! pipeline is a lazy, finite, single-pass sequence of triples
//! interleaved with namespace-prefix declarations. Parsers resolve
//! their document-local prefix syntax themselves — triples arrive with
//! fully expanded IRIs.

use crate::error::Result;
use std::collections::VecDeque;
use tessera_core::Triple;

/// One event from a triple source.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseEvent {
    /// A namespace-prefix declaration (`prefix` → `namespace` IRI)
    Prefix { prefix: String, namespace: String },
    /// A parsed triple
    Triple(Triple),
}

/// A pull-based, single-pass stream of parse events.
///
/// Sources are finite; `next_event` returns `None` once exhausted and
/// is not required to be restartable.
pub trait TripleSource: Send {
    /// Pull the next event, or `None` at end of stream
    fn next_event(&mut self) -> Result<Option<ParseEvent>>;
}

/// In-memory source over a pre-built event sequence.
///
/// The standard source for tests and for callers that already hold
/// parsed triples.
#[derive(Debug, Clone, Default)]
pub struct VecSource {
    events: VecDeque<ParseEvent>,
}

impl VecSource {
    /// Create a source over explicit events
    pub fn new(events: impl IntoIterator<Item = ParseEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }

    /// Create a source over triples with no prefix declarations
    pub fn triples(triples: impl IntoIterator<Item = Triple>) -> Self {
        Self::new(triples.into_iter().map(ParseEvent::Triple))
    }
}

impl TripleSource for VecSource {
    fn next_event(&mut self) -> Result<Option<ParseEvent>> {
        Ok(self.events.pop_front())
    }
}
