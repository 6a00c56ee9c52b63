//! End-to-end ingestion tests: schema inference, atomic loading, and
//! triple reconstruction against the in-memory backend.

use std::sync::Arc;
use tessera_core::{Term, Triple};
use tessera_directory::{namespace_table, System};
use tessera_ingest::{
    load_data, load_schema, read_triples, IngestError, ParseEvent, VecSource,
};
use tessera_store::{Connection, MemoryBackend, StoreBackend};

const PEOPLE_NS: &str = "http://example.org/people#";
const GRAPH_IRI: &str = "http://example.org/graphs#people";

fn people(local: &str) -> String {
    format!("{}{}", PEOPLE_NS, local)
}

fn people_triples() -> Vec<Triple> {
    vec![
        Triple::new(people("alice"), people("name"), Term::literal("Alice")),
        Triple::new(people("alice"), people("age"), Term::literal(30i64)),
        Triple::new(people("alice"), people("knows"), Term::iri(people("bob"))),
        Triple::new(people("alice"), people("knows"), Term::iri(people("carol"))),
        Triple::new(people("bob"), people("name"), Term::literal("Bob")),
    ]
}

fn people_source() -> VecSource {
    let mut events = vec![ParseEvent::Prefix {
        prefix: "ppl".into(),
        namespace: PEOPLE_NS.into(),
    }];
    events.extend(people_triples().into_iter().map(ParseEvent::Triple));
    VecSource::new(events)
}

async fn open_graph() -> (System, Arc<dyn Connection>) {
    let backend: Arc<dyn StoreBackend> = Arc::new(MemoryBackend::new());
    let system = System::open(backend, "tessera:mem://system", None)
        .await
        .unwrap();
    let graph = system.directory().get_or_create(GRAPH_IRI).await.unwrap();
    (system, graph)
}

#[tokio::test]
async fn test_round_trip_fidelity() {
    let (system, graph) = open_graph().await;
    let sys = system.system();

    let mut table = namespace_table(sys).await.unwrap();
    load_schema(&graph, &mut people_source(), &mut table, sys)
        .await
        .unwrap();
    load_data(&graph, &mut people_source(), &mut table, sys)
        .await
        .unwrap();

    let table = namespace_table(sys).await.unwrap();
    let read = read_triples(&graph, &table).await.unwrap();

    let expected = people_triples();
    assert_eq!(read.len(), expected.len());
    for triple in &expected {
        assert!(read.contains(triple), "missing {}", triple);
    }
}

#[tokio::test]
async fn test_reload_is_idempotent() {
    let (system, graph) = open_graph().await;
    let sys = system.system();

    let mut table = namespace_table(sys).await.unwrap();
    load_schema(&graph, &mut people_source(), &mut table, sys)
        .await
        .unwrap();
    load_data(&graph, &mut people_source(), &mut table, sys)
        .await
        .unwrap();
    // Same stream again: identity upsert folds every subject onto its
    // existing entity and no duplicate facts appear.
    load_data(&graph, &mut people_source(), &mut table, sys)
        .await
        .unwrap();

    let table = namespace_table(sys).await.unwrap();
    let read = read_triples(&graph, &table).await.unwrap();
    assert_eq!(read.len(), people_triples().len());
}

#[tokio::test]
async fn test_failed_stream_loads_nothing() {
    let (system, graph) = open_graph().await;
    let sys = system.system();

    let mut table = namespace_table(sys).await.unwrap();
    load_schema(&graph, &mut people_source(), &mut table, sys)
        .await
        .unwrap();

    // A stream whose final triple names a predicate with no installed
    // attribute: the load fails and nothing from the stream is visible.
    let mut events: Vec<ParseEvent> =
        people_triples().into_iter().map(ParseEvent::Triple).collect();
    events.push(ParseEvent::Triple(Triple::new(
        people("alice"),
        people("unschematized"),
        Term::literal("boom"),
    )));
    let err = load_data(
        &graph,
        &mut VecSource::new(events),
        &mut table.clone(),
        sys,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, IngestError::UnknownPredicate(_)));

    let read = read_triples(&graph, &namespace_table(sys).await.unwrap())
        .await
        .unwrap();
    assert!(read.is_empty(), "partial stream must not be observable");
}

#[tokio::test]
async fn test_schema_reinference_conflict_surfaces() {
    let (system, graph) = open_graph().await;
    let sys = system.system();

    let mut table = namespace_table(sys).await.unwrap();
    load_schema(&graph, &mut people_source(), &mut table, sys)
        .await
        .unwrap();

    // A second stream observes ppl:name as a reference target, which
    // contradicts the installed string attribute.
    let mut conflicting = VecSource::triples([Triple::new(
        people("alice"),
        people("name"),
        Term::iri(people("bob")),
    )]);
    let err = load_schema(&graph, &mut conflicting, &mut table, sys)
        .await
        .unwrap_err();
    assert!(matches!(err, IngestError::SchemaConflict { .. }));
}

#[tokio::test]
async fn test_load_mints_prefixes_for_new_namespaces() {
    let (system, graph) = open_graph().await;
    let sys = system.system();

    let mut table = namespace_table(sys).await.unwrap();
    load_schema(&graph, &mut people_source(), &mut table, sys)
        .await
        .unwrap();
    load_data(&graph, &mut people_source(), &mut table, sys)
        .await
        .unwrap();

    // Graph creation minted ns1 for the graph namespace; the people
    // namespace was minted during ingestion and recorded system-wide.
    let fresh = namespace_table(sys).await.unwrap();
    assert_eq!(fresh.prefix_for("http://example.org/graphs#"), Some("ns1"));
    assert_eq!(fresh.prefix_for(PEOPLE_NS), Some("ns2"));
}

#[tokio::test]
async fn test_reference_expansion_reaches_bare_objects() {
    let (system, graph) = open_graph().await;
    let sys = system.system();

    // carol never appears as a subject; the reader must still expand
    // the reference to her declared identifier.
    let mut table = namespace_table(sys).await.unwrap();
    let source = || {
        VecSource::triples([Triple::new(
            people("alice"),
            people("knows"),
            Term::iri(people("carol")),
        )])
    };
    load_schema(&graph, &mut source(), &mut table, sys).await.unwrap();
    load_data(&graph, &mut source(), &mut table, sys).await.unwrap();

    let read = read_triples(&graph, &namespace_table(sys).await.unwrap())
        .await
        .unwrap();
    assert_eq!(read.len(), 1);
    assert_eq!(read[0].object, Term::iri(people("carol")));
}
