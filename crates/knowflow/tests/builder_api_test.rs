//! Integration tests for the DiagramBuilder API

use std::collections::BTreeSet;

use proptest::prelude::*;
use serde_json::json;

use knowflow::{
    DiagramBuilder, KnowflowError,
    config::{AppConfig, DataConfig},
    identifier::NodeId,
    loader::{LoadSource, SaveOutcome},
    semantic::{Diagram, NodeCategory},
    session::Session,
    store::MemoryStore,
};

const README_FLOW: &str = r#"{
    "@context": {"id": "@id", "type": "@type"},
    "@graph": [
        {"id": "sys:kg_001", "subject": "Markdown", "predicate": "transforms_to", "object": "CSV (A0 schema)"},
        {"id": "sys:kg_002", "subject": "CSV (A0 schema)", "predicate": "transforms_to", "object": "JSON-LD"},
        {"id": "sys:kg_003", "subject": "JSON-LD", "predicate": "loads_into", "object": "RDF (rdflib)"},
        {"id": "sys:kg_004", "subject": "RDF (rdflib)", "predicate": "feeds_to", "object": "Curriculum Engine"},
        {"id": "sys:kg_005", "subject": "Curriculum Engine", "predicate": "generates", "object": "Cytoscape graph view"}
    ]
}"#;

fn triples(diagram: &Diagram) -> BTreeSet<(String, String, String)> {
    diagram
        .edges()
        .iter()
        .map(|edge| {
            let label = |id: &NodeId| diagram.node(id).unwrap().label().to_string();
            (
                label(edge.source()),
                edge.label().unwrap_or_default().to_string(),
                label(edge.target()),
            )
        })
        .collect()
}

#[test]
fn test_builder_api_exists() {
    let _builder = DiagramBuilder::default();
}

#[test]
fn test_parse_readme_flow() {
    let builder = DiagramBuilder::default();
    let parsed = builder.parse(README_FLOW).expect("Failed to parse");

    assert!(parsed.warnings().is_empty());
    let diagram = parsed.value();
    assert_eq!(diagram.nodes().len(), 6);
    assert_eq!(diagram.edges().len(), 5);
    assert_eq!(diagram.nodes()[0].category(), NodeCategory::Input);
    assert_eq!(diagram.nodes()[5].category(), NodeCategory::Output);

    let ys: Vec<f32> = diagram
        .nodes()
        .iter()
        .map(|node| node.position().y())
        .collect();
    assert_eq!(ys, vec![50.0, 170.0, 290.0, 410.0, 530.0, 650.0]);
}

#[test]
fn test_render_svg() {
    let builder = DiagramBuilder::default();
    let diagram = builder.parse(README_FLOW).unwrap().into_value();
    let svg = builder.render_svg(&diagram).expect("Failed to render");

    assert!(svg.contains("<svg"));
    assert!(svg.contains("Curriculum Engine"));
    assert!(svg.contains("</svg>"));
}

#[test]
fn test_invalid_json_returns_error() {
    let builder = DiagramBuilder::default();
    let result = builder.parse("{ not json");

    assert!(matches!(result, Err(KnowflowError::Parse { .. })));
}

#[test]
fn test_serialize_round_trip_keeps_triples() {
    let builder = DiagramBuilder::default();
    let diagram = builder.parse(README_FLOW).unwrap().into_value();

    let text = builder.render_jsonld(&diagram).unwrap();
    let reparsed = builder.parse(&text).unwrap().into_value();

    assert_eq!(triples(&reparsed), triples(&diagram));
    assert_eq!(reparsed.nodes().len(), diagram.nodes().len());
}

#[test]
fn test_partial_records_add_nodes_without_edges() {
    let source = r#"{
        "@graph": [
            {"subject": "Markdown", "predicate": "transforms_to"},
            {"subject": "CSV", "object": "JSON-LD"},
            {"subject": "JSON-LD", "predicate": "loads_into", "object": "RDF"}
        ]
    }"#;
    let builder = DiagramBuilder::default();
    let parsed = builder.parse(source).unwrap();

    assert!(parsed.warnings().is_empty());
    let diagram = parsed.value();
    assert_eq!(diagram.nodes().len(), 4);
    assert_eq!(diagram.edges().len(), 1);
    assert!(diagram.node(&NodeId::new("markdown")).is_some());
}

#[test]
fn test_csv_to_diagram() {
    let csv = "graph_id,domain,category,entity_type,subject,predicate,object\n\
               sys:kg_001,Technology,Flow,Process,Markdown,transforms_to,CSV\n\
               sys:kg_002,Technology,Flow,Process,CSV,transforms_to,JSON-LD\n";
    let builder = DiagramBuilder::default();

    let document = builder.convert_csv(csv).unwrap().into_value();
    let diagram = builder
        .parse(&document.to_json_string())
        .unwrap()
        .into_value();

    assert_eq!(diagram.nodes().len(), 3);
    assert_eq!(diagram.edges()[1].id().as_str(), "edge-1");
}

#[test]
fn test_markdown_to_diagram() {
    let markdown = "# Overview\n\n## Example Flow\n\n```\nMarkdown → CSV → JSON-LD\n```\n";
    let builder = DiagramBuilder::default();

    let document = builder.extract_markdown(markdown, "README.md").into_value();
    assert_eq!(
        document.graph()[0].field("source_location"),
        Some(&json!("README.md#Example Flow"))
    );

    let diagram = builder
        .parse(&document.to_json_string())
        .unwrap()
        .into_value();
    assert_eq!(diagram.nodes().len(), 3);
    assert_eq!(diagram.edges().len(), 2);
}

#[test]
fn test_save_writes_document() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig::new(
        Default::default(),
        Default::default(),
        DataConfig::default().with_output_root(dir.path()),
    );
    let builder = DiagramBuilder::new(config);
    let diagram = builder.parse(README_FLOW).unwrap().into_value();

    let outcome = builder.save(&diagram).unwrap();
    assert!(matches!(outcome, SaveOutcome::Written(_)));

    let saved = std::fs::read_to_string(outcome.path()).unwrap();
    assert!(saved.contains("ui:flow_005"));
}

fn dag_document(edges: &[(usize, usize)]) -> String {
    let graph: Vec<_> = edges
        .iter()
        .map(|(source, target)| {
            json!({
                "subject": format!("n{source}"),
                "predicate": "feeds_to",
                "object": format!("n{target}"),
            })
        })
        .collect();
    json!({ "@graph": graph }).to_string()
}

fn relations_document(relations: &[(String, &str, String)]) -> String {
    let graph: Vec<_> = relations
        .iter()
        .map(|(subject, predicate, object)| {
            json!({ "subject": subject, "predicate": predicate, "object": object })
        })
        .collect();
    json!({ "@graph": graph }).to_string()
}

fn arb_relations() -> impl Strategy<Value = Vec<(String, &'static str, String)>> {
    let label = "[a-z]{1,6}( [a-z]{1,6})?";
    let predicate = prop::sample::select(vec!["feeds_to", "generates", "transforms_to"]);
    prop::collection::vec((label, predicate, label), 1..12)
}

fn arb_dag_edges() -> impl Strategy<Value = Vec<(usize, usize)>> {
    prop::collection::vec((0usize..8, 1usize..8), 1..20).prop_map(|pairs| {
        pairs
            .into_iter()
            .map(|(a, b)| (a.min(b), a.max(b)))
            .filter(|(a, b)| a != b)
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_dag_edges_point_down(edges in arb_dag_edges()) {
        let builder = DiagramBuilder::default();
        let diagram = builder.parse(&dag_document(&edges)).unwrap().into_value();
        let level_height = builder.config().layout().level_height();

        for edge in diagram.edges() {
            let source = diagram.node(edge.source()).unwrap().position();
            let target = diagram.node(edge.target()).unwrap().position();
            prop_assert!(target.y() >= source.y() + level_height - 0.01);
        }
    }

    #[test]
    fn prop_layout_is_deterministic(
        edges in prop::collection::vec((0usize..6, 0usize..6), 0..15)
    ) {
        let builder = DiagramBuilder::default();
        let source = dag_document(&edges);

        let first = builder.parse(&source).unwrap().into_value();
        let second = builder.parse(&source).unwrap().into_value();

        let positions = |diagram: &Diagram| {
            diagram.nodes().iter().map(|node| node.position()).collect::<Vec<_>>()
        };
        prop_assert_eq!(positions(&first), positions(&second));
    }

    #[test]
    fn prop_serialize_round_trip_keeps_triples(
        relations in arb_relations(),
        pick in any::<prop::sample::Index>(),
    ) {
        let builder = DiagramBuilder::default();
        let diagram = builder.parse(&relations_document(&relations)).unwrap().into_value();

        let id = pick.get(diagram.nodes()).id().clone();
        let label = format!("{} v2", diagram.node(&id).unwrap().label());
        let mut session = Session::new(
            diagram,
            LoadSource::Sample,
            Box::new(MemoryStore::new()),
            AppConfig::default(),
        );
        session.relabel_node(&id, &label).unwrap();
        let edited = session.diagram();

        let text = builder.render_jsonld(edited).unwrap();
        let reparsed = builder.parse(&text).unwrap();

        prop_assert!(reparsed.warnings().is_empty());
        prop_assert_eq!(triples(reparsed.value()), triples(edited));
        prop_assert_eq!(reparsed.value().nodes().len(), edited.nodes().len());
    }
}
