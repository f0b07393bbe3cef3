//! Conversion of relation records into a [`Diagram`].

use log::{debug, info, warn};
use serde::Deserialize;

use knowflow_core::{
    classify::{classify_edge, classify_node},
    geometry::Point,
    identifier::{EdgeId, LabelInterner, NodeId},
    semantic::{Diagram, Edge, Node},
};

use crate::{
    Parsed,
    error::{Diagnostic, ErrorCode},
    jsonld::{Document, Relation},
};

/// Metadata stamped onto ingested diagrams.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub id: String,
    pub title: String,
    pub description: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            id: "readme-flow".to_string(),
            title: "README Example Flow".to_string(),
            description: "Interactive visualization of the pipeline flow from README.md"
                .to_string(),
        }
    }
}

/// Builds a diagram from relation records in a single ordered pass.
struct Ingester {
    diagram: Diagram,
    interner: LabelInterner,
    warnings: Vec<Diagnostic>,
}

impl Ingester {
    fn new(config: &IngestConfig) -> Self {
        Self {
            diagram: Diagram::new(&config.id, &config.title, &config.description),
            interner: LabelInterner::new(),
            warnings: Vec::new(),
        }
    }

    fn relation(&mut self, index: usize, relation: &Relation) {
        let Some(subject) = present(relation.subject()) else {
            warn!(index; "Relation without subject skipped");
            self.warnings.push(
                Diagnostic::warning(format!("record {index} has no subject and was skipped"))
                    .with_code(ErrorCode::E300),
            );
            return;
        };

        let source = self.node(subject, relation);
        let target = present(relation.object()).map(|object| self.node(object, relation));

        if let (Some(target), Some(predicate)) = (target, present(relation.predicate())) {
            self.diagram.push_edge(Edge::new(
                EdgeId::from_index(index),
                source,
                target,
                Some(predicate.to_string()),
                classify_edge(predicate),
            ));
        }
    }

    /// Returns the id of the node for `label`, creating it on first sight.
    fn node(&mut self, label: &str, relation: &Relation) -> NodeId {
        if let Some(slot) = self.interner.lookup(label) {
            return self.diagram.nodes()[slot].id().clone();
        }

        let slot = self.diagram.nodes().len();
        let id = self.interner.insert(label, slot);
        let node = Node::new(id.clone(), label, classify_node(label))
            .with_position(placeholder_position(slot))
            .with_attributes(relation.attributes());
        debug!(id = id.as_str(), category = node.category().to_string(); "Node created");
        self.diagram.push_node(node);
        id
    }

    fn finish(self) -> Parsed<Diagram> {
        Parsed::new(self.diagram, self.warnings)
    }
}

/// Diagonal staircase used until a layout engine places the node.
fn placeholder_position(slot: usize) -> Point {
    let n = slot as f32;
    Point::new(100.0 + n * 200.0, 100.0 + n * 50.0)
}

fn present(text: Option<&str>) -> Option<&str> {
    text.filter(|text| !text.trim().is_empty())
}

/// Convert a document's relation records into a diagram.
///
/// Records are visited once, in order. Each distinct subject or object label
/// (compared after lower-casing and collapsing whitespace) becomes one node;
/// each record with a subject, predicate and object becomes one edge with id
/// `edge-<record index>`. Records without a subject are skipped with an
/// `E300` warning.
///
/// Nodes receive placeholder positions; run a layout engine afterwards.
pub fn ingest(document: &Document, config: &IngestConfig) -> Parsed<Diagram> {
    let mut ingester = Ingester::new(config);
    for (index, relation) in document.graph().iter().enumerate() {
        ingester.relation(index, relation);
    }

    let parsed = ingester.finish();
    info!(
        nodes = parsed.value().nodes().len(),
        edges = parsed.value().edges().len(),
        skipped = parsed.warnings().len();
        "Graph ingested"
    );
    parsed
}
