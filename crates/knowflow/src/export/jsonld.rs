//! Round-trip serialization of diagrams back into JSON-LD.
//!
//! Every edge becomes one relation record; nodes only survive through the
//! edges that reference them, so isolated nodes are not written.

use std::collections::HashMap;

use log::debug;

use knowflow_core::{
    identifier::NodeId,
    semantic::{Diagram, Node},
};
use knowflow_parser::jsonld::{Document, Relation, flow_context};

use super::{Error, Renderer};

const DEFAULT_PREDICATE: &str = "relates_to";
const DEFAULT_ENTITY_TYPE: &str = "Process";

/// Fixed descriptive fields written on every record.
const FLOW_FIELDS: &[(&str, &str)] = &[
    ("domain", "Technology"),
    ("category", "Flow"),
    ("stage", "Planning"),
    ("source_location", "README.md#Example Flow"),
    ("source_type", "Documentation"),
    ("metadata_json", "{}"),
];

/// Convert a diagram into a JSON-LD document with one record per edge.
///
/// Records are numbered `ui:flow_001`, `ui:flow_002`, ... in edge order.
/// The record type follows the source node's category; subject and object
/// are the current node labels, so relabeled nodes are written with their
/// new label. An edge endpoint that does not resolve is written by id.
pub fn to_document(diagram: &Diagram) -> Document {
    let nodes: HashMap<&NodeId, &Node> = diagram
        .nodes()
        .iter()
        .map(|node| (node.id(), node))
        .collect();
    let label = |id: &NodeId| {
        nodes
            .get(id)
            .map_or_else(|| id.as_str().to_string(), |node| node.label().to_string())
    };

    let graph = diagram
        .edges()
        .iter()
        .enumerate()
        .map(|(index, edge)| {
            let entity_type = nodes
                .get(edge.source())
                .map_or(DEFAULT_ENTITY_TYPE, |node| node.category().entity_type());
            let relation = Relation::new(
                label(edge.source()),
                edge.label().unwrap_or(DEFAULT_PREDICATE),
                label(edge.target()),
            )
            .with_id(format!("ui:flow_{:03}", index + 1))
            .with_type(entity_type);

            FLOW_FIELDS
                .iter()
                .fold(relation, |relation, (name, value)| {
                    relation.with_field(*name, *value)
                })
        })
        .collect::<Vec<_>>();

    debug!(records = graph.len(), dropped_nodes = isolated_nodes(diagram); "Diagram serialized");
    Document::new(flow_context(), graph)
}

fn isolated_nodes(diagram: &Diagram) -> usize {
    diagram
        .nodes()
        .iter()
        .filter(|node| {
            !diagram
                .edges()
                .iter()
                .any(|edge| edge.source() == node.id() || edge.target() == node.id())
        })
        .count()
}

/// Renders a diagram as pretty-printed round-trip JSON-LD.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLdRenderer;

impl Renderer for JsonLdRenderer {
    fn render(&self, diagram: &Diagram) -> Result<String, Error> {
        Ok(to_document(diagram).to_json_string())
    }
}
