//! Core diagram structure types.
//!
//! - [`Diagram`] - The root diagram type owning its nodes and edges
//! - [`LayoutKind`] - How a front end presents the diagram

use std::{
    fmt::{self, Display},
    str::FromStr,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    identifier::NodeId,
    semantic::element::{Edge, Node},
};

/// Presentation mode of a diagram.
///
/// The names match external configuration strings (snake_case).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutKind {
    /// Tiered flow (default)
    #[default]
    Flow,
    /// Free graph
    Graph,
    /// Timeline
    Timeline,
}

impl FromStr for LayoutKind {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flow" => Ok(Self::Flow),
            "graph" => Ok(Self::Graph),
            "timeline" => Ok(Self::Timeline),
            _ => Err("Unsupported layout kind"),
        }
    }
}

impl From<LayoutKind> for &'static str {
    fn from(val: LayoutKind) -> Self {
        match val {
            LayoutKind::Flow => "flow",
            LayoutKind::Graph => "graph",
            LayoutKind::Timeline => "timeline",
        }
    }
}

impl Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: &'static str = (*self).into();
        write!(f, "{s}")
    }
}

/// A flow diagram.
///
/// The diagram owns its nodes and edges. Edges reference nodes by
/// [`NodeId`]; ingestion guarantees each reference resolves, but the model
/// itself does not enforce it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagram {
    id: String,
    title: String,
    description: String,
    created_at: DateTime<Utc>,
    layout_kind: LayoutKind,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl Diagram {
    /// Create an empty diagram stamped with the current time.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            created_at: Utc::now(),
            layout_kind: LayoutKind::default(),
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Override the creation timestamp.
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Set the presentation mode.
    pub fn with_layout_kind(mut self, layout_kind: LayoutKind) -> Self {
        self.layout_kind = layout_kind;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn layout_kind(&self) -> LayoutKind {
        self.layout_kind
    }

    pub fn set_layout_kind(&mut self, layout_kind: LayoutKind) {
        self.layout_kind = layout_kind;
    }

    /// Borrow the nodes in creation order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Mutably borrow the nodes in creation order.
    pub fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    /// Borrow the edges in creation order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Find a node by identifier.
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id() == id)
    }

    /// Find a node by identifier for mutation.
    pub fn node_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|node| node.id() == id)
    }

    /// Append a node.
    pub fn push_node(&mut self, node: Node) {
        self.nodes.push(node);
    }

    /// Append an edge.
    pub fn push_edge(&mut self, edge: Edge) {
        self.edges.push(edge);
    }

    /// Returns `true` if the diagram has neither nodes nor edges.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Returns the edges whose source or target does not resolve to a node.
    pub fn dangling_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges
            .iter()
            .filter(|edge| self.node(edge.source()).is_none() || self.node(edge.target()).is_none())
    }
}
