//! Diagram element types.
//!
//! - [`Node`] - A labeled box placed on the canvas
//! - [`Edge`] - A directed, optionally labeled connection between two nodes
//! - [`NodeCategory`] / [`EdgeCategory`] - Semantic categories assigned by the classifier

use std::{
    collections::BTreeMap,
    fmt::{self, Display},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::{
    geometry::Point,
    identifier::{EdgeId, NodeId},
};

/// Descriptive fields carried alongside a node, keyed by field name.
pub type Attributes = BTreeMap<String, serde_json::Value>;

/// Semantic category of a node.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeCategory {
    /// A processing step (default)
    #[default]
    Process,
    /// A branching or evaluation step
    Decision,
    /// A source artifact
    Input,
    /// A produced artifact
    Output,
}

impl NodeCategory {
    /// Returns the JSON-LD entity type used when this node is the subject of a
    /// serialized relation.
    pub fn entity_type(self) -> &'static str {
        match self {
            Self::Input | Self::Output => "Artifact",
            Self::Process | Self::Decision => "Process",
        }
    }
}

impl FromStr for NodeCategory {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "process" => Ok(Self::Process),
            "decision" => Ok(Self::Decision),
            "input" => Ok(Self::Input),
            "output" => Ok(Self::Output),
            _ => Err("Unsupported node category"),
        }
    }
}

impl From<NodeCategory> for &'static str {
    fn from(val: NodeCategory) -> Self {
        match val {
            NodeCategory::Process => "process",
            NodeCategory::Decision => "decision",
            NodeCategory::Input => "input",
            NodeCategory::Output => "output",
        }
    }
}

impl Display for NodeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: &'static str = (*self).into();
        write!(f, "{s}")
    }
}

/// Semantic category of an edge.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeCategory {
    /// A plain flow step (default)
    #[default]
    Default,
    /// A conditional branch
    Conditional,
    /// A back edge of a loop
    Loop,
}

impl FromStr for EdgeCategory {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "default" => Ok(Self::Default),
            "conditional" => Ok(Self::Conditional),
            "loop" => Ok(Self::Loop),
            _ => Err("Unsupported edge category"),
        }
    }
}

impl From<EdgeCategory> for &'static str {
    fn from(val: EdgeCategory) -> Self {
        match val {
            EdgeCategory::Default => "default",
            EdgeCategory::Conditional => "conditional",
            EdgeCategory::Loop => "loop",
        }
    }
}

impl Display for EdgeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: &'static str = (*self).into();
        write!(f, "{s}")
    }
}

/// A node of the diagram.
///
/// The identifier is fixed at creation; editing the label later does not
/// change it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    id: NodeId,
    label: String,
    category: NodeCategory,
    position: Point,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    attributes: Attributes,
}

impl Node {
    /// Create a new node at the origin with no attributes.
    pub fn new(id: NodeId, label: impl Into<String>, category: NodeCategory) -> Self {
        Self {
            id,
            label: label.into(),
            category,
            position: Point::default(),
            attributes: Attributes::new(),
        }
    }

    /// Set the initial position.
    pub fn with_position(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    /// Set the descriptive attributes.
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn category(&self) -> NodeCategory {
        self.category
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Replace the label, keeping the identifier.
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    /// Move the node.
    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }
}

/// A directed edge between two nodes, referenced by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    id: EdgeId,
    source: NodeId,
    target: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    category: EdgeCategory,
}

impl Edge {
    /// Create a new edge.
    pub fn new(
        id: EdgeId,
        source: NodeId,
        target: NodeId,
        label: Option<String>,
        category: EdgeCategory,
    ) -> Self {
        Self {
            id,
            source,
            target,
            label,
            category,
        }
    }

    pub fn id(&self) -> &EdgeId {
        &self.id
    }

    pub fn source(&self) -> &NodeId {
        &self.source
    }

    pub fn target(&self) -> &NodeId {
        &self.target
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn category(&self) -> EdgeCategory {
        self.category
    }
}
