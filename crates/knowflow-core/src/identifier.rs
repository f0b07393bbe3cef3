//! Identifiers for diagram nodes and edges.
//!
//! Node identifiers are a natural key derived from the node label: the label is
//! lower-cased and every run of whitespace is collapsed into a single dash.
//! [`LabelInterner`] maps those normalized labels to node slots so that the
//! same label always resolves to the same node during one ingestion pass.

use std::{collections::HashMap, fmt};

use log::trace;
use serde::{Deserialize, Serialize};
use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Normalizes a label into its natural-key form.
///
/// # Examples
///
/// ```
/// use knowflow_core::identifier::normalize_label;
///
/// assert_eq!(normalize_label("Curriculum  Engine"), "curriculum-engine");
/// assert_eq!(normalize_label(" CSV (A0 schema) "), "csv-(a0-schema)");
/// ```
pub fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Identifier of a node within a diagram.
///
/// # Examples
///
/// ```
/// use knowflow_core::identifier::NodeId;
///
/// let id = NodeId::from_label("SPARQL queries");
/// assert_eq!(id, "node-sparql-queries");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Creates a node identifier from an already formed string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derives the identifier of a node from its label.
    pub fn from_label(label: &str) -> Self {
        Self(format!("node-{}", normalize_label(label)))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for NodeId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl PartialEq<str> for NodeId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Identifier of an edge within a diagram.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(String);

impl EdgeId {
    /// Creates an edge identifier from an already formed string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates the sequential identifier for the edge built from the record at `index`.
    ///
    /// # Examples
    ///
    /// ```
    /// use knowflow_core::identifier::EdgeId;
    ///
    /// assert_eq!(EdgeId::from_index(3), "edge-3");
    /// ```
    pub fn from_index(index: usize) -> Self {
        Self(format!("edge-{index}"))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for EdgeId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Interning map from normalized labels to node slots.
///
/// Every label is normalized with [`normalize_label`] before it is interned, so
/// `"Curriculum Engine"` and `"curriculum   engine"` share one slot. The slot
/// is an index chosen by the caller, typically the position of the node in its
/// node list.
///
/// # Examples
///
/// ```
/// use knowflow_core::identifier::LabelInterner;
///
/// let mut interner = LabelInterner::new();
/// assert_eq!(interner.lookup("Markdown"), None);
///
/// let id = interner.insert("Markdown", 0);
/// assert_eq!(id, "node-markdown");
/// assert_eq!(interner.lookup("markdown"), Some(0));
/// ```
pub struct LabelInterner {
    interner: DefaultStringInterner,
    slots: HashMap<DefaultSymbol, usize>,
}

impl LabelInterner {
    /// Creates an empty interner.
    pub fn new() -> Self {
        Self {
            interner: DefaultStringInterner::new(),
            slots: HashMap::new(),
        }
    }

    /// Returns the slot registered for `label`, if any.
    pub fn lookup(&self, label: &str) -> Option<usize> {
        let key = normalize_label(label);
        self.interner
            .get(key.as_str())
            .and_then(|symbol| self.slots.get(&symbol).copied())
    }

    /// Registers `label` at `slot` and returns the node identifier derived from it.
    ///
    /// Re-registering a label that is already known keeps its original slot.
    pub fn insert(&mut self, label: &str, slot: usize) -> NodeId {
        let key = normalize_label(label);
        let symbol = self.interner.get_or_intern(key.as_str());
        let slot = *self.slots.entry(symbol).or_insert(slot);
        trace!(label, slot; "Interned node label");
        NodeId(format!("node-{key}"))
    }

    /// Returns the number of distinct labels interned.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if no label has been interned.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl Default for LabelInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LabelInterner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LabelInterner")
            .field("len", &self.slots.len())
            .finish()
    }
}
