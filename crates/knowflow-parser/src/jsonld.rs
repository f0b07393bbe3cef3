//! JSON-LD relation documents.
//!
//! A document is an object with an `@context` and a `@graph` array of
//! relation records. Each record names a `subject`, a `predicate` and an
//! `object`, plus optional descriptive fields:
//!
//! ```json
//! {
//!   "@context": { "@vocab": "https://huijoohwee.github.io/schema/vocab.jsonld" },
//!   "@graph": [
//!     { "id": "sys:kg_001", "type": "Process",
//!       "subject": "Markdown", "predicate": "transforms_to", "object": "CSV" }
//!   ]
//! }
//! ```
//!
//! Reading is lenient: only invalid JSON fails. Structural problems degrade to
//! an empty or partial graph and are reported as warnings.

use indexmap::IndexMap;
use log::{debug, warn};
use serde::Serialize;
use serde_json::{Map, Value, json};

use knowflow_core::semantic::Attributes;

use crate::{
    Parsed,
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    span::Span,
};

/// Vocabulary shared by every context Knowflow writes.
pub const VOCABULARY: &str = "https://huijoohwee.github.io/schema/vocab.jsonld";

/// Descriptive fields a dataset record may carry besides its triple.
pub const DESCRIPTIVE_FIELDS: &[&str] = &[
    "domain",
    "category",
    "stage",
    "attribute",
    "value",
    "role",
    "action",
    "outcome",
    "challenge",
    "solution",
    "context",
    "source_location",
    "source_type",
    "component_name",
    "operation_name",
    "operation_description",
    "temporal_marker",
    "impact_description",
    "source_reference",
    "metadata_json",
];

/// Returns the `@context` written for converted datasets.
///
/// It maps `id` and `type` onto their JSON-LD keywords and declares every
/// triple and descriptive field.
pub fn dataset_context() -> Value {
    let mut context = Map::new();
    context.insert("@vocab".to_string(), json!(VOCABULARY));
    context.insert("id".to_string(), json!("@id"));
    context.insert("type".to_string(), json!("@type"));
    for field in ["subject", "predicate", "object"]
        .into_iter()
        .chain(DESCRIPTIVE_FIELDS.iter().copied())
    {
        context.insert(field.to_string(), json!(field));
    }
    Value::Object(context)
}

/// Returns the `@context` written for serialized flow diagrams.
pub fn flow_context() -> Value {
    let mut context = Map::new();
    context.insert("@vocab".to_string(), json!(VOCABULARY));
    context.insert("id".to_string(), json!("@id"));
    context.insert("type".to_string(), json!("@type"));
    for field in [
        "subject",
        "predicate",
        "object",
        "domain",
        "category",
        "stage",
        "source_location",
        "source_type",
        "metadata_json",
    ] {
        context.insert(field.to_string(), json!(field));
    }
    Value::Object(context)
}

/// One entry of a document's `@graph`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Relation {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    entity_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    predicate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    object: Option<String>,
    #[serde(flatten)]
    fields: IndexMap<String, Value>,
}

impl Relation {
    /// Create a relation from its triple.
    pub fn new(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: Some(subject.into()),
            predicate: Some(predicate.into()),
            object: Some(object.into()),
            ..Self::default()
        }
    }

    /// Set the record identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the entity type.
    pub fn with_type(mut self, entity_type: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self
    }

    /// Add a descriptive field.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Read a relation from a JSON object, keeping unknown members as fields.
    ///
    /// Triple members holding numbers or booleans are read as their text.
    pub fn from_map(map: Map<String, Value>) -> Self {
        let mut relation = Self::default();
        for (key, value) in map {
            match key.as_str() {
                "id" => relation.id = scalar_text(&value),
                "type" => relation.entity_type = scalar_text(&value),
                "subject" => relation.subject = scalar_text(&value),
                "predicate" => relation.predicate = scalar_text(&value),
                "object" => relation.object = scalar_text(&value),
                _ => {
                    relation.fields.insert(key, value);
                }
            }
        }
        relation
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn entity_type(&self) -> Option<&str> {
        self.entity_type.as_deref()
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    pub fn predicate(&self) -> Option<&str> {
        self.predicate.as_deref()
    }

    pub fn object(&self) -> Option<&str> {
        self.object.as_deref()
    }

    /// Returns a descriptive field by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Returns the descriptive fields in document order.
    pub fn fields(&self) -> &IndexMap<String, Value> {
        &self.fields
    }

    /// Returns the subject, predicate and object when all three are non-empty.
    pub fn triple(&self) -> Option<(&str, &str, &str)> {
        let subject = non_empty(self.subject.as_deref())?;
        let predicate = non_empty(self.predicate.as_deref())?;
        let object = non_empty(self.object.as_deref())?;
        Some((subject, predicate, object))
    }

    /// Returns every member except the triple, for attaching to a node.
    pub fn attributes(&self) -> Attributes {
        let mut attributes = Attributes::new();
        if let Some(id) = &self.id {
            attributes.insert("id".to_string(), json!(id));
        }
        if let Some(entity_type) = &self.entity_type {
            attributes.insert("type".to_string(), json!(entity_type));
        }
        for (key, value) in &self.fields {
            attributes.insert(key.clone(), value.clone());
        }
        attributes
    }
}

/// A JSON-LD document of relation records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    #[serde(rename = "@context")]
    context: Value,
    #[serde(rename = "@graph")]
    graph: Vec<Relation>,
}

impl Document {
    /// Create a document from a context and its relation records.
    pub fn new(context: Value, graph: Vec<Relation>) -> Self {
        Self { context, graph }
    }

    /// Create a document with an empty graph.
    pub fn empty() -> Self {
        Self::new(dataset_context(), Vec::new())
    }

    pub fn context(&self) -> &Value {
        &self.context
    }

    /// Borrow the relation records in document order.
    pub fn graph(&self) -> &[Relation] {
        &self.graph
    }

    /// Consume the document, returning its relation records.
    pub fn into_graph(self) -> Vec<Relation> {
        self.graph
    }

    /// Serialize as pretty-printed JSON with a two-space indent.
    pub fn to_json_string(&self) -> String {
        serde_json::to_string_pretty(self).expect("documents always serialize to JSON")
    }

    /// Read a document from an already parsed JSON value.
    ///
    /// Never fails; structural problems are reported as warnings and the
    /// affected parts are dropped.
    pub fn from_value(value: Value) -> Parsed<Self> {
        let mut collector = DiagnosticCollector::new();
        let document = Self::from_value_with(value, &mut collector);
        Parsed::new(document, collector.into_diagnostics())
    }

    fn from_value_with(value: Value, collector: &mut DiagnosticCollector) -> Self {
        let Value::Object(mut root) = value else {
            warn!("JSON-LD root is not an object, using an empty graph");
            collector.emit(
                Diagnostic::warning("document root is not an object; using an empty graph")
                    .with_code(ErrorCode::E101),
            );
            return Self::empty();
        };

        let context = root
            .remove("@context")
            .unwrap_or_else(|| Value::Object(Map::new()));

        let graph = match root.remove("@graph") {
            Some(Value::Array(entries)) => entries,
            Some(_) | None => {
                warn!("JSON-LD document has no `@graph` array, using an empty graph");
                collector.emit(
                    Diagnostic::warning("document has no `@graph` array; using an empty graph")
                        .with_code(ErrorCode::E102)
                        .with_help("relation records belong in a top-level `@graph` array"),
                );
                return Self::new(context, Vec::new());
            }
        };

        let mut relations = Vec::with_capacity(graph.len());
        for (index, entry) in graph.into_iter().enumerate() {
            match entry {
                Value::Object(map) => relations.push(Relation::from_map(map)),
                _ => {
                    collector.emit(
                        Diagnostic::warning(format!(
                            "`@graph` entry {index} is not an object and was skipped"
                        ))
                        .with_code(ErrorCode::E103),
                    );
                }
            }
        }

        debug!(relations = relations.len(); "JSON-LD document read");
        Self::new(context, relations)
    }
}

/// Parse JSON-LD text into a [`Document`].
///
/// # Errors
///
/// Returns a [`ParseError`] with an `E100` diagnostic pointing at the
/// offending line when `source` is not valid JSON. A valid JSON value with
/// the wrong shape is not an error; see [`Document::from_value`].
pub fn parse_document(source: &str) -> Result<Parsed<Document>, ParseError> {
    let value: Value = serde_json::from_str(source).map_err(|err| {
        let offset = Span::offset_of(source, err.line(), err.column());
        Diagnostic::error(format!("invalid JSON: {err}"))
            .with_code(ErrorCode::E100)
            .with_label(Span::line_at(source, offset), "while reading this line")
    })?;

    Ok(Document::from_value(value))
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn non_empty(text: Option<&str>) -> Option<&str> {
    text.filter(|text| !text.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_document() {
        let source = r#"{
            "@context": {"@vocab": "https://example.org/"},
            "@graph": [
                {"id": "sys:kg_001", "type": "Process", "subject": "Markdown",
                 "predicate": "transforms_to", "object": "CSV", "domain": "Technology"}
            ]
        }"#;

        let parsed = parse_document(source).unwrap();
        assert!(parsed.warnings().is_empty());

        let document = parsed.into_value();
        let relation = &document.graph()[0];
        assert_eq!(relation.id(), Some("sys:kg_001"));
        assert_eq!(relation.entity_type(), Some("Process"));
        assert_eq!(
            relation.triple(),
            Some(("Markdown", "transforms_to", "CSV"))
        );
        assert_eq!(relation.field("domain"), Some(&json!("Technology")));
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let err = parse_document("{\n  \"@graph\": [\n").unwrap_err();
        let diag = &err.diagnostics()[0];

        assert_eq!(diag.code(), Some(ErrorCode::E100));
        assert!(diag.message().starts_with("invalid JSON"));
        assert_eq!(diag.labels().len(), 1);
    }

    #[test]
    fn test_missing_graph_degrades_to_empty() {
        let parsed = parse_document(r#"{"@context": {}}"#).unwrap();

        assert_eq!(parsed.warnings().len(), 1);
        assert_eq!(parsed.warnings()[0].code(), Some(ErrorCode::E102));
        assert!(parsed.value().graph().is_empty());
    }

    #[test]
    fn test_non_object_root_degrades_to_empty() {
        let parsed = parse_document("[1, 2, 3]").unwrap();

        assert_eq!(parsed.warnings()[0].code(), Some(ErrorCode::E101));
        assert!(parsed.value().graph().is_empty());
    }

    #[test]
    fn test_non_object_entries_are_skipped() {
        let parsed =
            parse_document(r#"{"@graph": ["bad", {"subject": "A", "object": "B"}]}"#).unwrap();

        assert_eq!(parsed.warnings().len(), 1);
        assert_eq!(parsed.warnings()[0].code(), Some(ErrorCode::E103));
        assert_eq!(parsed.value().graph().len(), 1);
    }

    #[test]
    fn test_scalar_members_are_read_as_text() {
        let relation = Relation::from_map(
            json!({"subject": 42, "predicate": true, "object": null})
                .as_object()
                .cloned()
                .unwrap(),
        );

        assert_eq!(relation.subject(), Some("42"));
        assert_eq!(relation.predicate(), Some("true"));
        assert_eq!(relation.object(), None);
        assert_eq!(relation.triple(), None);
    }

    #[test]
    fn test_serialized_member_order() {
        let relation = Relation::new("A", "uses", "B")
            .with_id("ui:flow_001")
            .with_type("Process")
            .with_field("domain", "Technology");
        let document = Document::new(flow_context(), vec![relation]);

        let text = document.to_json_string();
        let id = text.find("\"id\": \"ui:flow_001\"").unwrap();
        let subject = text.find("\"subject\": \"A\"").unwrap();
        let domain = text.find("\"domain\": \"Technology\"").unwrap();
        assert!(id < subject && subject < domain);
        assert!(text.contains("\"@graph\""));
    }

    #[test]
    fn test_dataset_context_declares_descriptive_fields() {
        let context = dataset_context();

        assert_eq!(context["@vocab"], json!(VOCABULARY));
        assert_eq!(context["id"], json!("@id"));
        for field in DESCRIPTIVE_FIELDS {
            assert_eq!(context[*field], json!(field));
        }
    }

    #[test]
    fn test_attributes_exclude_triple() {
        let relation = Relation::new("A", "uses", "B")
            .with_id("x")
            .with_field("stage", "Planning");
        let attributes = relation.attributes();

        assert_eq!(attributes.len(), 2);
        assert!(!attributes.contains_key("subject"));
        assert_eq!(attributes["stage"], json!("Planning"));
    }
}
