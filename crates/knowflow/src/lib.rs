//! Knowflow - Interactive flow diagrams from JSON-LD relation graphs.
//!
//! Knowflow reads subject/predicate/object records, turns every distinct
//! label into a node and every record into a directed edge, and arranges the
//! result in horizontal levels. Diagrams can be edited, rendered to SVG and
//! written back as JSON-LD. A0-schema CSV datasets and Markdown flow chains
//! are converted into the same JSON-LD shape.

pub mod config;
pub mod export;
pub mod layout;
pub mod loader;
pub mod session;
pub mod store;

mod error;

pub use knowflow_core::{classify, color, geometry, identifier, semantic};
pub use knowflow_parser::{Parsed, error as diagnostics, jsonld::Document};

pub use error::KnowflowError;

use log::{debug, info, trace};

use knowflow_parser::{dataset, jsonld, markdown};

use config::AppConfig;
use export::{Renderer, jsonld::JsonLdRenderer, svg::SvgRenderer};
use layout::{Engine, LevelEngine};
use loader::SaveOutcome;

/// Builder for converting, laying out and rendering Knowflow diagrams.
///
/// # Examples
///
/// ```rust
/// use knowflow::{DiagramBuilder, config::AppConfig};
///
/// let source = r#"{"@graph": [
///     {"subject": "Markdown", "predicate": "transforms_to", "object": "CSV"}
/// ]}"#;
///
/// let builder = DiagramBuilder::new(AppConfig::default());
///
/// // Parse and lay out the document
/// let diagram = builder.parse(source)
///     .expect("Failed to parse")
///     .into_value();
///
/// // Render the positioned diagram to SVG
/// let svg = builder.render_svg(&diagram)
///     .expect("Failed to render");
/// assert!(svg.contains("Markdown"));
/// ```
#[derive(Default)]
pub struct DiagramBuilder {
    config: AppConfig,
}

impl DiagramBuilder {
    /// Create a new diagram builder with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration including layout, style and data settings
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse a JSON-LD document into a laid out diagram.
    ///
    /// Records with a blank subject are skipped with a warning. A record
    /// without an object or predicate still adds its nodes but no edge. The
    /// warnings are returned alongside the diagram.
    ///
    /// # Errors
    ///
    /// Returns [`KnowflowError::Parse`] if `source` is not valid JSON.
    pub fn parse(&self, source: &str) -> Result<Parsed<semantic::Diagram>, KnowflowError> {
        info!("Parsing diagram");

        let (diagram, warnings) =
            loader::diagram_from_jsonld(source, self.config.data().diagram(), &self.engine())?;

        debug!(nodes = diagram.nodes().len(), edges = diagram.edges().len(); "Diagram parsed");
        trace!(diagram:?; "Parsed diagram");

        Ok(Parsed::new(diagram, warnings))
    }

    /// Recompute the level layout of a diagram in place.
    pub fn layout(&self, diagram: &mut semantic::Diagram) {
        self.engine().calculate(diagram).apply(diagram);
    }

    /// Convert an A0-schema CSV dataset into a JSON-LD document.
    ///
    /// # Errors
    ///
    /// Returns [`KnowflowError::Parse`] if the CSV is empty, malformed or
    /// lacks a required column.
    pub fn convert_csv(&self, source: &str) -> Result<Parsed<Document>, KnowflowError> {
        info!("Converting CSV dataset");
        dataset::convert_csv(source).map_err(|err| KnowflowError::new_parse_error(err, source))
    }

    /// Extract the `A → B → C` flow chains of a Markdown file as a JSON-LD
    /// document.
    ///
    /// # Arguments
    ///
    /// * `source` - Markdown text
    /// * `source_name` - File name recorded in each record's `source_location`
    pub fn extract_markdown(&self, source: &str, source_name: &str) -> Parsed<Document> {
        info!(source_name; "Extracting Markdown flows");
        let (relations, warnings) = markdown::extract_flows(source, source_name).into_parts();
        Parsed::new(
            Document::new(jsonld::dataset_context(), relations),
            warnings,
        )
    }

    /// Render a laid out diagram as SVG.
    ///
    /// # Errors
    ///
    /// Returns [`KnowflowError::Export`] if the style configuration holds an
    /// invalid color.
    pub fn render_svg(&self, diagram: &semantic::Diagram) -> Result<String, KnowflowError> {
        let svg = SvgRenderer::new(self.config.style().clone()).render(diagram)?;
        info!("SVG rendered successfully");
        Ok(svg)
    }

    /// Serialize a diagram back to pretty-printed JSON-LD.
    ///
    /// # Errors
    ///
    /// Returns [`KnowflowError::Export`] if serialization fails.
    pub fn render_jsonld(&self, diagram: &semantic::Diagram) -> Result<String, KnowflowError> {
        Ok(JsonLdRenderer.render(diagram)?)
    }

    /// Write a diagram to the configured output location.
    ///
    /// # Errors
    ///
    /// Returns [`KnowflowError::Io`] if neither the output directory nor the
    /// fallback location can be written.
    pub fn save(&self, diagram: &semantic::Diagram) -> Result<SaveOutcome, KnowflowError> {
        loader::save(&export::jsonld::to_document(diagram), &self.config)
    }

    fn engine(&self) -> LevelEngine {
        LevelEngine::new(self.config.layout().clone())
    }
}
