//! # Knowflow Parser
//!
//! Reading side of Knowflow. This crate turns relation data into the
//! semantic diagram model of [`knowflow_core`]:
//!
//! - [`jsonld`] reads and writes JSON-LD relation documents
//! - [`dataset`] validates A0-schema CSV files and converts them to JSON-LD
//! - [`markdown`] extracts `A → B → C` flow chains from Markdown
//! - [`ingest`] builds a [`Diagram`] from relation records
//!
//! ## Usage
//!
//! ```
//! # use knowflow_parser::{parse, IngestConfig, error::ParseError};
//!
//! fn main() -> Result<(), ParseError> {
//!     let source = r#"{
//!         "@context": {},
//!         "@graph": [
//!             {"subject": "Markdown", "predicate": "transforms_to", "object": "CSV"}
//!         ]
//!     }"#;
//!
//!     let diagram = parse(source, &IngestConfig::default())?.into_value();
//!     assert_eq!(diagram.nodes().len(), 2);
//!     Ok(())
//! }
//! ```

pub mod dataset;
pub mod error;
pub mod ingest;
pub mod jsonld;
pub mod markdown;
mod span;

pub use ingest::IngestConfig;
pub use span::Span;

use knowflow_core::semantic::Diagram;

use error::{Diagnostic, ParseError};

/// A successfully produced value together with the warnings raised on the way.
#[derive(Debug, Clone)]
pub struct Parsed<T> {
    value: T,
    warnings: Vec<Diagnostic>,
}

impl<T> Parsed<T> {
    pub fn new(value: T, warnings: Vec<Diagnostic>) -> Self {
        Self { value, warnings }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn into_parts(self) -> (T, Vec<Diagnostic>) {
        (self.value, self.warnings)
    }
}

/// Parse JSON-LD text into a diagram.
///
/// This runs the whole reading pipeline:
///
/// 1. **Read** - Parse the JSON and collect the `@graph` records
/// 2. **Ingest** - Intern labels into nodes and records into edges
///
/// The diagram nodes carry placeholder positions. Warnings from both steps
/// are returned together.
///
/// # Errors
///
/// Fails only when `source` is not valid JSON.
pub fn parse(source: &str, config: &IngestConfig) -> Result<Parsed<Diagram>, ParseError> {
    let (document, mut warnings) = jsonld::parse_document(source)?.into_parts();
    let (diagram, ingest_warnings) = ingest::ingest(&document, config).into_parts();
    warnings.extend(ingest_warnings);
    Ok(Parsed::new(diagram, warnings))
}
