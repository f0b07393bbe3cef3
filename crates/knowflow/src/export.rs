//! Export functionality for Knowflow diagrams.
//!
//! This module provides the [`Renderer`] trait that defines the interface for
//! converting a diagram into an output format. It is the final stage in the
//! Knowflow processing pipeline.
//!
//! # Pipeline Position
//!
//! ```text
//! JSON-LD / CSV / Markdown
//!     ↓ parse + ingest
//! Semantic Model
//!     ↓ layout
//! Positioned Diagram
//!     ↓ export (this module)
//! Output Text
//! ```
//!
//! # Available Backends
//!
//! - [`jsonld`] - Round-trip JSON-LD via [`jsonld::JsonLdRenderer`]
//! - [`svg`] - SVG output via [`svg::SvgRenderer`]
//!
//! # Error Handling
//!
//! Export operations return [`Error`]. [`Error`] converts into
//! [`KnowflowError::Export`] at the crate boundary.
//!
//! [`KnowflowError::Export`]: crate::KnowflowError::Export

/// JSON-LD export backend.
pub mod jsonld;
/// SVG export backend.
pub mod svg;

use knowflow_core::semantic::Diagram;

/// Abstraction for diagram export backends.
///
/// Implementors convert a [`Diagram`] into a specific text format. The
/// diagram is only read; renderers never mutate it.
pub trait Renderer {
    /// Renders the diagram.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] if the diagram cannot be converted to the
    /// target format.
    fn render(&self, diagram: &Diagram) -> Result<String, Error>;
}

/// Errors that can occur during diagram export.
#[derive(Debug)]
pub enum Error {
    /// A rendering or conversion failure described by `message`.
    Render(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Render(msg) => write!(f, "Render error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}
