//! Semantic diagram model types.
//!
//! This module contains the in-memory representation of a flow diagram: the
//! unit exchanged between ingestion, layout, editing and serialization.
//!
//! # Pipeline Position
//!
//! ```text
//! JSON-LD Document
//!     ↓ ingest (label interning + classification)
//! Semantic Model (these types) - nodes at placeholder positions
//!     ↓ layout
//! Semantic Model - nodes at tiered positions
//!     ↓ render / edit / serialize
//! SVG, JSON-LD
//! ```
//!
//! # Organization
//!
//! - [`diagram`] - The root [`Diagram`] and its [`LayoutKind`]
//! - [`element`] - Diagram elements: [`Node`], [`Edge`] and their categories

pub mod diagram;
pub mod element;

pub use diagram::*;
pub use element::*;
