//! Error types for Knowflow operations.
//!
//! This module provides the main error type [`KnowflowError`] which wraps
//! the error conditions of loading, editing, exporting and persisting
//! diagrams.

use std::io;

use thiserror::Error;

use knowflow_parser::error::ParseError;

/// The main error type for Knowflow operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant carries the structured diagnostics of the parser
/// together with the text they point into, for rich error reporting.
#[derive(Debug, Error)]
pub enum KnowflowError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("Store error: {0}")]
    Store(String),

    #[error("Edit error: {0}")]
    Edit(String),

    #[error("Export error: {0}")]
    Export(Box<dyn std::error::Error + Send + Sync>),
}

impl From<crate::export::Error> for KnowflowError {
    fn from(error: crate::export::Error) -> Self {
        Self::Export(Box::new(error))
    }
}

impl KnowflowError {
    /// Create a new `Parse` error with the associated source text.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}
