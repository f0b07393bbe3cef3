//! The ParseError type for wrapping ingestion diagnostics.

use thiserror::Error;

use crate::error::Diagnostic;

/// Error type for JSON-LD, CSV and Markdown processing.
///
/// Wraps one or more diagnostics. Warnings collected alongside the errors
/// are kept so a caller can show the full picture.
#[derive(Debug, Error)]
#[error("{}", summarize(.diagnostics))]
pub struct ParseError {
    diagnostics: Vec<Diagnostic>,
}

impl ParseError {
    /// Create a new parse error from diagnostics.
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    /// Get all diagnostics in this error.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Get the error diagnostics only.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity().is_error())
    }
}

/// The first error followed by a count of the remaining ones.
fn summarize(diagnostics: &[Diagnostic]) -> String {
    let mut errors = diagnostics.iter().filter(|diag| diag.severity().is_error());
    let Some(first) = errors.next() else {
        return String::new();
    };
    match errors.count() {
        0 => first.to_string(),
        rest => format!("{first} (+{rest} more)"),
    }
}

impl From<Diagnostic> for ParseError {
    fn from(diagnostic: Diagnostic) -> Self {
        Self {
            diagnostics: vec![diagnostic],
        }
    }
}

impl From<Vec<Diagnostic>> for ParseError {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }
}
