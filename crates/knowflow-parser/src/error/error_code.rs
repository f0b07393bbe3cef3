//! Error codes for the Knowflow diagnostic system.
//!
//! Error codes are organized by input:
//! - `E1xx` - JSON-LD document errors
//! - `E2xx` - CSV dataset errors
//! - `E3xx` - Ingestion warnings
//! - `E4xx` - Markdown extraction warnings

use std::fmt;

/// Error codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // JSON-LD Errors (E1xx)
    // =========================================================================
    /// Invalid JSON.
    ///
    /// The document is not syntactically valid JSON.
    E100,

    /// Document root is not an object.
    ///
    /// The JSON value at the top level must be an object holding `@context`
    /// and `@graph`. The document degrades to an empty graph.
    E101,

    /// Missing graph container.
    ///
    /// The document has no `@graph` member, or it is not an array. The
    /// document degrades to an empty graph.
    E102,

    /// Relation record is not an object.
    ///
    /// An entry of `@graph` is not a JSON object and was skipped.
    E103,

    // =========================================================================
    // CSV Errors (E2xx)
    // =========================================================================
    /// Malformed CSV record.
    ///
    /// The CSV reader could not decode a record, for instance because of
    /// invalid UTF-8 or an unterminated quote.
    E200,

    /// Empty dataset.
    ///
    /// The CSV file has no data rows.
    E201,

    /// Missing required columns.
    ///
    /// The header row lacks one or more of `graph_id`, `domain`, `category`,
    /// `entity_type`, `subject`, `predicate`, `object`.
    E202,

    /// CSV write failure.
    ///
    /// Relation records could not be written as CSV.
    E203,

    // =========================================================================
    // Ingestion Warnings (E3xx)
    // =========================================================================
    /// Empty subject.
    ///
    /// A relation record has an empty or blank subject and was skipped.
    E300,

    // =========================================================================
    // Markdown Warnings (E4xx)
    // =========================================================================
    /// No flow found.
    ///
    /// The Markdown document contains no fenced `A → B` flow chain.
    E400,
}

impl ErrorCode {
    /// Returns the string representation of this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
            ErrorCode::E203 => "E203",
            ErrorCode::E300 => "E300",
            ErrorCode::E400 => "E400",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E100 => "invalid JSON",
            ErrorCode::E101 => "document root is not an object",
            ErrorCode::E102 => "missing graph container",
            ErrorCode::E103 => "relation record is not an object",
            ErrorCode::E200 => "malformed CSV record",
            ErrorCode::E201 => "empty dataset",
            ErrorCode::E202 => "missing required columns",
            ErrorCode::E203 => "CSV write failure",
            ErrorCode::E300 => "empty subject",
            ErrorCode::E400 => "no flow found",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
