//! Error and diagnostic system for Knowflow ingestion.
//!
//! This module provides an error handling system with:
//! - Error codes for documentation and searchability
//! - Labeled spans pointing into the offending document
//! - Severity levels
//! - Diagnostic collector for accumulating errors and warnings
//!
//! # Overview
//!
//! A [`Diagnostic`] represents a single error or warning message with an
//! optional error code, source locations and help text. Failing operations
//! return every error diagnostic wrapped in a [`ParseError`]; successful
//! operations hand their warnings back through [`Parsed`](crate::Parsed).
//!
//! # Example
//!
//! ```
//! # use knowflow_parser::error::{Diagnostic, ErrorCode};
//! # use knowflow_parser::Span;
//!
//! let diag = Diagnostic::error("missing required columns: predicate")
//!     .with_code(ErrorCode::E202)
//!     .with_label(Span::new(0..40), "header row")
//!     .with_help("add the `predicate` column to the header row");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;
mod severity;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::ParseError;
pub use severity::Severity;
