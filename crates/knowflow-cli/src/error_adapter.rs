//! miette reports for Knowflow failures and input warnings.
//!
//! Input problems carry a [`Diagnostic`] pointing into the uploaded or loaded
//! text, so they are shown with the offending line. Every other
//! [`KnowflowError`] becomes a one-line report with a stable code.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, GraphicalReportHandler, LabeledSpan, SourceSpan};
use thiserror::Error;

use knowflow::KnowflowError;
use knowflow_parser::error::{Diagnostic, Severity};

/// A parser diagnostic together with the text its labels point into.
#[derive(Debug, Error)]
#[error("{}", .diagnostic.message())]
pub struct InputReport<'a> {
    diagnostic: &'a Diagnostic,
    text: &'a str,
}

impl<'a> InputReport<'a> {
    pub fn new(diagnostic: &'a Diagnostic, text: &'a str) -> Self {
        Self { diagnostic, text }
    }
}

impl MietteDiagnostic for InputReport<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = self.diagnostic.code()?;
        Some(Box::new(code))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(match self.diagnostic.severity() {
            Severity::Error => miette::Severity::Error,
            Severity::Warning => miette::Severity::Warning,
        })
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = self.diagnostic.help()?;
        Some(Box::new(help))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.text as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let labels = self.diagnostic.labels();
        if labels.is_empty() {
            return None;
        }

        Some(Box::new(labels.iter().map(|label| {
            let span = SourceSpan::new(label.span().start().into(), label.span().len());
            let message = Some(label.message().to_string());
            if label.is_primary() {
                LabeledSpan::new_primary_with_span(message, span)
            } else {
                LabeledSpan::new_with_span(message, span)
            }
        })))
    }
}

/// A failure without a location in the input.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ErrorReport<'a>(&'a KnowflowError);

impl MietteDiagnostic for ErrorReport<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self.0 {
            KnowflowError::Io(_) => "knowflow::io",
            KnowflowError::Parse { .. } => return None,
            KnowflowError::Store(_) => "knowflow::store",
            KnowflowError::Edit(_) => "knowflow::edit",
            KnowflowError::Export(_) => "knowflow::export",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match self.0 {
            KnowflowError::Store(_) => "set `data.store` in the configuration file to a writable path",
            KnowflowError::Edit(_) => "select nodes by id, such as `node-curriculum-engine`",
            _ => return None,
        };
        Some(Box::new(help))
    }
}

/// Split an error into the reports to show, one per input diagnostic.
pub fn reports(err: &KnowflowError) -> Vec<Box<dyn MietteDiagnostic + '_>> {
    match err {
        KnowflowError::Parse { err, src } => err
            .diagnostics()
            .iter()
            .map(|diagnostic| {
                Box::new(InputReport::new(diagnostic, src)) as Box<dyn MietteDiagnostic + '_>
            })
            .collect(),
        _ => vec![Box::new(ErrorReport(err)) as Box<dyn MietteDiagnostic + '_>],
    }
}

/// Render a report as text, falling back to its message.
pub fn render(report: &dyn MietteDiagnostic) -> String {
    let mut text = String::new();
    match GraphicalReportHandler::new().render_report(&mut text, report) {
        Ok(()) => text,
        Err(_) => report.to_string(),
    }
}
