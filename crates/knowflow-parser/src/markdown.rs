//! Flow extraction from Markdown documentation.
//!
//! Flow chains are written inside fenced blocks with a `text` (or empty) info
//! string, one chain per line:
//!
//! ````markdown
//! ## Example Flow
//!
//! ```text
//! Markdown → CSV (A0 schema) → JSON-LD
//! JSON-LD -> RDF (rdflib)
//! ```
//! ````
//!
//! Every consecutive pair of a chain becomes a `transforms_to` relation.

use log::{debug, warn};

use crate::{
    Parsed,
    error::{Diagnostic, ErrorCode},
    jsonld::Relation,
};

const FLOW_PREDICATE: &str = "transforms_to";

/// Extract flow chains from a Markdown document into relation records.
///
/// Records are numbered `sys:kg_001`, `sys:kg_002`, ... in document order and
/// carry `source_location` set to `source_name`, suffixed with `#<heading>`
/// when the chain sits below a heading.
///
/// A document without any chain yields no records and an `E400` warning.
///
/// # Example
///
/// ```
/// # use knowflow_parser::markdown::extract_flows;
/// let source = "## Example Flow\n```text\nMarkdown → CSV → JSON-LD\n```\n";
///
/// let relations = extract_flows(source, "README.md").into_value();
/// assert_eq!(relations.len(), 2);
/// assert_eq!(relations[1].triple(), Some(("CSV", "transforms_to", "JSON-LD")));
/// ```
pub fn extract_flows(source: &str, source_name: &str) -> Parsed<Vec<Relation>> {
    let mut relations = Vec::new();
    let mut heading: Option<&str> = None;
    let mut fence: Option<bool> = None;

    for line in source.lines() {
        let trimmed = line.trim();

        if let Some(info) = trimmed.strip_prefix("```") {
            fence = match fence {
                Some(_) => None,
                None => Some(matches!(info.trim(), "" | "text")),
            };
            continue;
        }

        match fence {
            None => {
                if trimmed.starts_with('#') {
                    let title = trimmed.trim_start_matches('#').trim();
                    heading = (!title.is_empty()).then_some(title);
                }
            }
            Some(true) => {
                let steps = chain(trimmed);
                for pair in steps.windows(2) {
                    let seq = relations.len() + 1;
                    relations.push(flow_relation(seq, pair[0], pair[1], source_name, heading));
                }
            }
            Some(false) => {}
        }
    }

    let mut warnings = Vec::new();
    if relations.is_empty() {
        warn!(source_name; "No flow chains found in Markdown");
        warnings.push(
            Diagnostic::warning(format!("no flow chain found in `{source_name}`"))
                .with_code(ErrorCode::E400)
                .with_help("write chains such as `A → B → C` inside a ```text fenced block"),
        );
    }

    debug!(relations = relations.len(); "Markdown flows extracted");
    Parsed::new(relations, warnings)
}

fn chain(line: &str) -> Vec<&str> {
    if !line.contains('→') && !line.contains("->") {
        return Vec::new();
    }
    line.split('→')
        .flat_map(|part| part.split("->"))
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect()
}

fn flow_relation(
    seq: usize,
    subject: &str,
    object: &str,
    source_name: &str,
    heading: Option<&str>,
) -> Relation {
    let source_location = match heading {
        Some(heading) => format!("{source_name}#{heading}"),
        None => source_name.to_string(),
    };

    Relation::new(subject, FLOW_PREDICATE, object)
        .with_id(format!("sys:kg_{seq:03}"))
        .with_type("Process")
        .with_field("domain", "Technology")
        .with_field("category", "Flow")
        .with_field("stage", "Planning")
        .with_field("source_location", source_location)
        .with_field("source_type", "Documentation")
        .with_field("metadata_json", "{}")
}
