//! A0-schema CSV datasets.
//!
//! A dataset is a CSV file whose header row names at least the
//! [`REQUIRED_COLUMNS`]; every data row becomes one JSON-LD relation record.
//! [`convert_csv`] validates and converts uploaded datasets, and [`write_csv`]
//! writes relation records back out with the full [`A0_HEADER`].

use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use log::{debug, info, warn};
use serde_json::Value;

use crate::{
    Parsed,
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    jsonld::{DESCRIPTIVE_FIELDS, Document, Relation, dataset_context},
    span::Span,
};

/// Columns every dataset header row must contain.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "graph_id",
    "domain",
    "category",
    "entity_type",
    "subject",
    "predicate",
    "object",
];

/// Full column order of an A0 dataset.
pub const A0_HEADER: &[&str] = &[
    "graph_id",
    "domain",
    "category",
    "stage",
    "entity_type",
    "subject",
    "predicate",
    "object",
    "attribute",
    "value",
    "role",
    "action",
    "outcome",
    "challenge",
    "solution",
    "context",
    "source_location",
    "source_type",
    "component_name",
    "operation_name",
    "operation_description",
    "temporal_marker",
    "impact_description",
    "source_reference",
    "metadata_json",
];

const DEFAULT_ENTITY_TYPE: &str = "Component";

/// Returns the required columns absent from `headers`, in required order.
pub fn missing_columns(headers: &StringRecord) -> Vec<&'static str> {
    REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|column| !headers.iter().any(|header| header == *column))
        .collect()
}

/// Validate a CSV dataset and convert it into a JSON-LD [`Document`].
///
/// Each data row becomes a relation record:
/// - `id` is `graph_id`, or `custom:<row index>` when blank
/// - `type` is `entity_type`, or `Component` when blank
/// - `subject`, `predicate` and `object` are copied
/// - non-blank descriptive columns are copied
///
/// Rows with a blank subject are skipped with an `E300` warning.
///
/// # Errors
///
/// Returns a [`ParseError`] when a record cannot be decoded (`E200`), when
/// the file has no data rows (`E201`), or when required columns are missing
/// (`E202`, naming every missing column). No partial document is produced.
///
/// # Example
///
/// ```
/// # use knowflow_parser::dataset::convert_csv;
/// let source = "graph_id,domain,category,entity_type,subject,predicate,object\n\
///               sys:kg_001,Technology,Flow,Process,Markdown,transforms_to,CSV\n";
///
/// let document = convert_csv(source).unwrap().into_value();
/// assert_eq!(document.graph()[0].subject(), Some("Markdown"));
/// ```
pub fn convert_csv(source: &str) -> Result<Parsed<Document>, ParseError> {
    info!("Converting CSV dataset");
    let mut collector = DiagnosticCollector::new();

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(source.as_bytes());

    let headers = match reader.headers() {
        Ok(headers) => headers.clone(),
        Err(err) => return Err(record_error(source, &err).into()),
    };
    let header_span = Span::line_at(source, 0);

    let mut rows = Vec::new();
    let mut errors = Vec::new();
    for result in reader.records() {
        match result {
            Ok(record) => rows.push(record),
            Err(err) => errors.push(record_error(source, &err)),
        }
    }
    if !errors.is_empty() {
        return Err(errors.into());
    }

    if rows.is_empty() {
        return Err(Diagnostic::error("CSV file is empty or invalid")
            .with_code(ErrorCode::E201)
            .with_help("add at least one data row below the header row")
            .into());
    }

    let missing = missing_columns(&headers);
    if !missing.is_empty() {
        warn!(missing:? = missing; "CSV dataset is missing required columns");
        return Err(
            Diagnostic::error(format!("missing required columns: {}", missing.join(", ")))
                .with_code(ErrorCode::E202)
                .with_label(header_span, "header row")
                .with_help(format!("required columns are: {}", REQUIRED_COLUMNS.join(", ")))
                .into(),
        );
    }

    let mut relations = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        let column = |name: &str| {
            headers
                .iter()
                .position(|header| header == name)
                .and_then(|idx| row.get(idx))
                .unwrap_or("")
        };

        if column("subject").trim().is_empty() {
            let offset = row.position().map_or(0, |position| position.byte() as usize);
            warn!(row = index; "Skipping CSV row with an empty subject");
            collector.emit(
                Diagnostic::warning(format!("row {index} has an empty subject and was skipped"))
                    .with_code(ErrorCode::E300)
                    .with_label(Span::line_at(source, offset), "this row")
                    .with_secondary_label(header_span, "header row"),
            );
            continue;
        }

        let id = match column("graph_id") {
            "" => format!("custom:{index}"),
            graph_id => graph_id.to_string(),
        };
        let entity_type = match column("entity_type") {
            "" => DEFAULT_ENTITY_TYPE,
            entity_type => entity_type,
        };

        let mut relation = Relation::new(column("subject"), column("predicate"), column("object"))
            .with_id(id)
            .with_type(entity_type);
        for field in DESCRIPTIVE_FIELDS.iter().copied() {
            let value = column(field);
            if !value.trim().is_empty() {
                relation = relation.with_field(field, value);
            }
        }
        relations.push(relation);
    }

    let warnings = collector.finish()?;
    debug!(rows = rows.len(), relations = relations.len(); "CSV dataset converted");

    Ok(Parsed::new(
        Document::new(dataset_context(), relations),
        warnings,
    ))
}

/// Write relation records as an A0 CSV dataset with the full header.
///
/// `id` and `type` fill the `graph_id` and `entity_type` columns; descriptive
/// fields fill their columns and anything else is dropped.
///
/// # Errors
///
/// Returns an `E203` [`ParseError`] if the CSV writer fails.
pub fn write_csv(relations: &[Relation]) -> Result<String, ParseError> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());

    writer.write_record(A0_HEADER).map_err(write_error)?;
    for relation in relations {
        let row: Vec<String> = A0_HEADER
            .iter()
            .map(|column| match *column {
                "graph_id" => relation.id().unwrap_or_default().to_string(),
                "entity_type" => relation.entity_type().unwrap_or_default().to_string(),
                "subject" => relation.subject().unwrap_or_default().to_string(),
                "predicate" => relation.predicate().unwrap_or_default().to_string(),
                "object" => relation.object().unwrap_or_default().to_string(),
                field => match relation.field(field) {
                    Some(Value::String(text)) => text.clone(),
                    Some(Value::Null) | None => String::new(),
                    Some(other) => other.to_string(),
                },
            })
            .collect();
        writer.write_record(&row).map_err(write_error)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| write_error(err.into_error()))?;
    String::from_utf8(bytes).map_err(write_error)
}

fn record_error(source: &str, err: &csv::Error) -> Diagnostic {
    let diagnostic = Diagnostic::error(format!("failed to parse CSV: {err}")).with_code(ErrorCode::E200);
    match err.position() {
        Some(position) => diagnostic.with_label(
            Span::line_at(source, position.byte() as usize),
            "while reading this record",
        ),
        None => diagnostic,
    }
}

fn write_error(err: impl std::fmt::Display) -> ParseError {
    Diagnostic::error(format!("failed to write CSV: {err}"))
        .with_code(ErrorCode::E203)
        .into()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const HEADER: &str = "graph_id,domain,category,entity_type,subject,predicate,object,stage";

    #[test]
    fn test_convert_rows() {
        let source = format!(
            "{HEADER}\n\
             sys:kg_001,Technology,Flow,Process,Markdown,transforms_to,CSV,Planning\n\
             ,Technology,Flow,,CSV,transforms_to,JSON-LD,\n"
        );

        let parsed = convert_csv(&source).unwrap();
        assert!(parsed.warnings().is_empty());

        let graph = parsed.value().graph();
        assert_eq!(graph.len(), 2);
        assert_eq!(graph[0].id(), Some("sys:kg_001"));
        assert_eq!(graph[0].field("stage"), Some(&json!("Planning")));
        assert_eq!(graph[1].id(), Some("custom:1"));
        assert_eq!(graph[1].entity_type(), Some("Component"));
        assert_eq!(graph[1].field("stage"), None);
        assert_eq!(graph[1].triple(), Some(("CSV", "transforms_to", "JSON-LD")));
    }

    #[test]
    fn test_missing_predicate_column_is_enumerated() {
        let source = "graph_id,domain,category,entity_type,subject,object\n\
                      sys:kg_001,Technology,Flow,Process,Markdown,CSV\n";

        let err = convert_csv(source).unwrap_err();
        let diag = &err.diagnostics()[0];

        assert_eq!(diag.code(), Some(ErrorCode::E202));
        assert_eq!(diag.message(), "missing required columns: predicate");
    }

    #[test]
    fn test_missing_columns_listed_in_required_order() {
        let headers = StringRecord::from(vec!["object", "subject", "domain"]);

        assert_eq!(
            missing_columns(&headers),
            vec!["graph_id", "category", "entity_type", "predicate"]
        );
    }

    #[test]
    fn test_header_whitespace_is_trimmed() {
        let source = " graph_id , domain,category,entity_type,subject,predicate,object\n\
                      a,b,c,d,S,p,O\n";

        assert!(convert_csv(source).is_ok());
    }

    #[test]
    fn test_empty_dataset_is_rejected() {
        let err = convert_csv(&format!("{HEADER}\n")).unwrap_err();
        assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E201));

        let err = convert_csv("").unwrap_err();
        assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E201));
    }

    #[test]
    fn test_empty_subject_row_is_skipped_with_warning() {
        let source = format!(
            "{HEADER}\n\
             sys:kg_001,Technology,Flow,Process,,uses,CSV,\n\
             sys:kg_002,Technology,Flow,Process,Engine,uses,CSV,\n"
        );

        let parsed = convert_csv(&source).unwrap();

        assert_eq!(parsed.value().graph().len(), 1);
        assert_eq!(parsed.warnings().len(), 1);
        let warning = &parsed.warnings()[0];
        assert_eq!(warning.code(), Some(ErrorCode::E300));
        assert!(warning.message().contains("row 0"));
        assert_eq!(warning.labels()[0].span().start(), HEADER.len() + 1);
    }

    #[test]
    fn test_short_rows_are_tolerated() {
        let source = format!("{HEADER}\nsys:kg_001,Technology,Flow,Process,Markdown\n");

        let parsed = convert_csv(&source).unwrap();
        let relation = &parsed.value().graph()[0];

        assert_eq!(relation.subject(), Some("Markdown"));
        assert_eq!(relation.predicate(), Some(""));
        assert_eq!(relation.triple(), None);
    }

    #[test]
    fn test_write_csv_uses_full_header() {
        let relations = vec![
            Relation::new("Markdown", "transforms_to", "CSV")
                .with_id("sys:kg_001")
                .with_type("Process")
                .with_field("metadata_json", "{}"),
        ];

        let text = write_csv(&relations).unwrap();
        let mut lines = text.lines();

        assert_eq!(lines.next(), Some(A0_HEADER.join(",").as_str()));
        let row = lines.next().unwrap();
        assert!(row.starts_with("sys:kg_001,,,,Process,Markdown,transforms_to,CSV,"));
        assert!(row.ends_with(",{}"));
    }

    #[test]
    fn test_written_csv_converts_back() {
        let relations = vec![
            Relation::new("A", "feeds_to", "B")
                .with_id("sys:kg_001")
                .with_type("Process")
                .with_field("domain", "Technology")
                .with_field("category", "Flow"),
        ];

        let text = write_csv(&relations).unwrap();
        let document = convert_csv(&text).unwrap().into_value();

        assert_eq!(document.graph(), relations.as_slice());
    }
}
