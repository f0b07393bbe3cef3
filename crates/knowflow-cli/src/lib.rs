//! Knowflow CLI library
//!
//! This module contains the core CLI logic for the Knowflow diagram tool.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, Command};

use std::{fs, path::Path};

use log::{info, warn};

use knowflow::{
    DiagramBuilder, KnowflowError, Parsed,
    config::AppConfig,
    diagnostics::Diagnostic,
    identifier::NodeId,
    loader::LoadSource,
    session::Session,
    store::{DatasetStore, FileStore, MemoryStore},
};

use error_adapter::InputReport;

/// Run the Knowflow CLI application
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `KnowflowError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Invalid JSON-LD, CSV or Markdown input
/// - Dataset store errors
/// - Rendering errors
pub fn run(args: &Args) -> Result<(), KnowflowError> {
    let app_config = config::load_config(args.config.as_ref())?;

    match &args.command {
        Command::Render {
            input,
            output,
            select,
            layout,
        } => {
            let mut session = match input {
                Some(input) => {
                    info!(input_path = input, output_path = output; "Rendering diagram");
                    let source = fs::read_to_string(input)?;
                    let builder = DiagramBuilder::new(app_config.clone());
                    let diagram = into_reported(builder.parse(&source)?, &source);
                    Session::new(
                        diagram,
                        LoadSource::File(input.into()),
                        Box::new(MemoryStore::new()),
                        app_config,
                    )
                }
                None => {
                    info!(output_path = output; "Rendering loaded diagram");
                    Session::open(open_store(&app_config)?, app_config)
                }
            };

            session.set_layout_kind(*layout);
            if let Some(id) = select {
                session.select_node(Some(&NodeId::new(id.as_str())))?;
            }

            fs::write(output, session.render_svg()?)?;
            info!(output_file = output, source:? = session.source(); "SVG exported successfully");
        }
        Command::Export { input, output } => {
            info!(input_path = input; "Exporting diagram");
            let source = fs::read_to_string(input)?;
            let builder = DiagramBuilder::new(app_config);
            let diagram = into_reported(builder.parse(&source)?, &source);

            match output {
                Some(output) => {
                    fs::write(output, builder.render_jsonld(&diagram)?)?;
                    info!(output_file = output; "JSON-LD exported successfully");
                }
                None => {
                    let outcome = builder.save(&diagram)?;
                    info!(output_file = outcome.path().display().to_string(); "JSON-LD saved");
                }
            }
        }
        Command::Convert { input, output } => {
            info!(input_path = input, output_path = output; "Converting CSV dataset");
            let source = fs::read_to_string(input)?;
            let builder = DiagramBuilder::new(app_config);
            let document = into_reported(builder.convert_csv(&source)?, &source);

            write_document(output, &document.to_json_string())?;
            info!(output_file = output, records = document.graph().len(); "CSV converted");
        }
        Command::Extract { input, output } => {
            info!(input_path = input, output_path = output; "Extracting Markdown flows");
            let source = fs::read_to_string(input)?;
            let source_name = Path::new(input)
                .file_name()
                .map_or_else(|| input.clone(), |name| name.to_string_lossy().into_owned());
            let builder = DiagramBuilder::new(app_config);
            let parsed = builder.extract_markdown(&source, &source_name);
            let document = into_reported(parsed, &source);

            write_document(output, &document.to_json_string())?;
            info!(
                output_file = output, records = document.graph().len();
                "Markdown flows extracted"
            );
        }
        Command::Upload { input } => {
            info!(input_path = input; "Uploading CSV dataset");
            let source = fs::read_to_string(input)?;
            let mut session = Session::open(open_store(&app_config)?, app_config);
            let warnings = session.upload_csv(&source)?;
            report_warnings(&warnings, &source);
            info!(
                nodes = session.diagram().nodes().len(), status:? = session.status();
                "Dataset stored"
            );
        }
        Command::Clear => {
            open_store(&app_config)?.clear()?;
            info!("Stored dataset removed");
        }
    }

    Ok(())
}

fn open_store(config: &AppConfig) -> Result<Box<dyn DatasetStore>, KnowflowError> {
    let store = FileStore::from_config(config.data()).ok_or_else(|| {
        KnowflowError::Store("could not determine a data directory for the dataset".to_string())
    })?;
    Ok(Box::new(store))
}

fn write_document(output: &str, content: &str) -> Result<(), KnowflowError> {
    if let Some(parent) = Path::new(output).parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(output, content)?;
    Ok(())
}

fn into_reported<T>(parsed: Parsed<T>, source: &str) -> T {
    let (value, warnings) = parsed.into_parts();
    report_warnings(&warnings, source);
    value
}

/// Log each warning rendered as a miette report.
fn report_warnings(warnings: &[Diagnostic], source: &str) {
    for warning in warnings {
        let report = error_adapter::render(&InputReport::new(warning, source));
        warn!("{report}");
    }
}
