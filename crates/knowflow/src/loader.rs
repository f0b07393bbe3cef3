//! Loading diagrams at startup and saving them back to disk.
//!
//! Loading never fails: the stored dataset is tried first, then the
//! well-known input document, and finally the built-in sample diagram.
//! Saving writes to `<output_root>/data/outputs/<file>` and falls back to a
//! download location when that directory cannot be written.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use directories::UserDirs;
use log::{info, warn};

use knowflow_core::{
    geometry::Point,
    identifier::{EdgeId, NodeId},
    semantic::{Diagram, Edge, EdgeCategory, Node, NodeCategory},
};
use knowflow_parser::{IngestConfig, error::Diagnostic, jsonld::Document};

use crate::{
    config::AppConfig,
    error::KnowflowError,
    layout::{Engine, LevelEngine},
    store::DatasetStore,
};

/// Where a loaded diagram came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadSource {
    /// The most recent upload held by the dataset store.
    Store,
    /// The well-known input document.
    File(PathBuf),
    /// The built-in sample diagram.
    Sample,
}

/// A diagram ready for display.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub diagram: Diagram,
    pub source: LoadSource,
    pub warnings: Vec<Diagnostic>,
}

/// Where a saved document ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Written to the configured output directory.
    Written(PathBuf),
    /// The output directory could not be written; saved to the fallback location.
    Fallback(PathBuf),
}

impl SaveOutcome {
    pub fn path(&self) -> &Path {
        match self {
            Self::Written(path) | Self::Fallback(path) => path,
        }
    }
}

/// Parse JSON-LD text into a laid out diagram.
///
/// # Errors
///
/// Returns [`KnowflowError::Parse`] if `source` is not valid JSON.
pub fn diagram_from_jsonld(
    source: &str,
    ingest: &IngestConfig,
    engine: &impl Engine,
) -> Result<(Diagram, Vec<Diagnostic>), KnowflowError> {
    let (mut diagram, warnings) = knowflow_parser::parse(source, ingest)
        .map_err(|err| KnowflowError::new_parse_error(err, source))?
        .into_parts();
    engine.calculate(&diagram).apply(&mut diagram);
    Ok((diagram, warnings))
}

/// Load the diagram to display.
///
/// Tries the stored dataset, then the configured input document, then falls
/// back to [`sample_diagram`]. Every failure along the way is logged at warn
/// level and the next source is tried.
pub fn load(store: &dyn DatasetStore, config: &AppConfig) -> Loaded {
    let engine = LevelEngine::new(config.layout().clone());
    let ingest = config.data().diagram();

    match store.load() {
        Ok(Some(blob)) => match diagram_from_jsonld(&blob, ingest, &engine) {
            Ok((diagram, warnings)) => {
                info!(nodes = diagram.nodes().len(); "Loaded stored dataset");
                return Loaded {
                    diagram,
                    source: LoadSource::Store,
                    warnings,
                };
            }
            Err(err) => warn!(err:% = err; "Stored dataset unusable, trying input document"),
        },
        Ok(None) => {}
        Err(err) => warn!(err:% = err; "Dataset store unavailable, trying input document"),
    }

    let input = config.data().input();
    match fs::read_to_string(input) {
        Ok(source) => match diagram_from_jsonld(&source, ingest, &engine) {
            Ok((diagram, warnings)) => {
                info!(
                    path = input.display().to_string(), nodes = diagram.nodes().len();
                    "Loaded input document"
                );
                return Loaded {
                    diagram,
                    source: LoadSource::File(input.to_path_buf()),
                    warnings,
                };
            }
            Err(err) => warn!(err:% = err; "Input document unusable, falling back to sample data"),
        },
        Err(err) => warn!(
            path = input.display().to_string(), err:% = err;
            "Could not read input document, falling back to sample data"
        ),
    }

    Loaded {
        diagram: sample_diagram(),
        source: LoadSource::Sample,
        warnings: Vec::new(),
    }
}

/// The built-in README example flow: ten nodes in three rows and nine edges.
pub fn sample_diagram() -> Diagram {
    const NODES: &[(&str, &str, NodeCategory, f32, f32)] = &[
        ("markdown", "Markdown", NodeCategory::Input, 50.0, 50.0),
        ("csv", "CSV (A0 schema)", NodeCategory::Process, 250.0, 50.0),
        ("jsonld", "JSON-LD", NodeCategory::Process, 450.0, 50.0),
        ("rdf", "RDF (rdflib)", NodeCategory::Process, 650.0, 50.0),
        ("sparql", "SPARQL queries", NodeCategory::Process, 150.0, 170.0),
        ("eda", "EDA (pandas/NumPy)", NodeCategory::Process, 350.0, 170.0),
        ("mlp", "MLP (scikit-learn/PyTorch)", NodeCategory::Process, 550.0, 170.0),
        ("engine", "Curriculum Engine", NodeCategory::Process, 250.0, 290.0),
        ("d3", "D3.js", NodeCategory::Output, 450.0, 290.0),
        ("cytoscape", "Cytoscape.js", NodeCategory::Output, 650.0, 290.0),
    ];
    const EDGES: &[(&str, &str, &str, &str)] = &[
        ("e1", "markdown", "csv", "transforms_to"),
        ("e2", "csv", "jsonld", "transforms_to"),
        ("e3", "jsonld", "rdf", "transforms_to"),
        ("e4", "rdf", "sparql", "extracts"),
        ("e5", "sparql", "eda", "feeds_to"),
        ("e6", "eda", "mlp", "feeds_to"),
        ("e7", "mlp", "engine", "feeds_to"),
        ("e8", "engine", "d3", "generates"),
        ("e9", "engine", "cytoscape", "generates"),
    ];

    let mut diagram = Diagram::new(
        "sample-readme-flow",
        "README Example Flow (Sample)",
        "Sample flow diagram from README.md Example Flow",
    );
    for (id, label, category, x, y) in NODES {
        diagram.push_node(
            Node::new(NodeId::new(*id), *label, *category).with_position(Point::new(*x, *y)),
        );
    }
    for (id, source, target, label) in EDGES {
        diagram.push_edge(Edge::new(
            EdgeId::new(*id),
            NodeId::new(*source),
            NodeId::new(*target),
            Some(label.to_string()),
            EdgeCategory::Default,
        ));
    }
    diagram
}

/// Directory used when the output directory cannot be written.
///
/// The configured fallback directory wins; otherwise the user's download
/// directory, and as a last resort the system temporary directory.
pub fn fallback_dir(config: &AppConfig) -> PathBuf {
    config
        .data()
        .fallback_dir()
        .map(Path::to_path_buf)
        .or_else(|| UserDirs::new().and_then(|dirs| dirs.download_dir().map(Path::to_path_buf)))
        .unwrap_or_else(env::temp_dir)
}

/// Write a JSON-LD document to the output directory, or to the fallback
/// location when that fails.
///
/// # Errors
///
/// Returns [`KnowflowError::Io`] only when the fallback write fails too.
pub fn save(document: &Document, config: &AppConfig) -> Result<SaveOutcome, KnowflowError> {
    let content = document.to_json_string();
    let file_name = config.data().output_file();
    let output_dir = config.data().output_root().join("data").join("outputs");
    let target = output_dir.join(file_name);

    match fs::create_dir_all(&output_dir).and_then(|()| fs::write(&target, &content)) {
        Ok(()) => {
            info!(path = target.display().to_string(); "Saved JSON-LD document");
            Ok(SaveOutcome::Written(target))
        }
        Err(err) => {
            warn!(
                path = target.display().to_string(), err:% = err;
                "Could not write output directory, falling back to download location"
            );
            let fallback_dir = fallback_dir(config);
            fs::create_dir_all(&fallback_dir)?;
            let fallback = fallback_dir.join(file_name);
            fs::write(&fallback, &content)?;
            info!(
                path = fallback.display().to_string();
                "Saved JSON-LD document to fallback location"
            );
            Ok(SaveOutcome::Fallback(fallback))
        }
    }
}
