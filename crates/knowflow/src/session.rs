//! An editing session over one diagram.
//!
//! The session owns the displayed diagram together with the user state
//! around it: the selected node, whether dragging is enabled, and the status
//! of the last upload or save. Operations take `&mut self`, so at most one
//! upload or save runs at a time and no caller can observe one in flight.

use log::{debug, info, warn};

use knowflow_core::{
    geometry::Point,
    identifier::NodeId,
    semantic::{Diagram, LayoutKind, Node},
};
use knowflow_parser::{dataset, error::Diagnostic};

use crate::{
    config::AppConfig,
    error::KnowflowError,
    export::{Renderer, jsonld, svg::SvgRenderer},
    layout::{Engine, LevelEngine},
    loader::{self, LoadSource, SaveOutcome},
    store::DatasetStore,
};

/// Status of the most recent upload or save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum OperationStatus {
    /// Nothing has run yet.
    #[default]
    Idle,
    /// The last operation finished with the given message.
    Succeeded(String),
    /// The last operation failed with the given message; it may be retried.
    Failed(String),
}

impl OperationStatus {
    /// Returns `true` if the last operation failed and may be retried.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// An editing session.
pub struct Session {
    config: AppConfig,
    store: Box<dyn DatasetStore>,
    diagram: Diagram,
    source: LoadSource,
    selected: Option<NodeId>,
    editable: bool,
    status: OperationStatus,
}

impl Session {
    /// Open a session on the diagram [`loader::load`] picks.
    pub fn open(store: Box<dyn DatasetStore>, config: AppConfig) -> Self {
        let loaded = loader::load(store.as_ref(), &config);
        for warning in &loaded.warnings {
            warn!(warning:% = warning; "Diagram loaded with warning");
        }
        Self::new(loaded.diagram, loaded.source, store, config)
    }

    /// Create a session on an already loaded diagram.
    pub fn new(
        diagram: Diagram,
        source: LoadSource,
        store: Box<dyn DatasetStore>,
        config: AppConfig,
    ) -> Self {
        Self {
            config,
            store,
            diagram,
            source,
            selected: None,
            editable: false,
            status: OperationStatus::Idle,
        }
    }

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    /// Where the current diagram was loaded from.
    pub fn source(&self) -> &LoadSource {
        &self.source
    }

    pub fn selected(&self) -> Option<&NodeId> {
        self.selected.as_ref()
    }

    pub fn status(&self) -> &OperationStatus {
        &self.status
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    /// Enable or disable moving nodes.
    pub fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
    }

    /// Switch the presentation mode.
    pub fn set_layout_kind(&mut self, layout_kind: LayoutKind) {
        self.diagram.set_layout_kind(layout_kind);
    }

    /// Select a node, or clear the selection with `None`.
    ///
    /// # Errors
    ///
    /// Returns [`KnowflowError::Edit`] if the node does not exist.
    pub fn select_node(&mut self, id: Option<&NodeId>) -> Result<(), KnowflowError> {
        match id {
            Some(id) if self.diagram.node(id).is_none() => Err(unknown_node(id)),
            _ => {
                self.selected = id.cloned();
                Ok(())
            }
        }
    }

    /// Move a node to a new position.
    ///
    /// # Errors
    ///
    /// Returns [`KnowflowError::Edit`] if editing is disabled or the node
    /// does not exist.
    pub fn move_node(&mut self, id: &NodeId, position: Point) -> Result<(), KnowflowError> {
        if !self.editable {
            return Err(KnowflowError::Edit("editing is disabled".to_string()));
        }
        self.node_mut(id)?.set_position(position);
        debug!(id = id.as_str(), x = position.x(), y = position.y(); "Node moved");
        Ok(())
    }

    /// Change the label of a node; its id is kept.
    ///
    /// Relabeling works whether or not dragging is enabled. Labels must not
    /// be blank, since serialized records need a subject and object.
    ///
    /// # Errors
    ///
    /// Returns [`KnowflowError::Edit`] if the label is blank or the node
    /// does not exist.
    pub fn relabel_node(&mut self, id: &NodeId, label: &str) -> Result<(), KnowflowError> {
        if label.trim().is_empty() {
            return Err(KnowflowError::Edit(format!("blank label for node `{id}`")));
        }
        self.node_mut(id)?.set_label(label);
        debug!(id = id.as_str(), label; "Node relabeled");
        Ok(())
    }

    /// Recompute the level layout, discarding manual moves.
    pub fn relayout(&mut self) {
        LevelEngine::new(self.config.layout().clone())
            .calculate(&self.diagram)
            .apply(&mut self.diagram);
    }

    /// Replace the diagram with an uploaded A0 CSV dataset.
    ///
    /// The converted JSON-LD replaces the stored dataset and the diagram is
    /// rebuilt from it. On failure the current diagram is kept and the
    /// status carries the error message.
    ///
    /// # Errors
    ///
    /// Returns [`KnowflowError::Parse`] if the CSV is rejected, or
    /// [`KnowflowError::Store`] if the dataset cannot be stored.
    pub fn upload_csv(&mut self, source: &str) -> Result<Vec<Diagnostic>, KnowflowError> {
        let result = self.try_upload(source);
        self.status = match &result {
            Ok(_) => OperationStatus::Succeeded("CSV processed successfully".to_string()),
            Err(err) => OperationStatus::Failed(err.to_string()),
        };
        result
    }

    fn try_upload(&mut self, source: &str) -> Result<Vec<Diagnostic>, KnowflowError> {
        info!(bytes = source.len(); "Processing CSV upload");
        let (document, mut warnings) = dataset::convert_csv(source)
            .map_err(|err| KnowflowError::new_parse_error(err, source))?
            .into_parts();

        let blob = document.to_json_string();
        let engine = LevelEngine::new(self.config.layout().clone());
        let (diagram, ingest_warnings) =
            loader::diagram_from_jsonld(&blob, self.config.data().diagram(), &engine)?;
        self.store.save(&blob)?;

        warnings.extend(ingest_warnings);
        self.diagram = diagram;
        self.source = LoadSource::Store;
        self.selected = None;
        Ok(warnings)
    }

    /// Serialize the diagram to JSON-LD and write it out.
    ///
    /// # Errors
    ///
    /// Returns [`KnowflowError::Io`] if neither the output directory nor the
    /// fallback location can be written.
    pub fn save(&mut self) -> Result<SaveOutcome, KnowflowError> {
        let result = loader::save(&jsonld::to_document(&self.diagram), &self.config);
        self.status = match &result {
            Ok(SaveOutcome::Written(path)) => {
                OperationStatus::Succeeded(format!("Saved to {}", path.display()))
            }
            Ok(SaveOutcome::Fallback(path)) => {
                OperationStatus::Succeeded(format!("Downloaded to {}", path.display()))
            }
            Err(err) => OperationStatus::Failed(err.to_string()),
        };
        result
    }

    /// Render the diagram as SVG, highlighting the selected node.
    ///
    /// # Errors
    ///
    /// Returns [`KnowflowError::Export`] if the style configuration is invalid.
    pub fn render_svg(&self) -> Result<String, KnowflowError> {
        let svg = SvgRenderer::new(self.config.style().clone())
            .with_selection(self.selected.clone())
            .render(&self.diagram)?;
        Ok(svg)
    }

    fn node_mut(&mut self, id: &NodeId) -> Result<&mut Node, KnowflowError> {
        self.diagram.node_mut(id).ok_or_else(|| unknown_node(id))
    }
}

fn unknown_node(id: &NodeId) -> KnowflowError {
    KnowflowError::Edit(format!("unknown node `{id}`"))
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;
    use crate::{config::DataConfig, store::MemoryStore};

    const CSV: &str = "graph_id,domain,category,entity_type,subject,predicate,object\n\
                       sys:kg_001,Technology,Flow,Process,Markdown,transforms_to,CSV\n\
                       sys:kg_002,Technology,Flow,Process,CSV,transforms_to,JSON-LD\n";

    fn session() -> Session {
        Session::new(
            loader::sample_diagram(),
            LoadSource::Sample,
            Box::new(MemoryStore::new()),
            AppConfig::default(),
        )
    }

    #[test]
    fn test_select_node() {
        let mut session = session();

        session.select_node(Some(&NodeId::new("engine"))).unwrap();
        assert_eq!(session.selected(), Some(&NodeId::new("engine")));

        assert!(session.select_node(Some(&NodeId::new("ghost"))).is_err());
        assert_eq!(session.selected(), Some(&NodeId::new("engine")));

        session.select_node(None).unwrap();
        assert_eq!(session.selected(), None);
    }

    #[test]
    fn test_move_requires_editing_mode() {
        let mut session = session();
        let id = NodeId::new("engine");

        assert!(matches!(
            session.move_node(&id, Point::new(1.0, 2.0)),
            Err(KnowflowError::Edit(_))
        ));

        session.set_editable(true);
        session.move_node(&id, Point::new(1.0, 2.0)).unwrap();

        let node = session.diagram().node(&id).unwrap();
        assert_approx_eq!(f32, node.position().x(), 1.0);
        assert_approx_eq!(f32, node.position().y(), 2.0);
    }

    #[test]
    fn test_relabel_without_editing_mode() {
        let mut session = session();
        let id = NodeId::new("engine");
        assert!(!session.is_editable());

        session.relabel_node(&id, "Engine v2").unwrap();

        let node = session.diagram().node(&id).unwrap();
        assert_eq!(node.label(), "Engine v2");
        assert_eq!(node.id(), &id);

        assert!(matches!(
            session.relabel_node(&NodeId::new("ghost"), "Ghost"),
            Err(KnowflowError::Edit(_))
        ));
    }

    #[test]
    fn test_blank_label_is_rejected() {
        let mut session = session();
        let id = NodeId::new("engine");
        let before = jsonld::to_document(session.diagram()).to_json_string();

        for label in ["", "   ", "\t\n"] {
            assert!(matches!(
                session.relabel_node(&id, label),
                Err(KnowflowError::Edit(_))
            ));
        }

        assert_eq!(session.diagram().node(&id).unwrap().label(), "Curriculum Engine");
        assert_eq!(jsonld::to_document(session.diagram()).to_json_string(), before);
    }

    #[test]
    fn test_relabel_survives_round_trip() {
        let mut session = session();
        session.relabel_node(&NodeId::new("engine"), "Engine v2").unwrap();
        let edges = session.diagram().edges().len();

        let blob = jsonld::to_document(session.diagram()).to_json_string();
        let engine = LevelEngine::new(session.config.layout().clone());
        let (diagram, warnings) =
            loader::diagram_from_jsonld(&blob, session.config.data().diagram(), &engine).unwrap();

        assert!(warnings.is_empty());
        assert_eq!(diagram.edges().len(), edges);
        assert!(diagram.nodes().iter().any(|node| node.label() == "Engine v2"));
    }

    #[test]
    fn test_upload_replaces_diagram_and_store() {
        let mut session = session();

        let warnings = session.upload_csv(CSV).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(
            session.status(),
            &OperationStatus::Succeeded("CSV processed successfully".to_string())
        );
        assert_eq!(session.source(), &LoadSource::Store);
        assert_eq!(session.diagram().nodes().len(), 3);
        assert!(session.store.load().unwrap().is_some());
    }

    #[test]
    fn test_failed_upload_keeps_diagram() {
        let mut session = session();

        let err = session.upload_csv("graph_id,subject\nx,A\n").unwrap_err();
        assert!(matches!(err, KnowflowError::Parse { .. }));
        assert!(matches!(
            session.status(),
            OperationStatus::Failed(msg) if msg.contains("predicate")
        ));
        assert!(session.status().is_failed());
        assert_eq!(session.diagram().id(), "sample-readme-flow");
        assert!(session.store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_reports_location() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::new(
            Default::default(),
            Default::default(),
            DataConfig::default().with_output_root(dir.path()),
        );
        let mut session = Session::new(
            loader::sample_diagram(),
            LoadSource::Sample,
            Box::new(MemoryStore::new()),
            config,
        );

        let outcome = session.save().unwrap();
        assert!(matches!(outcome, SaveOutcome::Written(_)));
        assert!(matches!(session.status(), OperationStatus::Succeeded(_)));
        assert!(!session.status().is_failed());
    }

    #[test]
    fn test_relayout_and_render() {
        let mut session = session();
        session.relayout();

        // markdown is the only root.
        let markdown = session.diagram().node(&NodeId::new("markdown")).unwrap();
        assert_approx_eq!(f32, markdown.position().y(), 50.0);

        session.select_node(Some(&NodeId::new("d3"))).unwrap();
        let svg = session.render_svg().unwrap();
        assert!(svg.contains("Cytoscape.js"));
    }
}
