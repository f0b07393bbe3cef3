//! Configuration types for Knowflow diagrams.
//!
//! This module provides configuration structures that control how diagrams
//! are laid out, styled and persisted. All types implement
//! [`serde::Deserialize`] for loading from external sources.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining the sections below.
//! - [`LayoutConfig`] - Constants of the level layout.
//! - [`StyleConfig`] - Colors and node size used by the SVG renderer.
//! - [`DataConfig`] - Where documents are read from and written to.
//!
//! # Example
//!
//! ```
//! # use knowflow::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.layout().canvas_width(), 800.0);
//! assert!(config.style().background_color().is_ok());
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use knowflow_core::{color::Color, semantic::EdgeCategory, semantic::NodeCategory};
use knowflow_parser::IngestConfig;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Layout section.
    #[serde(default)]
    layout: LayoutConfig,

    /// Style section.
    #[serde(default)]
    style: StyleConfig,

    /// Data section.
    #[serde(default)]
    data: DataConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(layout: LayoutConfig, style: StyleConfig, data: DataConfig) -> Self {
        Self {
            layout,
            style,
            data,
        }
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the style configuration.
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    /// Returns the data configuration.
    pub fn data(&self) -> &DataConfig {
        &self.data
    }
}

/// Constants of the level layout.
///
/// Nodes on level `l` sit at `y = top_margin + l * level_height`. A level of
/// `n` nodes is spread with `spacing = max(min_spacing, canvas_width / n)`
/// and centered on the canvas, starting no further left than `left_margin`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    canvas_width: f32,
    min_spacing: f32,
    level_height: f32,
    top_margin: f32,
    left_margin: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            canvas_width: 800.0,
            min_spacing: 200.0,
            level_height: 120.0,
            top_margin: 50.0,
            left_margin: 50.0,
        }
    }
}

impl LayoutConfig {
    pub fn canvas_width(&self) -> f32 {
        self.canvas_width
    }

    pub fn min_spacing(&self) -> f32 {
        self.min_spacing
    }

    pub fn level_height(&self) -> f32 {
        self.level_height
    }

    pub fn top_margin(&self) -> f32 {
        self.top_margin
    }

    pub fn left_margin(&self) -> f32 {
        self.left_margin
    }
}

/// Visual styling of rendered diagrams.
///
/// Colors are CSS color strings. Unset fields fall back to the built-in
/// palette.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    background_color: Option<String>,
    node_width: f32,
    node_height: f32,
    text_color: String,
    selection_color: String,
    input_fill: String,
    input_stroke: String,
    output_fill: String,
    output_stroke: String,
    decision_fill: String,
    decision_stroke: String,
    process_fill: String,
    process_stroke: String,
    edge_color: String,
    conditional_edge_color: String,
    loop_edge_color: String,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            background_color: None,
            node_width: 120.0,
            node_height: 40.0,
            text_color: "#1f2937".to_string(),
            selection_color: "#1d4ed8".to_string(),
            input_fill: "#dbeafe".to_string(),
            input_stroke: "#3b82f6".to_string(),
            output_fill: "#dcfce7".to_string(),
            output_stroke: "#10b981".to_string(),
            decision_fill: "#fef3c7".to_string(),
            decision_stroke: "#f59e0b".to_string(),
            process_fill: "#f3f4f6".to_string(),
            process_stroke: "#6b7280".to_string(),
            edge_color: "#6b7280".to_string(),
            conditional_edge_color: "#f59e0b".to_string(),
            loop_edge_color: "#ef4444".to_string(),
        }
    }
}

impl StyleConfig {
    /// Returns the parsed background [`Color`], or `None` if no color is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed.
    pub fn background_color(&self) -> Result<Option<Color>, String> {
        self.background_color
            .as_deref()
            .map(|color| parse_color("background_color", color))
            .transpose()
    }

    pub fn node_width(&self) -> f32 {
        self.node_width
    }

    pub fn node_height(&self) -> f32 {
        self.node_height
    }

    /// Returns the label color.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed.
    pub fn text_color(&self) -> Result<Color, String> {
        parse_color("text_color", &self.text_color)
    }

    /// Returns the outline color of the selected node.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed.
    pub fn selection_color(&self) -> Result<Color, String> {
        parse_color("selection_color", &self.selection_color)
    }

    /// Returns the fill and stroke colors of a node category.
    ///
    /// # Errors
    ///
    /// Returns an error if either configured color string cannot be parsed.
    pub fn node_colors(&self, category: NodeCategory) -> Result<(Color, Color), String> {
        let (fill, stroke) = match category {
            NodeCategory::Input => (&self.input_fill, &self.input_stroke),
            NodeCategory::Output => (&self.output_fill, &self.output_stroke),
            NodeCategory::Decision => (&self.decision_fill, &self.decision_stroke),
            NodeCategory::Process => (&self.process_fill, &self.process_stroke),
        };
        Ok((parse_color("fill", fill)?, parse_color("stroke", stroke)?))
    }

    /// Returns the stroke color of an edge category.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed.
    pub fn edge_color(&self, category: EdgeCategory) -> Result<Color, String> {
        match category {
            EdgeCategory::Default => parse_color("edge_color", &self.edge_color),
            EdgeCategory::Conditional => {
                parse_color("conditional_edge_color", &self.conditional_edge_color)
            }
            EdgeCategory::Loop => parse_color("loop_edge_color", &self.loop_edge_color),
        }
    }
}

fn parse_color(field: &str, color: &str) -> Result<Color, String> {
    Color::new(color).map_err(|err| format!("Invalid {field} in config: {err}"))
}

/// Locations of the input document, the output sink and diagram metadata.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Well-known JSON-LD document loaded when no dataset is stored.
    input: PathBuf,

    /// Directory under which `data/outputs/<output_file>` is written.
    output_root: PathBuf,

    /// File name of saved documents.
    output_file: String,

    /// Directory used when the output directory cannot be written.
    fallback_dir: Option<PathBuf>,

    /// File holding the most recently uploaded dataset.
    store: Option<PathBuf>,

    /// Metadata stamped onto ingested diagrams.
    diagram: IngestConfig,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("data/outputs/a0.jsonld"),
            output_root: PathBuf::from("."),
            output_file: "a0.jsonld".to_string(),
            fallback_dir: None,
            store: None,
            diagram: IngestConfig::default(),
        }
    }
}

impl DataConfig {
    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    pub fn output_file(&self) -> &str {
        &self.output_file
    }

    pub fn fallback_dir(&self) -> Option<&Path> {
        self.fallback_dir.as_deref()
    }

    pub fn store(&self) -> Option<&Path> {
        self.store.as_deref()
    }

    pub fn diagram(&self) -> &IngestConfig {
        &self.diagram
    }

    /// Set the well-known input document.
    pub fn with_input(mut self, input: impl Into<PathBuf>) -> Self {
        self.input = input.into();
        self
    }

    /// Set the directory saved documents are written under.
    pub fn with_output_root(mut self, output_root: impl Into<PathBuf>) -> Self {
        self.output_root = output_root.into();
        self
    }

    /// Set the fallback directory.
    pub fn with_fallback_dir(mut self, fallback_dir: impl Into<PathBuf>) -> Self {
        self.fallback_dir = Some(fallback_dir.into());
        self
    }

    /// Set the dataset store file.
    pub fn with_store(mut self, store: impl Into<PathBuf>) -> Self {
        self.store = Some(store.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_defaults() {
        let layout = LayoutConfig::default();

        assert_eq!(layout.canvas_width(), 800.0);
        assert_eq!(layout.min_spacing(), 200.0);
        assert_eq!(layout.level_height(), 120.0);
        assert_eq!(layout.top_margin(), 50.0);
        assert_eq!(layout.left_margin(), 50.0);
    }

    #[test]
    fn test_style_palette_parses() {
        let style = StyleConfig::default();

        assert_eq!(style.background_color(), Ok(None));
        for category in [
            NodeCategory::Input,
            NodeCategory::Output,
            NodeCategory::Decision,
            NodeCategory::Process,
        ] {
            assert!(style.node_colors(category).is_ok());
        }
        assert!(style.edge_color(EdgeCategory::Loop).is_ok());
        assert!(style.text_color().is_ok());
    }

    #[test]
    fn test_invalid_color_names_field() {
        let style = StyleConfig {
            loop_edge_color: "not-a-color".to_string(),
            ..StyleConfig::default()
        };

        let err = style.edge_color(EdgeCategory::Loop).unwrap_err();
        assert!(err.contains("loop_edge_color"));
    }

    #[test]
    fn test_data_defaults() {
        let data = DataConfig::default();

        assert_eq!(data.input(), Path::new("data/outputs/a0.jsonld"));
        assert_eq!(data.output_file(), "a0.jsonld");
        assert!(data.fallback_dir().is_none());
        assert_eq!(data.diagram().id, "readme-flow");
    }
}
