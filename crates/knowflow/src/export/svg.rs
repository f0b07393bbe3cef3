//! SVG rendering of positioned diagrams.
//!
//! Node positions are treated as node centers. Edges are straight lines
//! clipped to the node outlines, with a per-category arrow marker and the
//! predicate written at the midpoint.

use log::{debug, info};
use svg::{self, node::Text as SvgText, node::element as svg_element};

use knowflow_core::{
    color::Color,
    geometry::{Bounds, Point, Size},
    identifier::NodeId,
    semantic::{Diagram, Edge, EdgeCategory, Node},
};

use super::{Error, Renderer};
use crate::config::StyleConfig;

const MARGIN: f32 = 40.0;
const FONT_FAMILY: &str = "sans-serif";
const FONT_SIZE: f32 = 12.0;
const EDGE_CATEGORIES: [EdgeCategory; 3] = [
    EdgeCategory::Default,
    EdgeCategory::Conditional,
    EdgeCategory::Loop,
];

/// Renders a diagram as an SVG document.
///
/// # Examples
///
/// ```
/// use knowflow::{
///     config::StyleConfig,
///     export::{Renderer, svg::SvgRenderer},
///     semantic::Diagram,
/// };
///
/// let svg = SvgRenderer::new(StyleConfig::default())
///     .render(&Diagram::new("d", "Empty", ""))
///     .unwrap();
/// assert!(svg.starts_with("<svg"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SvgRenderer {
    style: StyleConfig,
    selected: Option<NodeId>,
}

impl SvgRenderer {
    pub fn new(style: StyleConfig) -> Self {
        Self {
            style,
            selected: None,
        }
    }

    /// Highlight the outline of the given node.
    pub fn with_selection(mut self, selected: Option<NodeId>) -> Self {
        self.selected = selected;
        self
    }

    fn node_size(&self) -> Size {
        Size::new(self.style.node_width(), self.style.node_height())
    }

    fn node_bounds(&self, node: &Node) -> Bounds {
        let size = self.node_size();
        let center = node.position();
        Point::new(
            center.x() - size.width() / 2.0,
            center.y() - size.height() / 2.0,
        )
        .to_bounds(size)
    }

    fn diagram_bounds(&self, diagram: &Diagram) -> Bounds {
        let mut nodes = diagram.nodes().iter();
        let Some(first) = nodes.next() else {
            return Bounds::default();
        };
        nodes.fold(self.node_bounds(first), |acc, node| {
            acc.merge(&self.node_bounds(node))
        })
    }

    /// Point where the segment from the center of `node` toward `toward`
    /// leaves the node outline.
    fn outline_point(&self, node: &Node, toward: Point) -> Point {
        let center = node.position();
        let dx = toward.x() - center.x();
        let dy = toward.y() - center.y();
        if dx == 0.0 && dy == 0.0 {
            return center;
        }

        let size = self.node_size();
        let scale_x = if dx == 0.0 {
            f32::INFINITY
        } else {
            size.width() / 2.0 / dx.abs()
        };
        let scale_y = if dy == 0.0 {
            f32::INFINITY
        } else {
            size.height() / 2.0 / dy.abs()
        };
        let scale = scale_x.min(scale_y).min(1.0);
        Point::new(center.x() + dx * scale, center.y() + dy * scale)
    }

    fn marker_definitions(&self) -> Result<svg_element::Definitions, Error> {
        let mut defs = svg_element::Definitions::new();
        for category in EDGE_CATEGORIES {
            let color = self.edge_color(category)?;
            defs = defs.add(
                svg_element::Marker::new()
                    .set("id", marker_id(category))
                    .set("viewBox", "0 0 10 10")
                    .set("refX", 9)
                    .set("refY", 5)
                    .set("markerWidth", 6)
                    .set("markerHeight", 6)
                    .set("orient", "auto")
                    .add(
                        svg_element::Path::new()
                            .set("d", "M 0 0 L 10 5 L 0 10 z")
                            .set("fill", &color),
                    ),
            );
        }
        Ok(defs)
    }

    fn edge_color(&self, category: EdgeCategory) -> Result<Color, Error> {
        self.style.edge_color(category).map_err(Error::Render)
    }

    fn render_edge(
        &self,
        diagram: &Diagram,
        edge: &Edge,
    ) -> Result<Option<svg_element::Group>, Error> {
        let (Some(source), Some(target)) =
            (diagram.node(edge.source()), diagram.node(edge.target()))
        else {
            debug!(edge = edge.id().as_str(); "Edge endpoint missing, not rendered");
            return Ok(None);
        };

        let start = self.outline_point(source, target.position());
        let end = self.outline_point(target, source.position());
        let color = self.edge_color(edge.category())?;

        let path = svg_element::Path::new()
            .set(
                "d",
                format!("M {} {} L {} {}", start.x(), start.y(), end.x(), end.y()),
            )
            .set("fill", "none")
            .set("stroke", &color)
            .set("stroke-width", 2)
            .set("marker-end", format!("url(#{})", marker_id(edge.category())));

        let mut group = svg_element::Group::new()
            .set("class", "edge")
            .set("data-id", edge.id().as_str())
            .add(path);

        if let Some(label) = edge.label() {
            let mid = start.midpoint(end);
            group = group.add(
                svg_element::Text::new("")
                    .set("x", mid.x())
                    .set("y", mid.y() - 4.0)
                    .set("text-anchor", "middle")
                    .set("font-family", FONT_FAMILY)
                    .set("font-size", FONT_SIZE - 2.0)
                    .set("fill", &color)
                    .add(SvgText::new(label)),
            );
        }
        Ok(Some(group))
    }

    fn render_node(&self, node: &Node) -> Result<svg_element::Group, Error> {
        let (fill, stroke) = self
            .style
            .node_colors(node.category())
            .map_err(Error::Render)?;
        let bounds = self.node_bounds(node);

        let selected = self.selected.as_ref() == Some(node.id());
        let (stroke, stroke_width) = if selected {
            (self.style.selection_color().map_err(Error::Render)?, 4)
        } else {
            (stroke, 2)
        };

        let rect = svg_element::Rectangle::new()
            .set("x", bounds.min_x())
            .set("y", bounds.min_y())
            .set("width", bounds.width())
            .set("height", bounds.height())
            .set("rx", 8)
            .set("fill", &fill)
            .set("stroke", &stroke)
            .set("stroke-width", stroke_width);

        let text_color = self.style.text_color().map_err(Error::Render)?;
        let center = node.position();
        let text = svg_element::Text::new("")
            .set("x", center.x())
            .set("y", center.y())
            .set("text-anchor", "middle")
            .set("dominant-baseline", "central")
            .set("font-family", FONT_FAMILY)
            .set("font-size", FONT_SIZE)
            .set("fill", &text_color)
            .add(SvgText::new(node.label()));

        Ok(svg_element::Group::new()
            .set("class", format!("node {}", node.category()))
            .set("data-id", node.id().as_str())
            .add(rect)
            .add(text))
    }
}

impl Renderer for SvgRenderer {
    fn render(&self, diagram: &Diagram) -> Result<String, Error> {
        info!(nodes = diagram.nodes().len(), edges = diagram.edges().len(); "Rendering SVG");

        let bounds = self.diagram_bounds(diagram);
        let size = bounds.to_size().add_margin(MARGIN);
        let origin = Point::new(bounds.min_x() - MARGIN, bounds.min_y() - MARGIN);

        let mut doc = svg::Document::new()
            .set(
                "viewBox",
                format!(
                    "{} {} {} {}",
                    origin.x(),
                    origin.y(),
                    size.width(),
                    size.height()
                ),
            )
            .set("width", size.width())
            .set("height", size.height())
            .set("data-layout", diagram.layout_kind().to_string());

        if let Some(background) = self.style.background_color().map_err(Error::Render)? {
            doc = doc.add(
                svg_element::Rectangle::new()
                    .set("x", origin.x())
                    .set("y", origin.y())
                    .set("width", size.width())
                    .set("height", size.height())
                    .set("fill", &background),
            );
        }

        doc = doc.add(self.marker_definitions()?);

        let mut edges = svg_element::Group::new().set("class", "edges");
        for edge in diagram.edges() {
            if let Some(group) = self.render_edge(diagram, edge)? {
                edges = edges.add(group);
            }
        }

        let mut nodes = svg_element::Group::new().set("class", "nodes");
        for node in diagram.nodes() {
            nodes = nodes.add(self.render_node(node)?);
        }

        Ok(doc.add(edges).add(nodes).to_string())
    }
}

fn marker_id(category: EdgeCategory) -> String {
    format!("arrow-{category}")
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use knowflow_core::{identifier::EdgeId, semantic::NodeCategory};

    use super::*;

    fn diagram() -> Diagram {
        let mut diagram = Diagram::new("d", "Flow", "");
        diagram.push_node(
            Node::new(NodeId::new("a"), "Markdown", NodeCategory::Input)
                .with_position(Point::new(100.0, 50.0)),
        );
        diagram.push_node(
            Node::new(NodeId::new("b"), "Engine", NodeCategory::Process)
                .with_position(Point::new(100.0, 170.0)),
        );
        diagram.push_edge(Edge::new(
            EdgeId::from_index(0),
            NodeId::new("a"),
            NodeId::new("b"),
            Some("feeds_to".to_string()),
            EdgeCategory::Loop,
        ));
        diagram
    }

    #[test]
    fn test_render_contains_nodes_and_edges() {
        let svg = SvgRenderer::default().render(&diagram()).unwrap();

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Markdown"));
        assert!(svg.contains("feeds_to"));
        assert!(svg.contains("url(#arrow-loop)"));
        assert!(svg.contains("data-id=\"edge-0\""));
        assert!(svg.contains("data-layout=\"flow\""));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn test_selection_is_highlighted() {
        let svg = SvgRenderer::default()
            .with_selection(Some(NodeId::new("b")))
            .render(&diagram())
            .unwrap();

        assert!(svg.contains("stroke-width=\"4\""));
    }

    #[test]
    fn test_outline_point_vertical() {
        let diagram = diagram();
        let renderer = SvgRenderer::default();
        let point = renderer.outline_point(&diagram.nodes()[0], diagram.nodes()[1].position());

        assert_approx_eq!(f32, point.x(), 100.0);
        assert_approx_eq!(f32, point.y(), 70.0);
    }

    #[test]
    fn test_invalid_style_color_is_render_error() {
        let style: StyleConfig = serde_json::from_value(serde_json::json!({
            "text_color": "nope"
        }))
        .unwrap();

        let err = SvgRenderer::new(style).render(&diagram()).unwrap_err();
        assert!(matches!(err, Error::Render(_)));
    }
}
