//! Level-based auto layout.
//!
//! Nodes are arranged in horizontal tiers ordered by their distance from the
//! nodes without incoming edges:
//!
//! ```text
//!   level 0        [Markdown]
//!                      ↓
//!   level 1          [CSV]
//!                   ↙     ↘
//!   level 2     [JSON-LD]  [RDF]
//! ```
//!
//! Levels are assigned in two passes over a [`petgraph`] graph of the
//! diagram:
//!
//! 1. **Leveling** - Starting from every zero in-degree node at level 0, a
//!    node is leveled once all of its incoming edges have been followed, so
//!    its level is one more than the deepest predecessor. Every acyclic part
//!    of the graph is finished by this pass.
//! 2. **Cycle fallback** - Nodes on or behind a cycle are reached
//!    breadth-first from the leveled part, visiting each node once and
//!    raising a target to one more than the node it was reached from.
//!
//! Nodes reached by neither pass, such as a cycle with no entry, stay on
//! level 0.

use std::collections::{BTreeMap, HashMap, VecDeque};

use log::{debug, info, trace};
use petgraph::{
    Direction,
    graph::{DiGraph, NodeIndex},
    visit::EdgeRef,
};

use knowflow_core::{geometry::Point, identifier::NodeId, semantic::Diagram};

use crate::config::LayoutConfig;

/// Positions calculated for a diagram.
///
/// Both vectors are indexed like the diagram's node list.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    levels: Vec<usize>,
    positions: Vec<Point>,
}

impl Layout {
    /// Returns the level of every node.
    pub fn levels(&self) -> &[usize] {
        &self.levels
    }

    /// Returns the position of every node.
    pub fn positions(&self) -> &[Point] {
        &self.positions
    }

    /// Returns the number of distinct levels.
    pub fn depth(&self) -> usize {
        self.levels.iter().max().map_or(0, |max| max + 1)
    }

    /// Move the diagram's nodes to the calculated positions.
    ///
    /// Nodes beyond the calculated range are left untouched.
    pub fn apply(&self, diagram: &mut Diagram) {
        for (node, position) in diagram.nodes_mut().iter_mut().zip(&self.positions) {
            node.set_position(*position);
        }
    }
}

/// A layout algorithm for flow diagrams.
pub trait Engine {
    /// Calculate the positions of every node of `diagram`.
    fn calculate(&self, diagram: &Diagram) -> Layout;
}

/// The level layout engine.
///
/// # Examples
///
/// ```
/// use knowflow::{
///     config::LayoutConfig,
///     layout::{Engine, LevelEngine},
/// };
/// # use knowflow::semantic::{Diagram, Edge, EdgeCategory, Node, NodeCategory};
/// # use knowflow::identifier::{EdgeId, NodeId};
///
/// let mut diagram = Diagram::new("d", "Flow", "");
/// diagram.push_node(Node::new(NodeId::new("a"), "A", NodeCategory::Input));
/// diagram.push_node(Node::new(NodeId::new("b"), "B", NodeCategory::Process));
/// diagram.push_edge(Edge::new(
///     EdgeId::from_index(0),
///     NodeId::new("a"),
///     NodeId::new("b"),
///     None,
///     EdgeCategory::Default,
/// ));
///
/// let layout = LevelEngine::new(LayoutConfig::default()).calculate(&diagram);
/// assert_eq!(layout.levels(), &[0, 1]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct LevelEngine {
    config: LayoutConfig,
}

impl LevelEngine {
    /// Create an engine using the given layout constants.
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// Spread the nodes of every level across the canvas.
    fn place(&self, levels: &[usize]) -> Vec<Point> {
        let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (index, level) in levels.iter().enumerate() {
            groups.entry(*level).or_default().push(index);
        }

        let config = &self.config;
        let mut positions = vec![Point::default(); levels.len()];
        for (level, members) in groups {
            let count = members.len();
            let spacing = config
                .min_spacing()
                .max(config.canvas_width() / count as f32);
            let start_x = config.left_margin()
                + ((config.canvas_width() - (count - 1) as f32 * spacing) / 2.0).max(0.0);
            let y = config.top_margin() + level as f32 * config.level_height();
            debug!(level, count, spacing, start_x; "Level placed");

            for (slot, index) in members.into_iter().enumerate() {
                positions[index] = Point::new(start_x + slot as f32 * spacing, y);
            }
        }
        positions
    }
}

impl Engine for LevelEngine {
    fn calculate(&self, diagram: &Diagram) -> Layout {
        let graph = build_graph(diagram);
        let levels = assign_levels(&graph);
        let positions = self.place(&levels);

        let layout = Layout { levels, positions };
        info!(nodes = diagram.nodes().len(), depth = layout.depth(); "Layout calculated");
        trace!(layout:?; "Calculated layout");
        layout
    }
}

/// Build a graph whose node and edge indices follow the diagram's order.
///
/// Edges whose endpoints do not resolve are left out.
fn build_graph(diagram: &Diagram) -> DiGraph<(), ()> {
    let mut graph = DiGraph::with_capacity(diagram.nodes().len(), diagram.edges().len());
    let indices: HashMap<&NodeId, NodeIndex> = diagram
        .nodes()
        .iter()
        .map(|node| (node.id(), graph.add_node(())))
        .collect();

    for edge in diagram.edges() {
        match (indices.get(edge.source()), indices.get(edge.target())) {
            (Some(&source), Some(&target)) => {
                graph.add_edge(source, target, ());
            }
            _ => debug!(edge = edge.id().as_str(); "Skipping edge with unknown endpoint"),
        }
    }
    graph
}

/// Targets of `node`'s outgoing edges in edge insertion order.
fn successors(graph: &DiGraph<(), ()>, node: NodeIndex) -> Vec<NodeIndex> {
    let mut outgoing: Vec<_> = graph
        .edges_directed(node, Direction::Outgoing)
        .map(|edge| (edge.id(), edge.target()))
        .collect();
    outgoing.sort_by_key(|(id, _)| *id);
    outgoing.into_iter().map(|(_, target)| target).collect()
}

fn assign_levels(graph: &DiGraph<(), ()>) -> Vec<usize> {
    let count = graph.node_count();
    let mut levels = vec![0; count];
    let mut settled = vec![false; count];
    let mut pending: Vec<usize> = graph
        .node_indices()
        .map(|node| graph.edges_directed(node, Direction::Incoming).count())
        .collect();

    // Leveling: a node is settled once every incoming edge has been followed.
    let mut queue: VecDeque<NodeIndex> = graph
        .node_indices()
        .filter(|node| pending[node.index()] == 0)
        .collect();
    while let Some(node) = queue.pop_front() {
        settled[node.index()] = true;
        for target in successors(graph, node) {
            let next = levels[node.index()] + 1;
            levels[target.index()] = levels[target.index()].max(next);
            pending[target.index()] -= 1;
            if pending[target.index()] == 0 {
                queue.push_back(target);
            }
        }
    }

    // Cycle fallback: breadth-first from the settled frontier.
    let mut visited = settled.clone();
    let mut queue: VecDeque<NodeIndex> = graph
        .node_indices()
        .filter(|node| {
            !settled[node.index()]
                && graph
                    .neighbors_directed(*node, Direction::Incoming)
                    .any(|source| settled[source.index()])
        })
        .collect();
    while let Some(node) = queue.pop_front() {
        if visited[node.index()] {
            continue;
        }
        visited[node.index()] = true;
        for target in successors(graph, node) {
            if !visited[target.index()] {
                let next = levels[node.index()] + 1;
                levels[target.index()] = levels[target.index()].max(next);
                queue.push_back(target);
            }
        }
    }

    let unreached = visited.iter().filter(|visited| !**visited).count();
    if unreached > 0 {
        debug!(unreached; "Nodes unreachable from any root placed on level 0");
    }
    levels
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use knowflow_core::{
        identifier::EdgeId,
        semantic::{Edge, EdgeCategory, Node, NodeCategory},
    };

    use super::*;

    fn diagram(nodes: &[&str], edges: &[(&str, &str)]) -> Diagram {
        let mut diagram = Diagram::new("test", "Test", "");
        for label in nodes {
            diagram.push_node(Node::new(
                NodeId::new(*label),
                *label,
                NodeCategory::Process,
            ));
        }
        for (index, (source, target)) in edges.iter().enumerate() {
            diagram.push_edge(Edge::new(
                EdgeId::from_index(index),
                NodeId::new(*source),
                NodeId::new(*target),
                None,
                EdgeCategory::Default,
            ));
        }
        diagram
    }

    fn levels(diagram: &Diagram) -> Vec<usize> {
        LevelEngine::default().calculate(diagram).levels().to_vec()
    }

    #[test]
    fn test_single_edge() {
        let layout = LevelEngine::default().calculate(&diagram(&["a", "b"], &[("a", "b")]));

        assert_eq!(layout.levels(), &[0, 1]);
        assert_approx_eq!(f32, layout.positions()[0].x(), 450.0);
        assert_approx_eq!(f32, layout.positions()[0].y(), 50.0);
        assert_approx_eq!(f32, layout.positions()[1].x(), 450.0);
        assert_approx_eq!(f32, layout.positions()[1].y(), 170.0);
    }

    #[test]
    fn test_level_spacing() {
        let layout = LevelEngine::default().calculate(&diagram(&["a", "b", "c", "d"], &[]));
        let xs: Vec<f32> = layout.positions().iter().map(|p| p.x()).collect();

        assert_approx_eq!(f32, xs[0], 150.0);
        assert_approx_eq!(f32, xs[1], 350.0);
        assert_approx_eq!(f32, xs[2], 550.0);
        assert_approx_eq!(f32, xs[3], 750.0);
    }

    #[test]
    fn test_wide_level_starts_at_margin() {
        let labels = ["a", "b", "c", "d", "e", "f"];
        let layout = LevelEngine::default().calculate(&diagram(&labels, &[]));

        assert_approx_eq!(f32, layout.positions()[0].x(), 50.0);
        assert_approx_eq!(f32, layout.positions()[5].x(), 1050.0);
    }

    #[test]
    fn test_two_cycle_falls_back_to_level_zero() {
        let layout =
            LevelEngine::default().calculate(&diagram(&["a", "b"], &[("a", "b"), ("b", "a")]));

        assert_eq!(layout.levels(), &[0, 0]);
        assert_approx_eq!(f32, layout.positions()[0].x(), 250.0);
        assert_approx_eq!(f32, layout.positions()[1].x(), 650.0);
    }

    #[test]
    fn test_longer_path_wins() {
        // a → b directly and through c.
        let diagram = diagram(&["a", "b", "c"], &[("a", "b"), ("a", "c"), ("c", "b")]);

        assert_eq!(levels(&diagram), vec![0, 2, 1]);
    }

    #[test]
    fn test_cycle_behind_root() {
        let diagram = diagram(&["s", "a", "b"], &[("s", "a"), ("a", "b"), ("b", "a")]);

        assert_eq!(levels(&diagram), vec![0, 1, 2]);
    }

    #[test]
    fn test_self_loop_is_unreached() {
        let diagram = diagram(&["a", "b"], &[("a", "a"), ("a", "b")]);

        assert_eq!(levels(&diagram), vec![0, 0]);
    }

    #[test]
    fn test_dangling_edge_is_ignored() {
        let diagram = diagram(&["a"], &[("a", "ghost")]);

        assert_eq!(levels(&diagram), vec![0]);
    }

    #[test]
    fn test_apply_moves_nodes() {
        let mut diagram = diagram(&["a", "b"], &[("a", "b")]);
        let layout = LevelEngine::default().calculate(&diagram);
        layout.apply(&mut diagram);

        assert_eq!(diagram.nodes()[1].position(), layout.positions()[1]);
        assert_eq!(layout.depth(), 2);
    }

    #[test]
    fn test_empty_diagram() {
        let layout = LevelEngine::default().calculate(&diagram(&[], &[]));

        assert!(layout.levels().is_empty());
        assert_eq!(layout.depth(), 0);
    }
}
