//! Control flow graph facade.
//!
//! Thin orchestrator over the parser: buffers input lines, parses them
//! into nodes, minimises duplicate blocks, and extracts the flat edge
//! set for consumers.

use rustc_hash::FxHashSet;

use crate::graph::{Node, NodeId, minimize};
use crate::parser::{ParseError, Parser};

/// A parsed, minimised control flow graph.
///
/// Build one graph per input: buffer lines with [`add_line`], call
/// [`parse`] once, then read the results through the accessors.
///
/// [`add_line`]: ControlFlowGraph::add_line
/// [`parse`]: ControlFlowGraph::parse
pub struct ControlFlowGraph {
    parser: Parser,
    edges: Vec<(NodeId, NodeId)>,
}

impl ControlFlowGraph {
    pub fn new() -> Self {
        Self {
            parser: Parser::new(),
            edges: Vec::new(),
        }
    }

    /// Buffer one line of source text.
    pub fn add_line(&mut self, line: impl Into<String>) {
        self.parser.add_line(line);
    }

    /// Parse everything buffered so far, minimise the node set, and
    /// extract the edges. Errors are recorded as [`diagnostics`];
    /// whatever graph was built before an error stays available.
    ///
    /// [`diagnostics`]: ControlFlowGraph::diagnostics
    pub fn parse(&mut self) {
        self.parser.parse();
        minimize(&mut self.parser.arena, &mut self.parser.nodes);
        self.edges = self.edges_from_nodes();
    }

    /// Final nodes, in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.parser.nodes().iter().map(|&id| &self.parser.arena()[id])
    }

    pub fn node_count(&self) -> usize {
        self.parser.nodes().len()
    }

    /// Look up one node by id.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.parser.arena()[id]
    }

    /// Final edges `(parent, child)`, in node order.
    pub fn edges(&self) -> &[(NodeId, NodeId)] {
        &self.edges
    }

    /// Diagnostics recorded while parsing, in the order they were hit.
    pub fn diagnostics(&self) -> &[ParseError] {
        self.parser.diagnostics()
    }

    /// Split the edges into straight and curve sets. An edge is a curve
    /// iff its reverse also exists (a loop head and its body tail);
    /// renderers draw those with an arc so the pair stays legible.
    pub fn straight_and_curve_edges(&self) -> (Vec<(NodeId, NodeId)>, Vec<(NodeId, NodeId)>) {
        let edge_set: FxHashSet<(NodeId, NodeId)> = self.edges.iter().copied().collect();

        let mut straight = Vec::new();
        let mut curve = Vec::new();
        for &(a, b) in &self.edges {
            if edge_set.contains(&(b, a)) {
                curve.push((a, b));
            } else {
                straight.push((a, b));
            }
        }

        (straight, curve)
    }

    fn edges_from_nodes(&self) -> Vec<(NodeId, NodeId)> {
        let mut edges = Vec::new();
        for &id in self.parser.nodes() {
            for &child in &self.parser.arena()[id].children {
                edges.push((id, child));
            }
        }
        edges
    }
}

impl Default for ControlFlowGraph {
    fn default() -> Self {
        Self::new()
    }
}
