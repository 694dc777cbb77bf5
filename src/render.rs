//! Listing and export helpers for rendering collaborators.
//!
//! Everything here consumes only the public [`ControlFlowGraph`]
//! accessors; layout and drawing stay external.

use std::fmt::Write as _;

use crate::cfg::ControlFlowGraph;

/// Render the node list in the classic listing format.
pub fn format_nodes(cfg: &ControlFlowGraph) -> String {
    let mut out = String::from("Nodes\n-----");

    let mut any = false;
    for node in cfg.nodes() {
        any = true;
        let _ = write!(out, "\n{node}\n");
    }
    if !any {
        out.push_str("\nNone\n");
    }

    out
}

/// Render the edge list as `(parent --> child)` id pairs.
pub fn format_edges(cfg: &ControlFlowGraph) -> String {
    let mut out = String::from("Edges\n-----\n");

    if cfg.edges().is_empty() {
        out.push_str("None\n");
    } else {
        for (parent, child) in cfg.edges() {
            let _ = writeln!(out, "({parent} --> {child})");
        }
    }

    out
}

/// Export the graph as Graphviz DOT. Curve edges (reciprocal pairs,
/// i.e. loop back-edge partners) are emitted with `constraint=false`
/// so they do not fight the ranker.
pub fn to_dot(cfg: &ControlFlowGraph) -> String {
    let mut out = String::from("digraph cfg {\n");

    for node in cfg.nodes() {
        let kind = node.kind.map_or("", |k| k.as_str());
        let text = node
            .tokens
            .iter()
            .map(|t| t.sequence.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let _ = writeln!(
            out,
            "    n{} [label=\"({}) {}\\n{}\"];",
            node.id,
            node.id,
            kind,
            escape(&text)
        );
    }

    let (straight, curve) = cfg.straight_and_curve_edges();
    for (parent, child) in straight {
        let _ = writeln!(out, "    n{parent} -> n{child};");
    }
    for (parent, child) in curve {
        let _ = writeln!(out, "    n{parent} -> n{child} [constraint=false];");
    }

    out.push_str("}\n");
    out
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
