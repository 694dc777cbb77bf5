//! # cflow-base
//!
//! Core library for control flow graph construction from C-family
//! source. Free-form, line-oriented input goes through a coarse
//! regex-priority tokenizer and a table-driven finite-state parser,
//! producing a directed graph of basic blocks with loop back-edges and
//! branch join nodes, minimised for rendering or downstream analysis.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! render   → listing and DOT helpers (external-collaborator seams)
//!   ↓
//! cfg      → ControlFlowGraph facade: buffer lines, parse, accessors
//!   ↓
//! graph    → arena-backed basic blocks, decomposition kinds, minimiser
//!   ↓
//! parser   → regex-priority tokenizer, FSM table, six sub-builders
//! ```
//!
//! ## Example
//!
//! ```
//! use cflow::ControlFlowGraph;
//!
//! let mut cfg = ControlFlowGraph::new();
//! cfg.add_line("while (c)");
//! cfg.add_line("{");
//! cfg.add_line("    work = work + 1;");
//! cfg.add_line("}");
//! cfg.parse();
//!
//! assert_eq!(cfg.node_count(), 3);
//! assert_eq!(cfg.edges().len(), 3);
//! ```

// ============================================================================
// MODULES (dependency order: parser → graph → cfg → render)
// ============================================================================

/// Parsing: regex-priority tokenizer, FSM table, recursive sub-builders.
pub mod parser;

/// CFG data model: decomposition kinds, nodes, arena, minimiser.
pub mod graph;

/// Facade: line buffering, parse orchestration, node/edge accessors.
pub mod cfg;

/// Listing and DOT export helpers for rendering collaborators.
pub mod render;

// Re-export the commonly needed surface.
pub use cfg::ControlFlowGraph;
pub use graph::{DecompKind, Node, NodeArena, NodeId};
pub use parser::{ParseError, Parser, Token, TokenKind, Tokenizer};
