//! While, do-while, and for loops: back-edges, degenerate bodies, the
//! split for-header.

use cflow::{ControlFlowGraph, DecompKind};

fn build(source: &str) -> ControlFlowGraph {
    let mut cfg = ControlFlowGraph::new();
    for line in source.lines() {
        cfg.add_line(line);
    }
    cfg.parse();
    cfg
}

fn kinds(cfg: &ControlFlowGraph) -> Vec<Option<DecompKind>> {
    cfg.nodes().map(|n| n.kind).collect()
}

fn kind_edges(cfg: &ControlFlowGraph) -> Vec<(Option<DecompKind>, Option<DecompKind>)> {
    cfg.edges()
        .iter()
        .map(|&(a, b)| (cfg.node(a).kind, cfg.node(b).kind))
        .collect()
}

#[test]
fn braced_while_has_a_back_edge() {
    let cfg = build("while (c) { a; }");
    assert_eq!(
        kinds(&cfg),
        vec![
            Some(DecompKind::D2),
            Some(DecompKind::P1),
            Some(DecompKind::D2End),
        ]
    );

    let edges = kind_edges(&cfg);
    assert_eq!(edges.len(), 3);
    assert!(edges.contains(&(Some(DecompKind::D2), Some(DecompKind::P1))));
    assert!(edges.contains(&(Some(DecompKind::P1), Some(DecompKind::D2))));
    assert!(edges.contains(&(Some(DecompKind::D2), Some(DecompKind::D2End))));
    assert!(cfg.diagnostics().is_empty());
}

#[test]
fn single_statement_while_body_matches_the_braced_shape() {
    let cfg = build("while (c) a;");
    assert_eq!(
        kinds(&cfg),
        vec![
            Some(DecompKind::D2),
            Some(DecompKind::P1),
            Some(DecompKind::D2End),
        ]
    );

    let edges = kind_edges(&cfg);
    assert_eq!(edges.len(), 3);
    assert!(edges.contains(&(Some(DecompKind::P1), Some(DecompKind::D2))));
}

#[test]
fn bodyless_while_loops_on_itself() {
    let cfg = build("while (c);");
    assert_eq!(
        kinds(&cfg),
        vec![Some(DecompKind::D2), Some(DecompKind::D2End)]
    );

    let edges = kind_edges(&cfg);
    assert_eq!(edges.len(), 2);
    assert!(edges.contains(&(Some(DecompKind::D2), Some(DecompKind::D2))));
    assert!(edges.contains(&(Some(DecompKind::D2), Some(DecompKind::D2End))));
}

#[test]
fn empty_while_body_gets_a_placeholder_block() {
    let cfg = build("while (c) { }");
    assert_eq!(
        kinds(&cfg),
        vec![
            Some(DecompKind::D2),
            Some(DecompKind::P1),
            Some(DecompKind::D2End),
        ]
    );
    let placeholder = cfg.nodes().nth(1).unwrap();
    assert_eq!(placeholder.tokens[0].sequence.as_str(), "");
}

#[test]
fn do_while_back_edge_runs_from_the_tail() {
    let cfg = build("do { a; } while (c);");
    assert_eq!(
        kinds(&cfg),
        vec![
            Some(DecompKind::D3),
            Some(DecompKind::P1),
            Some(DecompKind::D3End),
        ]
    );

    let edges = kind_edges(&cfg);
    assert_eq!(edges.len(), 3);
    assert!(edges.contains(&(Some(DecompKind::D3), Some(DecompKind::P1))));
    assert!(edges.contains(&(Some(DecompKind::P1), Some(DecompKind::D3End))));
    assert!(edges.contains(&(Some(DecompKind::D3End), Some(DecompKind::D3))));
}

#[test]
fn do_while_sweeps_the_closing_brace_into_the_body_tail() {
    let cfg = build("do { a; } while (c);");
    let body = cfg.nodes().nth(1).unwrap();
    let texts: Vec<_> = body.tokens.iter().map(|t| t.sequence.as_str()).collect();
    assert_eq!(texts, vec!["a", ";", "}"]);

    let tail = cfg.nodes().nth(2).unwrap();
    let texts: Vec<_> = tail.tokens.iter().map(|t| t.sequence.as_str()).collect();
    assert_eq!(texts, vec!["while", "(", "c", ")", ";"]);
}

#[test]
fn empty_do_while_body_keeps_the_brace_as_placeholder() {
    let cfg = build("do { } while (c);");
    assert_eq!(
        kinds(&cfg),
        vec![
            Some(DecompKind::D3),
            Some(DecompKind::P1),
            Some(DecompKind::D3End),
        ]
    );
    let placeholder = cfg.nodes().nth(1).unwrap();
    assert_eq!(placeholder.tokens[0].sequence.as_str(), "}");
}

#[test]
fn do_without_braces_reports_a_grammar_error() {
    let cfg = build("do a; while (c);");
    assert!(!cfg.diagnostics().is_empty());
    // The partial head stays in the graph.
    assert!(kinds(&cfg).contains(&Some(DecompKind::D3)));
}

#[test]
fn for_header_splits_into_init_cond_and_modify() {
    let cfg = build("for (i=0; i<n; i++)\n{\n    a;\n}");
    assert_eq!(
        kinds(&cfg),
        vec![
            Some(DecompKind::P1),
            Some(DecompKind::D0),
            None,
            Some(DecompKind::P1),
            Some(DecompKind::D0End),
        ]
    );

    let edges = kind_edges(&cfg);
    assert_eq!(edges.len(), 5);
    // init -> cond, cond -> body, body -> modify, modify -> cond,
    // cond -> exit.
    assert!(edges.contains(&(Some(DecompKind::P1), Some(DecompKind::D0))));
    assert!(edges.contains(&(Some(DecompKind::D0), Some(DecompKind::P1))));
    assert!(edges.contains(&(Some(DecompKind::P1), None)));
    assert!(edges.contains(&(None, Some(DecompKind::D0))));
    assert!(edges.contains(&(Some(DecompKind::D0), Some(DecompKind::D0End))));
    assert!(cfg.diagnostics().is_empty());
}

#[test]
fn for_header_token_distribution() {
    let cfg = build("for (i=0; i<n; i++)\n{\n    a;\n}");

    let texts: Vec<Vec<&str>> = cfg
        .nodes()
        .map(|n| n.tokens.iter().map(|t| t.sequence.as_str()).collect())
        .collect();
    assert_eq!(texts[0], vec!["for", "(", "i=0", ";"]);
    assert_eq!(texts[1], vec!["i<n", ";"]);
    assert_eq!(texts[2], vec!["i++", ")", "{"]);
    assert_eq!(texts[3], vec!["a", ";"]);
    assert_eq!(texts[4], vec!["}"]);
}

#[test]
fn single_statement_for_body_matches_the_braced_shape() {
    let cfg = build("for (i=0; i<n; i++)\n    a;");
    assert_eq!(
        kinds(&cfg),
        vec![
            Some(DecompKind::P1),
            Some(DecompKind::D0),
            None,
            Some(DecompKind::P1),
            Some(DecompKind::D0End),
        ]
    );
    assert_eq!(cfg.edges().len(), 5);
}

#[test]
fn single_line_for_merges_init_and_body_blocks() {
    // Both the init node and the body block start on line 1, so the
    // minimiser folds them together; the graph loses its clean entry.
    let cfg = build("for (i=0; i<n; i++) { a; }");
    assert_eq!(cfg.node_count(), 4);
    assert_eq!(cfg.edges().len(), 5);

    let edges = kind_edges(&cfg);
    assert!(edges.contains(&(Some(DecompKind::D0), Some(DecompKind::P1))));
    assert!(edges.contains(&(Some(DecompKind::P1), Some(DecompKind::D0))));
}

#[test]
fn nested_if_inside_while() {
    let cfg = build("while (x)\n{\n    if (y)\n    {\n        a;\n    }\n}");
    assert_eq!(
        kinds(&cfg),
        vec![
            Some(DecompKind::D2),
            Some(DecompKind::D0),
            Some(DecompKind::P1),
            Some(DecompKind::D0End),
            Some(DecompKind::D2End),
        ]
    );

    let edges = kind_edges(&cfg);
    assert_eq!(edges.len(), 6);
    // The if join carries the loop back-edge.
    assert!(edges.contains(&(Some(DecompKind::D0End), Some(DecompKind::D2))));
    assert!(edges.contains(&(Some(DecompKind::D2), Some(DecompKind::D0))));
    assert!(edges.contains(&(Some(DecompKind::D2), Some(DecompKind::D2End))));
}
