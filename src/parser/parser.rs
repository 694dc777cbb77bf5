//! FSM-driven recursive-descent parser.
//!
//! The parser owns the master token queue and the node arena. Each of
//! the six sub-builders consumes its construct's opener, walks the FSM
//! one peeked token at a time, recurses through [`Parser::build_tree`]
//! for nested constructs, and returns the node the caller should
//! continue attaching to (the *walker*).
//!
//! Errors never propagate out of `parse`: they are recorded as
//! diagnostics and the partially built graph is left in place.

use std::collections::VecDeque;

use crate::graph::{DecompKind, NodeArena, NodeId};

use super::errors::ParseError;
use super::fsm::{FsmState, FsmTable, decomp_kind_for};
use super::lexer::Tokenizer;
use super::token::{Token, TokenKind};

/// Table-driven parser producing an unminimised CFG.
pub struct Parser {
    tokenizer: Tokenizer,
    table: FsmTable,
    lines: Vec<String>,
    tokens: VecDeque<Token>,
    pub(crate) arena: NodeArena,
    pub(crate) nodes: Vec<NodeId>,
    diagnostics: Vec<ParseError>,
}

impl Parser {
    pub fn new() -> Self {
        Self {
            tokenizer: Tokenizer::with_c_rules(),
            table: FsmTable::new(),
            lines: Vec::new(),
            tokens: VecDeque::new(),
            arena: NodeArena::new(),
            nodes: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Buffer one line of source text.
    pub fn add_line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Tokenize the buffered lines in order and build the CFG.
    ///
    /// Returns the entry node of the graph, or `None` when the input
    /// was empty or tokenization failed. A tokenizer error aborts
    /// before any node is built; earlier lines' tokens stay queued.
    pub fn parse(&mut self) -> Option<NodeId> {
        tracing::debug!(lines = self.lines.len(), "parsing buffered source");

        for ix in 0..self.lines.len() {
            let line_no = ix as u32 + 1;
            match self.tokenizer.tokenize(&self.lines[ix], line_no) {
                Ok(tokens) => self.tokens.extend(tokens),
                Err(err) => {
                    tracing::warn!(%err, "tokenizer error, aborting parse");
                    self.diagnostics.push(err);
                    return None;
                }
            }
        }

        self.parse_tokens()
    }

    /// Final node list, in creation order.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    /// Diagnostics recorded so far, in the order they were hit.
    pub fn diagnostics(&self) -> &[ParseError] {
        &self.diagnostics
    }

    /// Drain the queue, dispatching each top-level construct. A token
    /// no builder consumes is dropped so the queue always shrinks.
    fn parse_tokens(&mut self) -> Option<NodeId> {
        let root = self.arena.alloc();

        let mut walker = root;
        while let Some(front) = self.tokens.front().cloned() {
            if let Some(next) = self.build_tree(walker) {
                walker = next;
            }
            if self.tokens.front() == Some(&front) {
                self.tokens.pop_front();
            }
        }

        let entry = self.arena[root].children.first().copied()?;
        // Unhook the synthetic root so the entry node has no parents.
        if !self.arena[entry].parents.is_empty() {
            self.arena[entry].parents.remove(0);
        }
        Some(entry)
    }

    /// Dispatch on `T[INIT_START][peek]` to one of the six sub-builders.
    fn build_tree(&mut self, walker: NodeId) -> Option<NodeId> {
        let peek = self.tokens.front()?;
        let state = self.table.next(FsmState::InitStart, peek.kind);

        match state {
            FsmState::StatementStart => Some(self.build_statement(walker)),
            FsmState::IfStart => Some(self.build_if(walker)),
            FsmState::WhileStart => Some(self.build_while(walker)),
            FsmState::DoWhileStart => Some(self.build_do_while(walker)),
            FsmState::ForStart => Some(self.build_for(walker)),
            FsmState::FuncStart => Some(self.build_function(walker)),
            _ => None,
        }
    }

    // ── sub-builders ─────────────────────────────────────────────────────

    /// Statement block. Consecutive statements at the same recursion
    /// level coalesce into the caller's walker when it is already P1.
    fn build_statement(&mut self, root: NodeId) -> NodeId {
        let Some(token) = self.tokens.pop_front() else {
            return root;
        };
        let mut state = self.table.next(FsmState::InitStart, token.kind);
        if state != FsmState::StatementStart {
            return root;
        }

        let walker = if self.arena[root].kind == Some(DecompKind::P1) {
            self.arena[root].tokens.push(token);
            root
        } else {
            let start = self.fresh_node(decomp_kind_for(state), Some(token));
            self.arena.link(root, start);
            start
        };

        while let Some(peek) = self.tokens.front().cloned() {
            let next = self.table.next(state, peek.kind);

            if next == FsmState::Error {
                self.grammar_error(&peek);
                return walker;
            }

            if let Some(token) = self.tokens.pop_front() {
                self.arena[walker].tokens.push(token);
            }

            if next == FsmState::StatementEnd {
                break;
            }
            state = next;
        }

        walker
    }

    /// If / else-if / else. Keeps one exit walker per arm and joins
    /// them all on a single end node.
    fn build_if(&mut self, root: NodeId) -> NodeId {
        let Some(token) = self.tokens.pop_front() else {
            return root;
        };
        let mut state = self.table.next(FsmState::InitStart, token.kind);
        if state != FsmState::IfStart {
            return root;
        }

        let start = self.fresh_node(decomp_kind_for(state), Some(token));
        self.arena.link(root, start);

        let mut walker = start;
        let mut last_walkers: Vec<NodeId> = Vec::new();
        let mut success = false;

        while let Some(peek) = self.tokens.front().cloned() {
            let next = self.table.next(state, peek.kind);

            if next == FsmState::Error {
                if success {
                    break;
                }
                self.grammar_error(&peek);
                return walker;
            }

            match next {
                FsmState::IfThenSingleStatement
                | FsmState::ElseIfStatement
                | FsmState::IfElseSingleStatement => {
                    walker = self.build_tree(walker).unwrap_or(walker);

                    let carry = self.arena[walker].tokens.last().cloned();
                    let last_walker = self.fresh_node(decomp_kind_for(next), carry);
                    self.arena.link(walker, last_walker);
                    last_walkers.push(last_walker);
                    walker = last_walker;
                    success = true;
                }
                FsmState::IfThenStatement | FsmState::IfElseStatement => {
                    walker = self.build_tree(walker).unwrap_or(walker);
                }
                FsmState::IfElse => {
                    let Some(token) = self.tokens.pop_front() else {
                        break;
                    };
                    let arm = self.fresh_node(None, Some(token));
                    self.arena.link(start, arm);
                    walker = arm;

                    // Once an else arm exists the head is no longer an
                    // if-then but an if-then-else.
                    self.arena[start].kind = Some(DecompKind::D1);
                }
                FsmState::IfThenEnd | FsmState::ElseIfEnd | FsmState::IfElseEnd => {
                    if state == FsmState::IfThenBraceOpen || state == FsmState::IfElseBraceOpen {
                        walker = self.empty_body_node(walker);
                    }

                    let Some(token) = self.tokens.pop_front() else {
                        break;
                    };
                    let last_walker = self.fresh_node(decomp_kind_for(next), Some(token));
                    self.arena.link(walker, last_walker);
                    last_walkers.push(last_walker);
                    walker = last_walker;
                    success = true;
                }
                _ => {
                    if let Some(token) = self.tokens.pop_front() {
                        self.arena[walker].tokens.push(token);
                    }
                }
            }

            state = next;
        }

        // Join every arm's exit on one end node; a pure if-then also
        // gets the head -> end bypass edge.
        let carry = self.arena[walker].tokens.last().cloned();
        let end = self.fresh_node(decomp_kind_for(state), carry);
        if self.arena[start].children.len() < 2 {
            self.arena.link(start, end);
        }
        for last_walker in last_walkers {
            self.arena.link(last_walker, end);
        }

        end
    }

    /// While loop: body tail gets a back-edge to the head, the head a
    /// forward edge to the end node.
    fn build_while(&mut self, root: NodeId) -> NodeId {
        let Some(token) = self.tokens.pop_front() else {
            return root;
        };
        let mut state = self.table.next(FsmState::InitStart, token.kind);
        if state != FsmState::WhileStart {
            return root;
        }

        let start = self.fresh_node(decomp_kind_for(state), Some(token));
        self.arena.link(root, start);

        let mut walker = start;
        let mut end: Option<NodeId> = None;
        let mut success = false;

        while let Some(peek) = self.tokens.front().cloned() {
            let next = self.table.next(state, peek.kind);

            if next == FsmState::Error {
                if success {
                    break;
                }
                self.grammar_error(&peek);
                return walker;
            }

            match next {
                FsmState::WhileStatement | FsmState::WhileSingleStatement => {
                    walker = self.build_tree(walker).unwrap_or(walker);
                    if next == FsmState::WhileSingleStatement {
                        break;
                    }
                }
                FsmState::WhileEnd => {
                    if state == FsmState::WhileBraceOpen {
                        walker = self.empty_body_node(walker);
                    }
                    let Some(token) = self.tokens.pop_front() else {
                        break;
                    };
                    end = Some(self.fresh_node(decomp_kind_for(next), Some(token)));
                    success = true;
                }
                _ => {
                    if let Some(token) = self.tokens.pop_front() {
                        self.arena[walker].tokens.push(token);
                    }
                }
            }

            state = next;
        }

        // Back-edge from the body tail, then the loop-exit edge.
        self.arena.link(walker, start);

        let end = match end {
            Some(end) => end,
            None => {
                let carry = self.arena[walker].tokens.last().cloned();
                self.fresh_node(decomp_kind_for(state), carry)
            }
        };
        self.arena.link(start, end);

        end
    }

    /// Do-while: body first, then the `while(...)` tail as its own
    /// node, and a back-edge from the tail to the head.
    fn build_do_while(&mut self, root: NodeId) -> NodeId {
        let Some(token) = self.tokens.pop_front() else {
            return root;
        };
        let mut last_line = token.line;
        let mut state = self.table.next(FsmState::InitStart, token.kind);
        if state != FsmState::DoWhileStart {
            return root;
        }

        let start = self.fresh_node(decomp_kind_for(state), Some(token));
        self.arena.link(root, start);

        let mut walker = start;
        let mut end: Option<NodeId> = None;

        while let Some(peek) = self.tokens.front().cloned() {
            let next = self.table.next(state, peek.kind);

            if next == FsmState::Error {
                self.grammar_error(&peek);
                return walker;
            }

            match next {
                FsmState::DoWhileStatement => {
                    walker = self.build_tree(walker).unwrap_or(walker);
                }
                FsmState::DoWhileEnd => {
                    if let Some(token) = self.tokens.pop_front() {
                        last_line = token.line;
                        self.arena[walker].tokens.push(token);
                    }
                    end = Some(walker);
                    break;
                }
                FsmState::DoWhileBraceClose if state == FsmState::DoWhileBraceOpen => {
                    // `do {}` - the closing brace becomes the body
                    // placeholder itself.
                    let Some(token) = self.tokens.pop_front() else {
                        break;
                    };
                    last_line = token.line;
                    let empty = self.fresh_node(Some(DecompKind::P1), Some(token));
                    self.arena.link(walker, empty);
                    walker = empty;
                }
                FsmState::DoWhileKeyword => {
                    let Some(token) = self.tokens.pop_front() else {
                        break;
                    };
                    last_line = token.line;
                    let tail = self.fresh_node(None, Some(token));
                    self.arena.link(walker, tail);
                    walker = tail;
                }
                _ => {
                    if let Some(token) = self.tokens.pop_front() {
                        last_line = token.line;
                        self.arena[walker].tokens.push(token);
                    }
                }
            }

            state = next;
        }

        let Some(end) = end.filter(|&end| end != start) else {
            self.structural_error("do-while", last_line);
            return walker;
        };

        self.arena[end].kind = decomp_kind_for(state);
        self.arena.link(end, start);

        end
    }

    /// For loop: the header is split across three nodes (P1 init in the
    /// head, D0 condition, unclassified modify), stitched so control
    /// flows body-tail -> modify -> condition.
    fn build_for(&mut self, root: NodeId) -> NodeId {
        let Some(token) = self.tokens.pop_front() else {
            return root;
        };
        let mut last_line = token.line;
        let mut state = self.table.next(FsmState::InitStart, token.kind);
        if state != FsmState::ForStart {
            return root;
        }

        let start = self.fresh_node(decomp_kind_for(state), Some(token));
        self.arena.link(root, start);

        let mut walker = start;
        let mut end: Option<NodeId> = None;
        let mut for_cond: Option<NodeId> = None;
        let mut for_modify: Option<NodeId> = None;
        let mut body_last: Option<NodeId> = None;

        while let Some(peek) = self.tokens.front().cloned() {
            let next = self.table.next(state, peek.kind);

            if next == FsmState::Error {
                self.grammar_error(&peek);
                return walker;
            }

            match next {
                FsmState::ForCond | FsmState::ForCondEnd => {
                    let Some(token) = self.tokens.pop_front() else {
                        break;
                    };
                    last_line = token.line;
                    match for_cond {
                        None => {
                            let cond = self.fresh_node(decomp_kind_for(next), Some(token));
                            self.arena.link(start, cond);
                            for_cond = Some(cond);
                            walker = cond;
                        }
                        Some(_) => self.arena[walker].tokens.push(token),
                    }
                }
                FsmState::ForModify | FsmState::ForParenClose => {
                    let Some(token) = self.tokens.pop_front() else {
                        break;
                    };
                    last_line = token.line;
                    match for_modify {
                        None => {
                            let modify = self.fresh_node(None, Some(token));
                            // Back-edge: the modify step re-enters the
                            // condition check.
                            if let Some(cond) = for_cond {
                                self.arena.link(modify, cond);
                            }
                            for_modify = Some(modify);
                            walker = modify;
                        }
                        Some(_) => self.arena[walker].tokens.push(token),
                    }
                }
                FsmState::ForStatement | FsmState::ForSingleStatement => {
                    let Some(cond) = for_cond else {
                        self.structural_error("for", last_line);
                        return walker;
                    };
                    walker = self.build_tree(cond).unwrap_or(walker);
                    body_last = Some(walker);

                    if next == FsmState::ForSingleStatement {
                        break;
                    }
                }
                FsmState::ForEnd => {
                    if state == FsmState::ForBraceOpen {
                        let line = self.arena[walker].tokens.last().map_or(0, |t| t.line);
                        let placeholder = Token::new(line, TokenKind::Lambda, "");
                        let empty = self.fresh_node(Some(DecompKind::P1), Some(placeholder));
                        if let Some(cond) = for_cond {
                            self.arena.link(cond, empty);
                        }
                        body_last = Some(empty);
                        walker = empty;
                    }

                    let Some(token) = self.tokens.pop_front() else {
                        break;
                    };
                    last_line = token.line;
                    end = Some(self.fresh_node(decomp_kind_for(next), Some(token)));
                    break;
                }
                _ => {
                    if let Some(token) = self.tokens.pop_front() {
                        last_line = token.line;
                        self.arena[walker].tokens.push(token);
                    }
                }
            }

            state = next;
        }

        let (Some(cond), Some(modify)) = (for_cond, for_modify) else {
            self.structural_error("for", last_line);
            return walker;
        };

        let end = match end {
            Some(end) => end,
            None => {
                let carry = self.arena[walker].tokens.last().cloned();
                self.fresh_node(decomp_kind_for(state), carry)
            }
        };

        // Loop exit, then route the body (or the bare condition) into
        // the modify step.
        self.arena.link(cond, end);
        match body_last {
            Some(body) => self.arena.link(body, modify),
            None => self.arena.link(cond, modify),
        }

        end
    }

    /// Function: brace-delimited body, or a declaration/call-statement
    /// that ends on `;` and collapses into a single P1 node.
    fn build_function(&mut self, root: NodeId) -> NodeId {
        let Some(token) = self.tokens.pop_front() else {
            return root;
        };
        let mut last_line = token.line;
        let mut state = self.table.next(FsmState::InitStart, token.kind);
        if state != FsmState::FuncStart {
            return root;
        }

        let start = self.fresh_node(decomp_kind_for(state), Some(token));
        self.arena.link(root, start);

        let mut walker = start;
        let mut end: Option<NodeId> = None;

        while let Some(peek) = self.tokens.front().cloned() {
            let next = self.table.next(state, peek.kind);

            if next == FsmState::Error {
                self.grammar_error(&peek);
                return walker;
            }

            match next {
                FsmState::FuncStatement => {
                    walker = self.build_tree(walker).unwrap_or(walker);
                }
                FsmState::FuncEnd => {
                    if state == FsmState::FuncBraceOpen {
                        walker = self.empty_body_node(walker);
                    }

                    let Some(token) = self.tokens.pop_front() else {
                        break;
                    };
                    last_line = token.line;

                    if token.kind == TokenKind::Semicolon {
                        // Forward declaration or call-statement: the
                        // whole construct is one statement block.
                        self.arena[start].kind = Some(DecompKind::P1);
                        self.arena[start].tokens.push(token);
                        end = Some(start);
                    } else {
                        let join = self.fresh_node(decomp_kind_for(next), Some(token));
                        self.arena.link(walker, join);
                        end = Some(join);
                    }
                    break;
                }
                _ => {
                    if let Some(token) = self.tokens.pop_front() {
                        last_line = token.line;
                        self.arena[walker].tokens.push(token);
                    }
                }
            }

            state = next;
        }

        let Some(end) = end else {
            self.structural_error("function", last_line);
            return walker;
        };

        end
    }

    // ── node and diagnostic helpers ──────────────────────────────────────

    /// Allocate a node, classify it, seed its token list, and append it
    /// to the master list.
    fn fresh_node(&mut self, kind: Option<DecompKind>, token: Option<Token>) -> NodeId {
        let id = self.arena.alloc();
        let node = &mut self.arena[id];
        node.kind = kind;
        if let Some(token) = token {
            node.tokens.push(token);
        }
        self.nodes.push(id);
        id
    }

    /// P1 placeholder for an empty `{}` body, carrying a synthetic
    /// empty-lexeme token on the walker's current line.
    fn empty_body_node(&mut self, walker: NodeId) -> NodeId {
        let line = self.arena[walker].tokens.last().map_or(0, |t| t.line);
        let placeholder = Token::new(line, TokenKind::Lambda, "");
        let empty = self.fresh_node(Some(DecompKind::P1), Some(placeholder));
        self.arena.link(walker, empty);
        empty
    }

    fn grammar_error(&mut self, token: &Token) {
        let err = ParseError::unexpected_token(token);
        tracing::warn!(%err, "grammar error");
        self.diagnostics.push(err);
    }

    fn structural_error(&mut self, construct: &'static str, line: u32) {
        let err = ParseError::malformed(construct, line);
        tracing::warn!(%err, "structural error");
        self.diagnostics.push(err);
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}
