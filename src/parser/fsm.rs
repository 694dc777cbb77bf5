//! Finite-state machine driving the parser.
//!
//! A rectangular 2-D table maps `(parser state, token kind)` to the
//! next parser state; unset entries are [`FsmState::Error`]. The table
//! is built from a static triple list and validated at construction so
//! no transition can silently shadow another.
//!
//! State declaration order is load-bearing: the mapping from states to
//! decomposition kinds ([`decomp_kind_for`]) classifies whole state
//! groups with ordered range checks.

use crate::graph::DecompKind;

use super::token::TokenKind;

/// Parser states, grouped per sub-builder with a shared dispatch state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum FsmState {
    Error = 0,

    InitStart,

    // =========================================================================
    // STATEMENT
    // =========================================================================
    StatementStart,
    StatementMid,
    StatementEnd,

    // =========================================================================
    // IF / ELSE-IF / ELSE
    // =========================================================================
    IfStart,
    IfParenOpen,
    IfParenStatement,
    IfParenClose,
    IfThenBraceOpen,
    IfThenStatement,
    IfThenSingleStatement,
    IfThenEnd,

    ElseIfStatement,
    ElseIfEnd,

    IfElse,
    IfElseBraceOpen,
    IfElseStatement,
    IfElseSingleStatement,
    IfElseEnd,

    // =========================================================================
    // WHILE
    // =========================================================================
    WhileStart,
    WhileParenOpen,
    WhileParenStatement,
    WhileParenClose,
    WhileBraceOpen,
    WhileStatement,
    WhileSingleStatement,
    WhileEnd,

    // =========================================================================
    // DO-WHILE
    // =========================================================================
    DoWhileStart,
    DoWhileBraceOpen,
    DoWhileStatement,
    DoWhileBraceClose,
    DoWhileKeyword,
    DoWhileParenOpen,
    DoWhileParenStatement,
    DoWhileParenClose,
    DoWhileEnd,

    // =========================================================================
    // FOR
    // =========================================================================
    ForStart,
    ForParenOpen,
    ForInit,
    ForInitEnd,
    ForCond,
    ForCondEnd,
    ForModify,
    ForParenClose,
    ForBraceOpen,
    ForStatement,
    ForSingleStatement,
    ForEnd,

    // =========================================================================
    // FUNCTION
    // =========================================================================
    FuncStart,
    FuncBraceOpen,
    FuncStatement,
    FuncEnd,
}

impl FsmState {
    /// Number of states, i.e. the height of the FSM table.
    pub const COUNT: usize = 53;

    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

/// True for the six states `build_tree` dispatches on.
pub fn is_start_state(state: FsmState) -> bool {
    matches!(
        state,
        FsmState::StatementStart
            | FsmState::IfStart
            | FsmState::WhileStart
            | FsmState::DoWhileStart
            | FsmState::ForStart
            | FsmState::FuncStart
    )
}

/// Map a parser state to the decomposition kind a node created in that
/// state receives. `None` for the dispatch and error states, which
/// never classify nodes.
pub fn decomp_kind_for(state: FsmState) -> Option<DecompKind> {
    use FsmState::*;

    if (StatementStart..=StatementEnd).contains(&state) {
        return Some(DecompKind::P1);
    }

    if (IfStart..=IfElseEnd).contains(&state) {
        if state == IfStart {
            return Some(DecompKind::D0);
        }
        if state <= IfThenEnd {
            return Some(DecompKind::D0End);
        }
        if state == IfElse {
            return Some(DecompKind::D1);
        }
        return Some(DecompKind::D1End);
    }

    if (WhileStart..=WhileEnd).contains(&state) {
        if state == WhileStart {
            return Some(DecompKind::D2);
        }
        return Some(DecompKind::D2End);
    }

    if (DoWhileStart..=DoWhileEnd).contains(&state) {
        if state == DoWhileStart {
            return Some(DecompKind::D3);
        }
        return Some(DecompKind::D3End);
    }

    if (ForStart..=ForEnd).contains(&state) {
        // A `for` is structurally a while whose header has been split:
        // the init lives in a P1 node and the condition in a D0 node.
        if state <= ForInitEnd {
            return Some(DecompKind::P1);
        }
        if state <= ForCondEnd {
            return Some(DecompKind::D0);
        }
        return Some(DecompKind::D0End);
    }

    if (FuncStart..=FuncEnd).contains(&state) {
        if state == FuncStart {
            return Some(DecompKind::F1);
        }
        return Some(DecompKind::F1End);
    }

    None
}

/// The full transition relation as `(from, input, to)` triples.
const TRANSITIONS: &[(FsmState, TokenKind, FsmState)] = {
    use FsmState::*;
    use TokenKind::*;
    &[
        // ── dispatch ─────────────────────────────────────────────────────
        (InitStart, Statement, StatementStart),
        (InitStart, Semicolon, StatementStart),
        (InitStart, If, IfStart),
        (InitStart, While, WhileStart),
        (InitStart, Do, DoWhileStart),
        (InitStart, For, ForStart),
        (InitStart, Function, FuncStart),
        // ── statement ────────────────────────────────────────────────────
        (StatementStart, Statement, StatementMid),
        (StatementStart, Semicolon, StatementEnd),
        (StatementMid, Statement, StatementMid),
        (StatementMid, Semicolon, StatementEnd),
        (StatementEnd, Statement, StatementMid),
        (StatementEnd, Semicolon, StatementEnd),
        // ── while ────────────────────────────────────────────────────────
        (WhileStart, ParenOpen, WhileParenOpen),
        (WhileParenOpen, Statement, WhileParenStatement),
        (WhileParenStatement, Statement, WhileParenStatement),
        (WhileParenStatement, ParenClose, WhileParenClose),
        (WhileParenStatement, Do, WhileParenClose),
        (WhileParenClose, BraceOpen, WhileBraceOpen),
        (WhileParenClose, Semicolon, WhileEnd),
        (WhileParenClose, Statement, WhileSingleStatement),
        (WhileParenClose, If, WhileSingleStatement),
        (WhileParenClose, While, WhileSingleStatement),
        (WhileParenClose, Do, WhileSingleStatement),
        (WhileParenClose, For, WhileSingleStatement),
        (WhileParenClose, Function, WhileSingleStatement),
        (WhileSingleStatement, Lambda, WhileEnd),
        (WhileBraceOpen, BraceClose, WhileEnd),
        (WhileBraceOpen, Semicolon, WhileStatement),
        (WhileBraceOpen, Statement, WhileStatement),
        (WhileBraceOpen, If, WhileStatement),
        (WhileBraceOpen, While, WhileStatement),
        (WhileBraceOpen, Do, WhileStatement),
        (WhileBraceOpen, For, WhileStatement),
        (WhileBraceOpen, Function, WhileStatement),
        (WhileStatement, Semicolon, WhileStatement),
        (WhileStatement, Statement, WhileStatement),
        (WhileStatement, If, WhileStatement),
        (WhileStatement, While, WhileStatement),
        (WhileStatement, Do, WhileStatement),
        (WhileStatement, For, WhileStatement),
        (WhileStatement, Function, WhileStatement),
        (WhileStatement, BraceClose, WhileEnd),
        // ── do-while ─────────────────────────────────────────────────────
        (DoWhileStart, BraceOpen, DoWhileBraceOpen),
        (DoWhileBraceOpen, BraceClose, DoWhileBraceClose),
        (DoWhileBraceOpen, Semicolon, DoWhileStatement),
        (DoWhileBraceOpen, Statement, DoWhileStatement),
        (DoWhileBraceOpen, If, DoWhileStatement),
        (DoWhileBraceOpen, While, DoWhileStatement),
        (DoWhileBraceOpen, Do, DoWhileStatement),
        (DoWhileBraceOpen, For, DoWhileStatement),
        (DoWhileBraceOpen, Function, DoWhileStatement),
        (DoWhileStatement, Semicolon, DoWhileStatement),
        (DoWhileStatement, Statement, DoWhileStatement),
        (DoWhileStatement, If, DoWhileStatement),
        (DoWhileStatement, While, DoWhileStatement),
        (DoWhileStatement, Do, DoWhileStatement),
        (DoWhileStatement, For, DoWhileStatement),
        (DoWhileStatement, Function, DoWhileStatement),
        (DoWhileStatement, BraceClose, DoWhileBraceClose),
        (DoWhileBraceClose, While, DoWhileKeyword),
        (DoWhileKeyword, ParenOpen, DoWhileParenOpen),
        (DoWhileParenOpen, Semicolon, DoWhileParenStatement),
        (DoWhileParenOpen, Statement, DoWhileParenStatement),
        (DoWhileParenStatement, Semicolon, DoWhileParenStatement),
        (DoWhileParenStatement, Statement, DoWhileParenStatement),
        (DoWhileParenStatement, ParenClose, DoWhileParenClose),
        (DoWhileParenClose, Semicolon, DoWhileEnd),
        // ── if-then ──────────────────────────────────────────────────────
        (IfStart, ParenOpen, IfParenOpen),
        (IfStart, Semicolon, IfThenEnd),
        (IfParenOpen, Statement, IfParenStatement),
        (IfParenStatement, Statement, IfParenStatement),
        (IfParenStatement, ParenClose, IfParenClose),
        (IfParenClose, BraceOpen, IfThenBraceOpen),
        (IfParenClose, Semicolon, IfThenEnd),
        (IfParenClose, Statement, IfThenSingleStatement),
        (IfParenClose, If, IfThenSingleStatement),
        (IfParenClose, While, IfThenSingleStatement),
        (IfParenClose, Do, IfThenSingleStatement),
        (IfParenClose, For, IfThenSingleStatement),
        (IfParenClose, Function, IfThenSingleStatement),
        (IfThenSingleStatement, Lambda, IfThenEnd),
        (IfThenSingleStatement, Else, IfElse),
        (IfThenBraceOpen, BraceClose, IfThenEnd),
        (IfThenBraceOpen, Semicolon, IfThenStatement),
        (IfThenBraceOpen, Statement, IfThenStatement),
        (IfThenBraceOpen, If, IfThenStatement),
        (IfThenBraceOpen, While, IfThenStatement),
        (IfThenBraceOpen, Do, IfThenStatement),
        (IfThenBraceOpen, For, IfThenStatement),
        (IfThenBraceOpen, Function, IfThenStatement),
        (IfThenStatement, Semicolon, IfThenStatement),
        (IfThenStatement, Statement, IfThenStatement),
        (IfThenStatement, If, IfThenStatement),
        (IfThenStatement, While, IfThenStatement),
        (IfThenStatement, Do, IfThenStatement),
        (IfThenStatement, For, IfThenStatement),
        (IfThenStatement, Function, IfThenStatement),
        (IfThenStatement, BraceClose, IfThenEnd),
        // ── else-if ──────────────────────────────────────────────────────
        (IfElse, If, ElseIfStatement),
        (ElseIfStatement, Lambda, ElseIfEnd),
        (ElseIfStatement, Else, IfElse),
        // ── else ─────────────────────────────────────────────────────────
        (IfThenEnd, Else, IfElse),
        (IfElse, Semicolon, IfElseEnd),
        (IfElse, Statement, IfElseSingleStatement),
        (IfElse, While, IfElseSingleStatement),
        (IfElse, Do, IfElseSingleStatement),
        (IfElse, For, IfElseSingleStatement),
        (IfElse, Function, IfElseSingleStatement),
        (IfElseSingleStatement, Lambda, IfElseEnd),
        (IfElse, BraceOpen, IfElseBraceOpen),
        (IfElseBraceOpen, BraceClose, IfElseEnd),
        (IfElseBraceOpen, Semicolon, IfElseStatement),
        (IfElseBraceOpen, Statement, IfElseStatement),
        (IfElseBraceOpen, If, IfElseStatement),
        (IfElseBraceOpen, While, IfElseStatement),
        (IfElseBraceOpen, Do, IfElseStatement),
        (IfElseBraceOpen, For, IfElseStatement),
        (IfElseBraceOpen, Function, IfElseStatement),
        (IfElseStatement, Semicolon, IfElseStatement),
        (IfElseStatement, Statement, IfElseStatement),
        (IfElseStatement, If, IfElseStatement),
        (IfElseStatement, While, IfElseStatement),
        (IfElseStatement, Do, IfElseStatement),
        (IfElseStatement, For, IfElseStatement),
        (IfElseStatement, Function, IfElseStatement),
        (IfElseStatement, BraceClose, IfElseEnd),
        // ── for ──────────────────────────────────────────────────────────
        (ForStart, ParenOpen, ForParenOpen),
        (ForParenOpen, Semicolon, ForInitEnd),
        (ForParenOpen, Statement, ForInit),
        (ForInit, Semicolon, ForInitEnd),
        (ForInitEnd, Semicolon, ForCondEnd),
        (ForInitEnd, Statement, ForCond),
        (ForCond, Semicolon, ForCondEnd),
        (ForCondEnd, ParenClose, ForParenClose),
        (ForCondEnd, Statement, ForModify),
        (ForModify, ParenClose, ForParenClose),
        (ForParenClose, Semicolon, ForEnd),
        (ForParenClose, Statement, ForSingleStatement),
        (ForParenClose, If, ForSingleStatement),
        (ForParenClose, While, ForSingleStatement),
        (ForParenClose, Do, ForSingleStatement),
        (ForParenClose, For, ForSingleStatement),
        (ForParenClose, Function, ForSingleStatement),
        (ForSingleStatement, Lambda, ForEnd),
        (ForParenClose, BraceOpen, ForBraceOpen),
        (ForBraceOpen, BraceClose, ForEnd),
        (ForBraceOpen, Semicolon, ForStatement),
        (ForBraceOpen, Statement, ForStatement),
        (ForBraceOpen, If, ForStatement),
        (ForBraceOpen, While, ForStatement),
        (ForBraceOpen, Do, ForStatement),
        (ForBraceOpen, For, ForStatement),
        (ForBraceOpen, Function, ForStatement),
        (ForStatement, Semicolon, ForStatement),
        (ForStatement, Statement, ForStatement),
        (ForStatement, If, ForStatement),
        (ForStatement, While, ForStatement),
        (ForStatement, Do, ForStatement),
        (ForStatement, For, ForStatement),
        (ForStatement, Function, ForStatement),
        (ForStatement, BraceClose, ForEnd),
        // ── function ─────────────────────────────────────────────────────
        (FuncStart, BraceOpen, FuncBraceOpen),
        (FuncStart, Semicolon, FuncEnd),
        (FuncBraceOpen, BraceClose, FuncEnd),
        (FuncBraceOpen, Semicolon, FuncStatement),
        (FuncBraceOpen, Statement, FuncStatement),
        (FuncBraceOpen, If, FuncStatement),
        (FuncBraceOpen, While, FuncStatement),
        (FuncBraceOpen, Do, FuncStatement),
        (FuncBraceOpen, For, FuncStatement),
        (FuncBraceOpen, Function, FuncStatement),
        (FuncStatement, Semicolon, FuncStatement),
        (FuncStatement, Statement, FuncStatement),
        (FuncStatement, If, FuncStatement),
        (FuncStatement, While, FuncStatement),
        (FuncStatement, Do, FuncStatement),
        (FuncStatement, For, FuncStatement),
        (FuncStatement, Function, FuncStatement),
        (FuncStatement, BraceClose, FuncEnd),
    ]
};

/// The assembled transition table.
pub struct FsmTable {
    table: [[FsmState; TokenKind::COUNT]; FsmState::COUNT],
}

impl FsmTable {
    /// Build the table from [`TRANSITIONS`], asserting that no triple
    /// conflicts with an earlier one.
    pub fn new() -> Self {
        let mut table = [[FsmState::Error; TokenKind::COUNT]; FsmState::COUNT];

        for &(from, input, to) in TRANSITIONS {
            let slot = &mut table[from.index()][input.index()];
            assert!(
                *slot == FsmState::Error || *slot == to,
                "conflicting FSM transitions from {from:?} on {input:?}: {slot:?} vs {to:?}",
            );
            *slot = to;
        }

        Self { table }
    }

    /// Look up the transition for `input` in `state`. Unset entries are
    /// [`FsmState::Error`].
    pub fn next(&self, state: FsmState, input: TokenKind) -> FsmState {
        self.table[state.index()][input.index()]
    }
}

impl Default for FsmTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn table_builds_without_conflicts() {
        FsmTable::new();
    }

    #[rstest]
    #[case(TokenKind::Statement, FsmState::StatementStart)]
    #[case(TokenKind::Semicolon, FsmState::StatementStart)]
    #[case(TokenKind::If, FsmState::IfStart)]
    #[case(TokenKind::While, FsmState::WhileStart)]
    #[case(TokenKind::Do, FsmState::DoWhileStart)]
    #[case(TokenKind::For, FsmState::ForStart)]
    #[case(TokenKind::Function, FsmState::FuncStart)]
    fn dispatch_row(#[case] input: TokenKind, #[case] expected: FsmState) {
        let table = FsmTable::new();
        assert_eq!(table.next(FsmState::InitStart, input), expected);
        assert!(is_start_state(expected));
    }

    #[test]
    fn unset_entries_default_to_error() {
        let table = FsmTable::new();
        assert_eq!(
            table.next(FsmState::InitStart, TokenKind::Else),
            FsmState::Error
        );
        assert_eq!(
            table.next(FsmState::WhileEnd, TokenKind::Statement),
            FsmState::Error
        );
        assert_eq!(
            table.next(FsmState::DoWhileStart, TokenKind::Statement),
            FsmState::Error
        );
    }

    #[test]
    fn body_states_accept_every_nested_opener() {
        let table = FsmTable::new();
        let openers = [
            TokenKind::Statement,
            TokenKind::Semicolon,
            TokenKind::If,
            TokenKind::While,
            TokenKind::Do,
            TokenKind::For,
            TokenKind::Function,
        ];
        for body in [
            FsmState::WhileStatement,
            FsmState::DoWhileStatement,
            FsmState::IfThenStatement,
            FsmState::IfElseStatement,
            FsmState::ForStatement,
            FsmState::FuncStatement,
        ] {
            for opener in openers {
                assert_eq!(table.next(body, opener), body, "{body:?} on {opener:?}");
            }
        }
    }

    #[test]
    fn single_statement_bodies_close_on_epsilon() {
        let table = FsmTable::new();
        assert_eq!(
            table.next(FsmState::WhileSingleStatement, TokenKind::Lambda),
            FsmState::WhileEnd
        );
        assert_eq!(
            table.next(FsmState::IfThenSingleStatement, TokenKind::Lambda),
            FsmState::IfThenEnd
        );
        assert_eq!(
            table.next(FsmState::IfElseSingleStatement, TokenKind::Lambda),
            FsmState::IfElseEnd
        );
        assert_eq!(
            table.next(FsmState::ForSingleStatement, TokenKind::Lambda),
            FsmState::ForEnd
        );
    }

    #[rstest]
    #[case(FsmState::StatementStart, Some(DecompKind::P1))]
    #[case(FsmState::StatementEnd, Some(DecompKind::P1))]
    #[case(FsmState::IfStart, Some(DecompKind::D0))]
    #[case(FsmState::IfThenEnd, Some(DecompKind::D0End))]
    #[case(FsmState::IfThenSingleStatement, Some(DecompKind::D0End))]
    #[case(FsmState::IfElse, Some(DecompKind::D1))]
    #[case(FsmState::IfElseEnd, Some(DecompKind::D1End))]
    #[case(FsmState::ElseIfStatement, Some(DecompKind::D1End))]
    #[case(FsmState::WhileStart, Some(DecompKind::D2))]
    #[case(FsmState::WhileEnd, Some(DecompKind::D2End))]
    #[case(FsmState::DoWhileStart, Some(DecompKind::D3))]
    #[case(FsmState::DoWhileParenClose, Some(DecompKind::D3End))]
    #[case(FsmState::ForStart, Some(DecompKind::P1))]
    #[case(FsmState::ForInitEnd, Some(DecompKind::P1))]
    #[case(FsmState::ForCond, Some(DecompKind::D0))]
    #[case(FsmState::ForCondEnd, Some(DecompKind::D0))]
    #[case(FsmState::ForEnd, Some(DecompKind::D0End))]
    #[case(FsmState::FuncStart, Some(DecompKind::F1))]
    #[case(FsmState::FuncEnd, Some(DecompKind::F1End))]
    #[case(FsmState::InitStart, None)]
    #[case(FsmState::Error, None)]
    fn state_to_decomposition_kind(
        #[case] state: FsmState,
        #[case] expected: Option<DecompKind>,
    ) {
        assert_eq!(decomp_kind_for(state), expected);
    }
}
