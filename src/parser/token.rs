//! Token value type for the coarse C-family token stream.
//!
//! Tokens are much coarser than a full C lexer's: a whole statement
//! fragment (`x = a + b`) is a single [`TokenKind::Statement`] token.

use std::fmt;

use smol_str::SmolStr;

/// All token kinds the tokenizer can produce, plus the two synthetic
/// members the FSM table needs to stay rectangular.
///
/// [`TokenKind::Lambda`] is the epsilon input consumed by the parser
/// itself to finalise single-statement bodies, and [`TokenKind::Error`]
/// is the no-transition sentinel; neither is ever produced by the
/// tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TokenKind {
    Semicolon = 0,
    If,
    Else,
    While,
    Do,
    For,
    /// A call-shaped fragment such as `foo(x)` or `int foo(x)`.
    Function,
    ParenOpen,
    ParenClose,
    BraceOpen,
    BraceClose,
    /// Fallback: any run of characters containing none of `(){};`.
    Statement,
    /// Epsilon input; consumed by the parser, never lexed.
    Lambda,
    /// No-transition sentinel; never lexed.
    Error,
}

impl TokenKind {
    /// Number of kinds, i.e. the width of an FSM table row.
    pub const COUNT: usize = 14;

    pub(crate) const fn index(self) -> usize {
        self as usize
    }

    /// Human-readable name for diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Semicolon => "';'",
            Self::If => "'if'",
            Self::Else => "'else'",
            Self::While => "'while'",
            Self::Do => "'do'",
            Self::For => "'for'",
            Self::Function => "function call",
            Self::ParenOpen => "'('",
            Self::ParenClose => "')'",
            Self::BraceOpen => "'{'",
            Self::BraceClose => "'}'",
            Self::Statement => "statement",
            Self::Lambda => "epsilon",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A token: 1-based source line, kind, and the matched lexeme.
///
/// Equality and hashing cover all three fields. Tokens are immutable
/// after construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    pub line: u32,
    pub kind: TokenKind,
    pub sequence: SmolStr,
}

impl Token {
    pub fn new(line: u32, kind: TokenKind, sequence: impl Into<SmolStr>) -> Self {
        Self {
            line,
            kind,
            sequence: sequence.into(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "l: {} t: {} s: {}", self.line, self.kind, self.sequence)
    }
}
