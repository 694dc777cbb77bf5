//! Regex-priority tokenizer.
//!
//! Configured with an ordered list of `(pattern, kind)` rules. Each
//! input line is trimmed, then matched repeatedly against the rules in
//! insertion order, anchored at the front and case-insensitive; the
//! first rule that matches wins, its lexeme is stripped, and matching
//! restarts on the trimmed remainder. A non-empty remainder no rule
//! matches is a [`ParseError::NoRuleMatch`].

use regex::{Regex, RegexBuilder};

use super::errors::ParseError;
use super::token::{Token, TokenKind};

/// The C-family rule set, in priority order. The function pattern sits
/// after the keywords so `if (...)` is never misread as a call, and the
/// statement pattern is the fallback for everything else.
const C_RULES: &[(&str, TokenKind)] = &[
    (r";", TokenKind::Semicolon),
    (r"if", TokenKind::If),
    (r"else", TokenKind::Else),
    (r"while", TokenKind::While),
    (r"do", TokenKind::Do),
    (r"for", TokenKind::For),
    (
        r"[^\(\)\;\{\}]*\s*[^\(\)\;\{\}]+\([^\(\)\;\{\}]*\)",
        TokenKind::Function,
    ),
    (r"\(", TokenKind::ParenOpen),
    (r"\)", TokenKind::ParenClose),
    (r"\{", TokenKind::BraceOpen),
    (r"\}", TokenKind::BraceClose),
    (r"[^\(\)\{\}\;]+", TokenKind::Statement),
];

/// One tokenization rule: an anchored, case-insensitive pattern and the
/// kind it produces.
struct TokenRule {
    matcher: Regex,
    kind: TokenKind,
}

/// Priority-ordered regex matcher turning one line of text into tokens.
pub struct Tokenizer {
    rules: Vec<TokenRule>,
}

impl Tokenizer {
    /// An empty tokenizer with no rules installed.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// A tokenizer loaded with the C-family rule set.
    pub fn with_c_rules() -> Self {
        let mut tokenizer = Self::new();
        for &(pattern, kind) in C_RULES {
            tokenizer
                .add_rule(pattern, kind)
                .expect("builtin token rule must compile");
        }
        tokenizer
    }

    /// Append a rule. Rules are tried in insertion order; the first
    /// match wins regardless of match length.
    pub fn add_rule(&mut self, pattern: &str, kind: TokenKind) -> Result<(), regex::Error> {
        let matcher = RegexBuilder::new(&format!("^(?:{pattern})"))
            .case_insensitive(true)
            .build()?;
        self.rules.push(TokenRule { matcher, kind });
        Ok(())
    }

    /// Strip one line into tokens tagged with its 1-based line number.
    pub fn tokenize(&self, input: &str, line: u32) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();
        let mut rest = input.trim();

        while !rest.is_empty() {
            let hit = self
                .rules
                .iter()
                .find_map(|rule| rule.matcher.find(rest).map(|m| (m.end(), rule.kind)));

            match hit {
                Some((end, kind)) => {
                    tokens.push(Token::new(line, kind, &rest[..end]));
                    rest = rest[end..].trim_start();
                }
                None => return Err(ParseError::no_rule_match(line, rest)),
            }
        }

        Ok(tokens)
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::with_c_rules()
    }
}
