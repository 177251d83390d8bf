//! Token kinds and tokens shared by the scanner, lexer and parser.

use crate::value::Value;
use std::fmt;

/// The closed set of token kinds.
///
/// The names double as the identifiers used in syntax error messages.
/// `Literal` is never emitted: a literal is converted to one of the
/// scalar kinds while scanning. `Comment` and `WhiteSpace` are matched
/// and discarded, `Unknown` aborts the scan, and `Dedent` and `End` are
/// only ever produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    String,
    Integer,
    Float,
    Boolean,
    NoneValue,
    Literal,
    Comma,
    Colon,
    EqualSign,
    Hyphen,
    LeftRound,
    RightRound,
    LeftSquare,
    RightSquare,
    LeftBrace,
    RightBrace,
    Comment,
    Indent,
    Dedent,
    NewLine,
    WhiteSpace,
    Unknown,
    End,
}

impl TokenKind {
    /// Stable identifier of the kind.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::String => "String",
            TokenKind::Integer => "Integer",
            TokenKind::Float => "Float",
            TokenKind::Boolean => "Boolean",
            TokenKind::NoneValue => "NoneValue",
            TokenKind::Literal => "Literal",
            TokenKind::Comma => "Comma",
            TokenKind::Colon => "Colon",
            TokenKind::EqualSign => "EqualSign",
            TokenKind::Hyphen => "Hyphen",
            TokenKind::LeftRound => "LeftRound",
            TokenKind::RightRound => "RightRound",
            TokenKind::LeftSquare => "LeftSquare",
            TokenKind::RightSquare => "RightSquare",
            TokenKind::LeftBrace => "LeftBrace",
            TokenKind::RightBrace => "RightBrace",
            TokenKind::Comment => "Comment",
            TokenKind::Indent => "Indent",
            TokenKind::Dedent => "Dedent",
            TokenKind::NewLine => "NewLine",
            TokenKind::WhiteSpace => "WhiteSpace",
            TokenKind::Unknown => "Unknown",
            TokenKind::End => "End",
        }
    }

    /// Returns `true` for the kinds that carry a scalar value.
    pub fn is_scalar(self) -> bool {
        matches!(
            self,
            TokenKind::String
                | TokenKind::Integer
                | TokenKind::Float
                | TokenKind::Boolean
                | TokenKind::NoneValue
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Payload carried by a token.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Punctuation and `End`.
    Empty,
    /// An already converted scalar.
    Scalar(Value),
    /// Indentation width for `Indent`/`Dedent`, line break count for `NewLine`.
    Count(usize),
}

/// A classified lexical unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub payload: Payload,
    /// One-based source line, stamped by the lexer. Zero until then.
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, payload: Payload) -> Self {
        Self {
            kind,
            payload,
            line: 0,
        }
    }

    /// A token without payload.
    pub fn symbol(kind: TokenKind) -> Self {
        Self::new(kind, Payload::Empty)
    }

    pub fn scalar(kind: TokenKind, value: Value) -> Self {
        Self::new(kind, Payload::Scalar(value))
    }

    pub fn count(kind: TokenKind, count: usize) -> Self {
        Self::new(kind, Payload::Count(count))
    }

    pub(crate) fn at_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }

    /// Width of an `Indent`/`Dedent` or line count of a `NewLine`, zero otherwise.
    pub fn width(&self) -> usize {
        match self.payload {
            Payload::Count(n) => n,
            _ => 0,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.payload {
            Payload::Empty => write!(f, "{}()", self.kind),
            Payload::Scalar(value) => write!(f, "{}({})", self.kind, value),
            Payload::Count(n) => write!(f, "{}({})", self.kind, n),
        }
    }
}
