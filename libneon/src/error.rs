//! Error types for NEON decoding.

use crate::token::{Token, TokenKind};
use thiserror::Error;

/// Result type for NEON decoding operations.
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Decode context carrying the filename for error reporting.
#[derive(Clone, Debug, Default)]
pub struct ParseContext {
    pub filename: Option<String>,
}

impl ParseContext {
    /// Create a new parse context.
    pub fn new(filename: Option<&str>) -> Self {
        Self {
            filename: filename.map(String::from),
        }
    }

    /// Format a location suffix for error messages.
    pub fn loc_suffix(&self) -> String {
        match &self.filename {
            Some(name) => format!(" in <{}>", name),
            None => String::new(),
        }
    }

    /// Build a lexical error for text no token pattern accepts.
    pub fn lexical(&self, text: &str, line: usize) -> DecodeError {
        DecodeError::Lexical {
            text: text.to_string(),
            line,
            location: self.loc_suffix(),
        }
    }

    /// Build a syntax error for a token whose kind is not among `expected`.
    pub fn unexpected(&self, found: &Token, expected: &[TokenKind]) -> DecodeError {
        let expected = expected
            .iter()
            .map(|kind| kind.name())
            .collect::<Vec<_>>()
            .join(" or ");
        DecodeError::Syntax {
            found: found.to_string(),
            expected,
            line: found.line,
            location: self.loc_suffix(),
        }
    }
}

/// Error type for NEON decoding.
///
/// Both variants are fatal to the decode call that produced them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Text that no token pattern matches.
    #[error("Unknown character sequence {text:?}, line {line}{location}")]
    Lexical {
        text: String,
        line: usize,
        location: String,
    },

    /// A token whose kind does not fit the grammar at its position.
    #[error("Unexpected token {found}, expected {expected}, line {line}{location}")]
    Syntax {
        found: String,
        expected: String,
        line: usize,
        location: String,
    },
}

impl DecodeError {
    /// One-based line the error was detected on.
    pub fn line(&self) -> usize {
        match self {
            DecodeError::Lexical { line, .. } | DecodeError::Syntax { line, .. } => *line,
        }
    }

    pub fn is_lexical(&self) -> bool {
        matches!(self, DecodeError::Lexical { .. })
    }

    pub fn is_syntax(&self) -> bool {
        matches!(self, DecodeError::Syntax { .. })
    }
}
