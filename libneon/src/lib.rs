//! NEON decoder.
//!
//! NEON is an indentation-sensitive configuration format in the spirit of
//! YAML: `key: value` lines, block collections introduced by indentation,
//! inline `[...]`, `{...}` and `(...)` collections, and bare scalars that are
//! typed as integers, floats, booleans, null or strings.
//!
//! # Decoding Pipeline
//!
//! The decoder operates in three phases:
//!
//! 1. **Scanner**: Converts source text into a flat list of classified tokens.
//!
//! 2. **Indentation Lexer**: Lazily re-emits the tokens with explicit block
//!    start/end markers derived from changes in leading whitespace, and stamps
//!    each token with its line.
//!
//! 3. **Value Parser**: Pulls tokens on demand and builds the ordered value tree.
//!
//! The root of a document is always a [`Mapping`].

mod error;
mod lexer;
mod parser;
mod scanner;
mod token;
mod value;

pub use error::{DecodeError, ParseContext, Result};
pub use token::{Payload, Token, TokenKind};
pub use value::{Mapping, Value};

/// Decode a NEON document from a string.
///
/// # Example
///
/// ```
/// use libneon::{decode, Value};
///
/// let doc = decode("port: 8080").unwrap();
/// assert_eq!(doc["port"], Value::from(8080));
/// ```
pub fn decode(input: &str) -> Result<Mapping> {
    decode_with_filename(input, None)
}

/// Decode a NEON document from a string with a filename for error messages.
pub fn decode_with_filename(input: &str, filename: Option<&str>) -> Result<Mapping> {
    let ctx = ParseContext::new(filename);
    let (source, first_line) = trim_source(input);

    // Phase 1: Scan source into tokens
    let tokens = scanner::scan(source, &ctx, first_line)?;

    // Phase 2: Derive block markers while the parser pulls
    let tokens = lexer::Lexer::new(tokens, first_line);

    // Phase 3: Parse tokens into the root mapping
    parser::parse_document(tokens, &ctx)
}

/// Scan a NEON document and return the token stream the parser consumes,
/// including the synthetic `Indent`/`Dedent` markers and the final `End`.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    let ctx = ParseContext::new(None);
    let (source, first_line) = trim_source(input);
    let tokens = scanner::scan(source, &ctx, first_line)?;
    Ok(lexer::Lexer::new(tokens, first_line).collect())
}

/// Strip surrounding whitespace and report the line the remaining text starts on.
fn trim_source(input: &str) -> (&str, usize) {
    let trimmed = input.trim_start();
    let stripped = &input[..input.len() - trimmed.len()];
    (trimmed.trim_end(), 1 + stripped.matches('\n').count())
}
