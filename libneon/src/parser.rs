//! Phase 3: Value Parser
//!
//! The parser pulls tokens from the lexer one at a time and builds the value
//! tree. Every token kind knows how to continue parsing from itself:
//! - Scalars: their own value, nothing more is consumed
//! - `(`: inline mapping with `=` between key and value
//! - `[`: inline sequence
//! - `{`: inline mapping with `:` between key and value
//! - `Indent`: block sequence when the next token is `-`, block mapping otherwise
//!
//! Collections loop through four states: expect an entry, expect a separator,
//! expect a value, done. They are done on their closing bracket, on `Dedent`
//! for blocks, and on `End` for the document.

use crate::error::{ParseContext, Result};
use crate::token::{Payload, Token, TokenKind};
use crate::value::{Mapping, Value};

/// Kinds accepted as a mapping key (`key := scalar`).
const KEY_KINDS: &[TokenKind] = &[
    TokenKind::String,
    TokenKind::Integer,
    TokenKind::Float,
    TokenKind::Boolean,
    TokenKind::NoneValue,
];

/// Kinds that can start a value.
const VALUE_KINDS: &[TokenKind] = &[
    TokenKind::String,
    TokenKind::Integer,
    TokenKind::Float,
    TokenKind::Boolean,
    TokenKind::NoneValue,
    TokenKind::LeftRound,
    TokenKind::LeftSquare,
    TokenKind::LeftBrace,
    TokenKind::Indent,
];

/// Deepest collection nesting accepted; past it only scalars may appear.
pub const MAX_DEPTH: usize = 128;

/// Token source with a single slot of pushback.
pub struct TokenStream<'a, I> {
    tokens: I,
    pushed: Option<Token>,
    line: usize,
    /// Collections currently open.
    depth: usize,
    ctx: &'a ParseContext,
}

impl<'a, I: Iterator<Item = Token>> TokenStream<'a, I> {
    pub fn new(tokens: I, ctx: &'a ParseContext) -> Self {
        Self {
            tokens,
            pushed: None,
            line: 1,
            depth: 0,
            ctx,
        }
    }

    /// Pull the next token. Past the end of input this keeps returning `End`.
    pub fn advance(&mut self) -> Token {
        if let Some(token) = self.pushed.take() {
            return token;
        }
        match self.tokens.next() {
            Some(token) => {
                self.line = token.line;
                token
            }
            None => Token::symbol(TokenKind::End).at_line(self.line),
        }
    }

    /// Pull the next token and require it to be one of `kinds`.
    pub fn expect(&mut self, kinds: &[TokenKind]) -> Result<Token> {
        let token = self.advance();
        if kinds.contains(&token.kind) {
            Ok(token)
        } else {
            Err(self.ctx.unexpected(&token, kinds))
        }
    }

    /// Put a token back; the next `advance` returns it.
    pub fn unread(&mut self, token: Token) {
        debug_assert!(self.pushed.is_none(), "only one token of pushback");
        self.pushed = Some(token);
    }

    /// Enter the collection opened by `opener`.
    fn descend(&mut self, opener: &Token) -> Result<()> {
        if self.depth >= MAX_DEPTH {
            return Err(self.ctx.unexpected(opener, KEY_KINDS));
        }
        self.depth += 1;
        Ok(())
    }

    /// Require the end of a logical line. `End` also ends the line but is
    /// left in the stream.
    fn expect_line_end(&mut self) -> Result<()> {
        let token = self.advance();
        match token.kind {
            TokenKind::NewLine => Ok(()),
            TokenKind::End => {
                self.unread(token);
                Ok(())
            }
            _ => Err(self.ctx.unexpected(&token, &[TokenKind::NewLine])),
        }
    }
}

/// Parse a whole document into its root mapping.
pub fn parse_document<I>(tokens: I, ctx: &ParseContext) -> Result<Mapping>
where
    I: Iterator<Item = Token>,
{
    let mut stream = TokenStream::new(tokens, ctx);

    let mut token = stream.advance();
    while token.kind == TokenKind::NewLine {
        token = stream.advance();
    }
    stream.unread(token);

    parse_entries(&mut stream, TokenKind::End)
}

impl Token {
    /// Turn this token, and whatever follows it in `stream`, into a value.
    pub fn parse<I>(self, stream: &mut TokenStream<'_, I>) -> Result<Value>
    where
        I: Iterator<Item = Token>,
    {
        match self.kind {
            kind if kind.is_scalar() => return Ok(self.into_scalar()),
            TokenKind::LeftRound
            | TokenKind::LeftSquare
            | TokenKind::LeftBrace
            | TokenKind::Indent => stream.descend(&self)?,
            _ => return Err(stream.ctx.unexpected(&self, VALUE_KINDS)),
        }

        let value = match self.kind {
            TokenKind::LeftRound => {
                parse_inline_mapping(stream, TokenKind::EqualSign, TokenKind::RightRound)
                    .map(Value::Mapping)
            }
            TokenKind::LeftSquare => parse_inline_sequence(stream).map(Value::Sequence),
            TokenKind::LeftBrace => {
                parse_inline_mapping(stream, TokenKind::Colon, TokenKind::RightBrace)
                    .map(Value::Mapping)
            }
            _ => parse_block(stream),
        };
        stream.depth -= 1;
        value
    }

    /// Turn this token into a mapping key; only scalars qualify.
    pub fn parse_key<I>(self, stream: &mut TokenStream<'_, I>) -> Result<Value>
    where
        I: Iterator<Item = Token>,
    {
        if self.kind.is_scalar() {
            Ok(self.into_scalar())
        } else {
            Err(stream.ctx.unexpected(&self, KEY_KINDS))
        }
    }

    fn into_scalar(self) -> Value {
        match self.payload {
            Payload::Scalar(value) => value,
            _ => Value::Null,
        }
    }
}

// ============================================================================
// Entries (document and block mappings)
// ============================================================================

/// Parse `key: value` lines until `terminator`.
///
/// A value may start on the following line, which is how a block collection
/// is attached to its key.
fn parse_entries<I>(stream: &mut TokenStream<'_, I>, terminator: TokenKind) -> Result<Mapping>
where
    I: Iterator<Item = Token>,
{
    let mut map = Mapping::new();
    let mut token = stream.advance();

    while token.kind != terminator {
        let key = token.parse_key(stream)?;
        stream.expect(&[TokenKind::Colon])?;

        let mut start = stream.advance();
        if start.kind == TokenKind::NewLine {
            start = stream.advance();
        }
        let value = start.parse(stream)?;
        map.insert(key, value);

        stream.expect_line_end()?;
        token = stream.advance();
    }

    Ok(map)
}

// ============================================================================
// Blocks
// ============================================================================

fn parse_block<I>(stream: &mut TokenStream<'_, I>) -> Result<Value>
where
    I: Iterator<Item = Token>,
{
    let first = stream.advance();
    let is_sequence = first.kind == TokenKind::Hyphen;
    stream.unread(first);

    if is_sequence {
        parse_block_sequence(stream).map(Value::Sequence)
    } else {
        parse_entries(stream, TokenKind::Dedent).map(Value::Mapping)
    }
}

/// Parse `- value` lines until `Dedent`.
fn parse_block_sequence<I>(stream: &mut TokenStream<'_, I>) -> Result<Vec<Value>>
where
    I: Iterator<Item = Token>,
{
    let mut items = Vec::new();
    let mut token = stream.expect(&[TokenKind::Hyphen])?;

    while token.kind != TokenKind::Dedent {
        let mut start = stream.advance();
        // An item may hold a nested block starting on the next line.
        if start.kind == TokenKind::NewLine {
            start = stream.advance();
        }
        items.push(start.parse(stream)?);

        stream.expect_line_end()?;
        token = stream.expect(&[TokenKind::Hyphen, TokenKind::Dedent])?;
    }

    Ok(items)
}

// ============================================================================
// Inline collections
// ============================================================================

/// Parse `key <separator> value` pairs up to `closer`. Entries are separated
/// by commas and a trailing comma is allowed.
fn parse_inline_mapping<I>(
    stream: &mut TokenStream<'_, I>,
    separator: TokenKind,
    closer: TokenKind,
) -> Result<Mapping>
where
    I: Iterator<Item = Token>,
{
    let mut map = Mapping::new();
    let mut token = stream.advance();

    while token.kind != closer {
        let key = token.parse_key(stream)?;
        stream.expect(&[separator])?;
        let value = stream.advance().parse(stream)?;
        map.insert(key, value);

        token = stream.expect(&[TokenKind::Comma, closer])?;
        if token.kind == TokenKind::Comma {
            token = stream.advance();
        }
    }

    Ok(map)
}

fn parse_inline_sequence<I>(stream: &mut TokenStream<'_, I>) -> Result<Vec<Value>>
where
    I: Iterator<Item = Token>,
{
    let mut items = Vec::new();
    let mut token = stream.advance();

    while token.kind != TokenKind::RightSquare {
        items.push(token.parse(stream)?);

        token = stream.expect(&[TokenKind::Comma, TokenKind::RightSquare])?;
        if token.kind == TokenKind::Comma {
            token = stream.advance();
        }
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::scanner::scan;

    fn parse(source: &str) -> Result<Mapping> {
        let ctx = ParseContext::new(None);
        let tokens = scan(source, &ctx, 1)?;
        parse_document(Lexer::new(tokens, 1), &ctx)
    }

    #[test]
    fn test_scalar_entries() {
        let doc = parse("name: neon\ncount: 3\nratio: 0.5\non: yes\nnothing: null").unwrap();
        assert_eq!(doc["name"], Value::from("neon"));
        assert_eq!(doc["count"], Value::from(3));
        assert_eq!(doc["ratio"], Value::from(0.5));
        assert_eq!(doc["on"], Value::from(true));
        assert_eq!(doc["nothing"], Value::Null);
    }

    #[test]
    fn test_inline_collections() {
        let doc =
            parse("seq: [1, 'two', 3,]\nmap: {a: 1, b: [x]}\ntuple: (x = 1, y = 2)").unwrap();
        assert_eq!(
            doc["seq"],
            Value::from(vec![Value::from(1), Value::from("two"), Value::from(3)])
        );
        let map = doc["map"].as_mapping().unwrap();
        assert_eq!(map["a"], Value::from(1));
        assert_eq!(map["b"], Value::from(vec![Value::from("x")]));
        let tuple = doc["tuple"].as_mapping().unwrap();
        assert_eq!(tuple.keys().collect::<Vec<_>>(), vec![&Value::from("x"), &Value::from("y")]);
    }

    #[test]
    fn test_empty_inline_collections() {
        let doc = parse("a: []\nb: {}\nc: ()").unwrap();
        assert_eq!(doc["a"], Value::Sequence(vec![]));
        assert_eq!(doc["b"], Value::Mapping(Mapping::new()));
        assert_eq!(doc["c"], Value::Mapping(Mapping::new()));
    }

    #[test]
    fn test_nested_blocks() {
        let doc =
            parse("server:\n  host: localhost\n  ports:\n    - 80\n    - 443\nname: x").unwrap();
        let server = doc["server"].as_mapping().unwrap();
        assert_eq!(server["host"], Value::from("localhost"));
        assert_eq!(
            server["ports"],
            Value::from(vec![Value::from(80), Value::from(443)])
        );
        assert_eq!(doc["name"], Value::from("x"));
    }

    #[test]
    fn test_block_sequence_of_blocks() {
        let doc = parse("items:\n  -\n    a: 1\n  -\n    a: 2").unwrap();
        let items = doc["items"].as_sequence().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].as_mapping().unwrap()["a"], Value::from(2));
    }

    #[test]
    fn test_scalar_keys() {
        let doc = parse("1: one\ntrue: yes").unwrap();
        assert_eq!(doc.get_key(&Value::from(1)), Some(&Value::from("one")));
        assert_eq!(doc.get_key(&Value::from(true)), Some(&Value::from(true)));
    }

    #[test]
    fn test_unterminated_sequence() {
        let err = parse("a: [1, 2").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unexpected token End(), expected Comma or RightSquare, line 1"
        );
    }

    #[test]
    fn test_missing_colon() {
        let err = parse("a: 1\nb 2").unwrap_err();
        assert!(err.is_syntax());
        assert_eq!(err.line(), 2);
    }

    #[test]
    fn test_collection_as_key() {
        let err = parse("[a]: 1").unwrap_err();
        assert!(err.to_string().starts_with("Unexpected token LeftSquare(), expected String"));
    }

    #[test]
    fn test_punctuation_as_value() {
        let err = parse("a: ,").unwrap_err();
        assert!(err.to_string().starts_with("Unexpected token Comma(), expected String"));
    }

    #[test]
    fn test_punctuation_as_key() {
        let err = parse(": 1").unwrap_err();
        assert!(err.to_string().starts_with("Unexpected token Colon(), expected String"));
    }

    #[test]
    fn test_nesting_limit() {
        let nested = |depth: usize| format!("a: {}{}", "[".repeat(depth), "]".repeat(depth));
        assert!(parse(&nested(MAX_DEPTH)).is_ok());

        let err = parse(&nested(MAX_DEPTH + 1)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unexpected token LeftSquare(), expected String or Integer or Float or Boolean \
             or NoneValue, line 1"
        );
    }

    #[test]
    fn test_pushback_returns_same_token() {
        let ctx = ParseContext::new(None);
        let tokens = vec![Token::symbol(TokenKind::Hyphen).at_line(3)];
        let mut stream = TokenStream::new(tokens.into_iter(), &ctx);
        let first = stream.advance();
        stream.unread(first.clone());
        assert_eq!(stream.advance(), first);
        let end = stream.advance();
        assert_eq!(end.kind, TokenKind::End);
        assert_eq!(end.line, 3);
    }
}
