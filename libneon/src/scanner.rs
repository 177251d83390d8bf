//! Phase 1: Scanner
//!
//! The scanner converts source text into a flat list of tokens. It walks the
//! text once, and at every position tries each rule of a fixed table:
//! - The longest match wins; on equal length the rule listed first wins
//! - Literals run through the scalar cascade (integer, float, boolean, null,
//!   string)
//! - Comments and inline whitespace are consumed and dropped
//! - Leading whitespace becomes an `Indent` token carrying its width
//! - Runs of line breaks become one `NewLine` token carrying their count
//!
//! Text that no rule matches is a lexical error.

use crate::error::{ParseContext, Result};
use crate::token::{Token, TokenKind};
use crate::value::Value;
use num_bigint::BigInt;
use once_cell::sync::Lazy;
use regex::Regex;

/// What a rule does with the text it matched.
#[derive(Clone, Copy)]
enum Action {
    /// Build a token from the matched text.
    Convert(fn(&str) -> Token),
    /// Emit a token of the rule's kind without payload.
    Symbol,
    /// Consume the text without emitting anything.
    Discard,
}

/// One row of the token table.
struct Rule {
    kind: TokenKind,
    pattern: Regex,
    /// Only tried at the start of a line.
    line_start: bool,
    /// Shortens a raw match; used where the pattern needs lookahead.
    extent: Option<fn(&str, usize) -> usize>,
    action: Action,
}

impl Rule {
    fn new(kind: TokenKind, pattern: &str, action: Action) -> Self {
        Self {
            kind,
            pattern: Regex::new(&format!("^(?:{})", pattern)).unwrap(),
            line_start: false,
            extent: None,
            action,
        }
    }

    fn symbol(kind: TokenKind, pattern: &str) -> Self {
        Self::new(kind, pattern, Action::Symbol)
    }

    fn at_line_start(mut self) -> Self {
        self.line_start = true;
        self
    }

    fn with_extent(mut self, extent: fn(&str, usize) -> usize) -> Self {
        self.extent = Some(extent);
        self
    }

    /// Length in bytes of this rule's match at the start of `rest`.
    fn match_len(&self, rest: &str) -> Option<usize> {
        let len = self.pattern.find(rest)?.end();
        let len = match self.extent {
            Some(extent) => extent(rest, len),
            None => len,
        };
        (len > 0).then_some(len)
    }
}

const STRING: &str = r#""[^"\n]*"|'[^'\n]*'"#;

// A literal may not start with a reserved indicator, and may not start with
// `:` or `-` unless another literal character follows. Inside, inline
// whitespace is kept when more literal text follows it.
const LITERAL: &str = r##"(?:[^#"',:=\[\]{}()\x00-\x20!`@\-]|[:\-][^"',\]})\s])(?:[^,:=\]})(\x00-\x20]+|:|[ \t]+[^#,:=\]})(\x00-\x20])*"##;

/// Token rules in priority order.
static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::new(TokenKind::String, STRING, Action::Convert(quoted)),
        Rule::new(TokenKind::Literal, LITERAL, Action::Convert(literal))
            .with_extent(literal_extent),
        Rule::symbol(TokenKind::Comma, ","),
        Rule::symbol(TokenKind::Colon, ":"),
        Rule::symbol(TokenKind::EqualSign, "="),
        Rule::symbol(TokenKind::Hyphen, "-"),
        Rule::symbol(TokenKind::LeftRound, r"\("),
        Rule::symbol(TokenKind::RightRound, r"\)"),
        Rule::symbol(TokenKind::LeftSquare, r"\["),
        Rule::symbol(TokenKind::RightSquare, r"\]"),
        Rule::symbol(TokenKind::LeftBrace, r"\{"),
        Rule::symbol(TokenKind::RightBrace, r"\}"),
        Rule::new(TokenKind::Comment, "#.*", Action::Discard),
        Rule::new(TokenKind::Indent, r"[\t ]+", Action::Convert(indent)).at_line_start(),
        Rule::new(TokenKind::NewLine, r"(?:\r?\n)+", Action::Convert(newline)),
        Rule::new(TokenKind::WhiteSpace, r"[\t ]+", Action::Discard),
    ]
});

/// Everything up to the end of the line, reported when no rule matches.
static UNKNOWN: Lazy<Regex> = Lazy::new(|| Regex::new("^.*").unwrap());

/// Scan source text into tokens.
///
/// `first_line` is the line number of the first character of `source`, used
/// for lexical error messages. Tokens are returned with line 0; the lexer
/// stamps real line numbers.
pub fn scan(source: &str, ctx: &ParseContext, first_line: usize) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < source.len() {
        let rest = &source[pos..];
        let line_start = pos == 0 || source[..pos].ends_with('\n');

        match longest_match(rest, line_start) {
            Some((rule, len)) => {
                let text = &rest[..len];
                match rule.action {
                    Action::Convert(convert) => tokens.push(convert(text)),
                    Action::Symbol => tokens.push(Token::symbol(rule.kind)),
                    Action::Discard => {}
                }
                pos += len;
            }
            None => {
                let text = UNKNOWN
                    .find(rest)
                    .map_or(rest, |m| m.as_str())
                    .trim_end_matches('\r');
                let line = first_line + source[..pos].matches('\n').count();
                return Err(ctx.lexical(text, line));
            }
        }
    }

    Ok(tokens)
}

/// Pick the rule with the longest match; ties go to the earlier rule.
fn longest_match(rest: &str, line_start: bool) -> Option<(&'static Rule, usize)> {
    let mut best: Option<(&'static Rule, usize)> = None;
    for rule in RULES.iter() {
        if rule.line_start && !line_start {
            continue;
        }
        if let Some(len) = rule.match_len(rest) {
            if best.map_or(true, |(_, best_len)| len > best_len) {
                best = Some((rule, len));
            }
        }
    }
    best
}

/// Cut a literal before the first `:` that is followed by whitespace, a
/// separator, a closing bracket, or the end of input.
fn literal_extent(rest: &str, len: usize) -> usize {
    let matched = &rest[..len];
    let head = match matched.chars().next() {
        Some(':') | Some('-') => 2,
        _ => 1,
    };
    for (i, c) in matched.char_indices().skip(head) {
        if c == ':' && ends_literal(rest[i + 1..].chars().next()) {
            return i;
        }
    }
    len
}

fn ends_literal(next: Option<char>) -> bool {
    match next {
        None => true,
        Some(c) => c.is_whitespace() || matches!(c, ',' | ']' | '}' | ')'),
    }
}

fn quoted(text: &str) -> Token {
    let content = &text[1..text.len() - 1];
    Token::scalar(TokenKind::String, Value::String(content.to_string()))
}

fn indent(text: &str) -> Token {
    Token::count(TokenKind::Indent, text.chars().count())
}

fn newline(text: &str) -> Token {
    Token::count(TokenKind::NewLine, text.matches('\n').count())
}

/// Convert a bare literal: integer, then float, then boolean, then null,
/// falling back to the raw text as a string.
fn literal(text: &str) -> Token {
    if let Some(n) = parse_integer(text) {
        return Token::scalar(TokenKind::Integer, Value::Integer(n));
    }
    if let Some(f) = parse_float(text) {
        return Token::scalar(TokenKind::Float, Value::Float(f));
    }
    if let Some(b) = parse_boolean(text) {
        return Token::scalar(TokenKind::Boolean, Value::Bool(b));
    }
    if matches!(text, "null" | "Null" | "NULL") {
        return Token::scalar(TokenKind::NoneValue, Value::Null);
    }
    Token::scalar(TokenKind::String, Value::String(text.to_string()))
}

/// Unsigned decimal digits only.
fn parse_integer(text: &str) -> Option<BigInt> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Decimal float syntax. Requiring a digit keeps `inf` and `nan` strings.
fn parse_float(text: &str) -> Option<f64> {
    if !text.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

fn parse_boolean(text: &str) -> Option<bool> {
    match text {
        "true" | "True" | "TRUE" | "yes" | "Yes" | "YES" => Some(true),
        "false" | "False" | "FALSE" | "no" | "No" | "NO" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Payload;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let ctx = ParseContext::new(None);
        scan(source, &ctx, 1)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn single(source: &str) -> Token {
        let ctx = ParseContext::new(None);
        let mut tokens = scan(source, &ctx, 1).unwrap();
        assert_eq!(tokens.len(), 1, "expected one token for {:?}", source);
        tokens.remove(0)
    }

    #[test]
    fn test_scan_entry() {
        use TokenKind::*;
        assert_eq!(kinds("key: value"), vec![String, Colon, String]);
        assert_eq!(
            kinds("a: [1, 2.5]"),
            vec![String, Colon, LeftSquare, Integer, Comma, Float, RightSquare]
        );
    }

    #[test]
    fn test_literal_cascade() {
        assert_eq!(single("42").payload, Payload::Scalar(Value::from(42)));
        assert_eq!(single("4.2").payload, Payload::Scalar(Value::Float(4.2)));
        assert_eq!(single("yes").payload, Payload::Scalar(Value::Bool(true)));
        assert_eq!(single("FALSE").payload, Payload::Scalar(Value::Bool(false)));
        assert_eq!(single("Null").kind, TokenKind::NoneValue);
        assert_eq!(single("nan").kind, TokenKind::String);
        assert_eq!(single("-5").payload, Payload::Scalar(Value::Float(-5.0)));
        assert_eq!(single("0042").payload, Payload::Scalar(Value::from(42)));
    }

    #[test]
    fn test_quoted_string_has_no_escapes() {
        let token = single(r#""a \n b""#);
        assert_eq!(token.payload, Payload::Scalar(Value::from(r"a \n b")));
        assert_eq!(single("'x: y'").payload, Payload::Scalar(Value::from("x: y")));
    }

    #[test]
    fn test_literal_keeps_inner_colons_and_spaces() {
        let token = single("http://example.com:8080/path");
        assert_eq!(
            token.payload,
            Payload::Scalar(Value::from("http://example.com:8080/path"))
        );
        assert_eq!(single("hello big world").kind, TokenKind::String);
        use TokenKind::*;
        assert_eq!(kinds("a:b: c"), vec![String, Colon, String]);
        assert_eq!(kinds("a b # note"), vec![String]);
    }

    #[test]
    fn test_hyphen_versus_negative_literal() {
        use TokenKind::*;
        assert_eq!(kinds("- 1"), vec![Hyphen, Integer]);
        assert_eq!(kinds("-1"), vec![Float]);
        assert_eq!(kinds("-abc"), vec![String]);
    }

    #[test]
    fn test_indent_only_at_line_start() {
        let ctx = ParseContext::new(None);
        let tokens = scan("a:\n    b: 1", &ctx, 1).unwrap();
        let indent = tokens.iter().find(|t| t.kind == TokenKind::Indent).unwrap();
        assert_eq!(indent.width(), 4);
        assert_eq!(
            tokens.iter().filter(|t| t.kind == TokenKind::Indent).count(),
            1
        );
    }

    #[test]
    fn test_newlines_collapse() {
        let ctx = ParseContext::new(None);
        let tokens = scan("a\n\r\n\nb", &ctx, 1).unwrap();
        assert_eq!(tokens[1].kind, TokenKind::NewLine);
        assert_eq!(tokens[1].width(), 3);
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn test_comments_are_dropped() {
        use TokenKind::*;
        assert_eq!(kinds("a: 1 # one\n# whole line"), vec![String, Colon, Integer, NewLine]);
    }

    #[test]
    fn test_unknown_is_lexical_error() {
        let ctx = ParseContext::new(None);
        let err = scan("a: 1\nb: @ rest", &ctx, 1).unwrap_err();
        assert!(err.is_lexical());
        assert_eq!(err.line(), 2);
        assert_eq!(
            err.to_string(),
            r#"Unknown character sequence "@ rest", line 2"#
        );
    }

    #[test]
    fn test_unknown_text_stops_before_crlf() {
        let ctx = ParseContext::new(None);
        let err = scan("a: @\r\nb: 1", &ctx, 1).unwrap_err();
        assert_eq!(err.to_string(), r#"Unknown character sequence "@", line 1"#);
    }

    #[test]
    fn test_unterminated_string_is_lexical_error() {
        let ctx = ParseContext::new(None);
        assert!(scan("a: \"open", &ctx, 1).unwrap_err().is_lexical());
    }
}
