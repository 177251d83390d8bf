//! Phase 2: Indentation Lexer
//!
//! The lexer turns the scanner's flat token list into the stream the parser
//! reads. It tracks indentation widths on a stack and emits:
//! - `Indent`: when a line is indented deeper than the previous one (block start)
//! - `Dedent` + `NewLine`: once for every level a line dedents past (block end)
//! - `End`: after the last token
//!
//! Every token is stamped with its one-based source line. Lines holding only
//! whitespace or comments are ignored for indentation, and the line breaks
//! around them are merged into a single `NewLine`.

use crate::token::{Payload, Token, TokenKind};
use std::cmp::Ordering;
use std::collections::VecDeque;

/// Lazy token stream with synthetic block markers.
pub struct Lexer {
    raw: std::vec::IntoIter<Token>,
    pending: VecDeque<Token>,
    /// Widths of the open blocks, `0` at the bottom.
    stack: Vec<usize>,
    current_indent: usize,
    after_newline: bool,
    /// Line of the token being processed.
    line: usize,
    last_kind: Option<TokenKind>,
    finished: bool,
}

impl Lexer {
    /// `first_line` is the line number of the first scanned character.
    pub fn new(tokens: Vec<Token>, first_line: usize) -> Self {
        Self {
            raw: drop_blank_lines(tokens).into_iter(),
            pending: VecDeque::new(),
            stack: vec![0],
            current_indent: 0,
            after_newline: true,
            line: first_line,
            last_kind: None,
            finished: false,
        }
    }

    fn emit(&mut self, token: Token) {
        self.last_kind = Some(token.kind);
        self.pending.push_back(token);
    }

    fn process(&mut self, token: Token) {
        let mut change = Ordering::Equal;
        if self.after_newline {
            let indent = match token.kind {
                TokenKind::Indent => token.width(),
                _ => 0,
            };
            change = indent.cmp(&self.current_indent);
            self.current_indent = indent;
        }

        let token = if token.kind == TokenKind::NewLine {
            let stamped = token.at_line(self.line);
            self.line += stamped.width();
            self.after_newline = true;
            stamped
        } else {
            self.after_newline = false;
            token.at_line(self.line)
        };

        match change {
            Ordering::Less => self.close_blocks(self.current_indent),
            Ordering::Greater => {
                self.stack.push(self.current_indent);
                self.emit(token);
                return;
            }
            Ordering::Equal => {}
        }

        if token.kind != TokenKind::Indent {
            self.emit(token);
        }
    }

    /// Pop every open block wider than `indent`.
    fn close_blocks(&mut self, indent: usize) {
        while let Some(&top) = self.stack.last() {
            if top <= indent {
                break;
            }
            self.stack.pop();
            self.emit(Token::count(TokenKind::Dedent, top).at_line(self.line));
            self.emit(Token::count(TokenKind::NewLine, 0).at_line(self.line));
        }
    }

    /// Close the blocks still open at end of input, then emit `End`.
    fn finish(&mut self) {
        if self.stack.len() > 1 && self.last_kind != Some(TokenKind::NewLine) {
            self.emit(Token::count(TokenKind::NewLine, 0).at_line(self.line));
        }
        self.close_blocks(0);
        self.emit(Token::symbol(TokenKind::End).at_line(self.line));
        self.finished = true;
    }
}

impl Iterator for Lexer {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Some(token);
            }
            if self.finished {
                return None;
            }
            match self.raw.next() {
                Some(token) => self.process(token),
                None => self.finish(),
            }
        }
    }
}

/// Drop indentation of lines with no content and merge adjacent line breaks.
fn drop_blank_lines(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut iter = tokens.into_iter().peekable();

    while let Some(token) = iter.next() {
        match token.kind {
            TokenKind::Indent
                if iter
                    .peek()
                    .map_or(true, |next| next.kind == TokenKind::NewLine) => {}
            TokenKind::NewLine => match out.last_mut() {
                Some(prev) if prev.kind == TokenKind::NewLine => {
                    prev.payload = Payload::Count(prev.width() + token.width());
                }
                _ => out.push(token),
            },
            _ => out.push(token),
        }
    }

    out
}
