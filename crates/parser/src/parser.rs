//! Parser for gurk source
//!
//! Syntax:
//! ```text
//! 42 -7            integer literals
//! "text\n"         string literals (escapes: \" \\ \n \r \t)
//! :name            atom literals
//! (1 "a" x (2))    vector literals; bare names inside are data
//! { dup 1 + }      code blocks
//! name             invoke whatever `name` is bound to
//! # comment        to end of line
//! ```
//!
//! The output is the flat instruction sequence the engine runs; code blocks
//! become `PushCode` with their own nested sequence.

use crate::tokenizer::{Token, TokenKind, TokenStream, gurk_tokenizer};
use gurk_core::{Instruction, Value};
use num_bigint::BigInt;
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at line {}, column {}", .line + 1, .column + 1)]
pub struct ParseError {
    pub message: String,
    /// Line number (0-indexed)
    pub line: usize,
    /// Column number (0-indexed)
    pub column: usize,
}

impl ParseError {
    fn at(token: &Token, message: impl Into<String>) -> Self {
        ParseError {
            message: message.into(),
            line: token.line,
            column: token.column,
        }
    }
}

/// Parse a whole program
pub fn parse(source: &str) -> Result<Vec<Instruction>, ParseError> {
    Parser::new(source).parse()
}

/// Deepest allowed nesting of `{ }` and `( )`
pub const MAX_NESTING: usize = 256;

pub struct Parser<'s> {
    tokens: TokenStream<'s>,
    depth: usize,
}

impl<'s> Parser<'s> {
    pub fn new(source: &'s str) -> Self {
        Parser {
            tokens: gurk_tokenizer().tokenize(source),
            depth: 0,
        }
    }

    pub fn parse(&mut self) -> Result<Vec<Instruction>, ParseError> {
        self.parse_sequence(None)
    }

    /// Parse instructions until `opener`'s closing brace, or end of input
    /// at the top level
    fn parse_sequence(&mut self, opener: Option<&Token>) -> Result<Vec<Instruction>, ParseError> {
        let mut instructions = Vec::new();
        loop {
            let Some(token) = self.tokens.next() else {
                return match opener {
                    Some(open) => Err(ParseError::at(open, "Unclosed code block '{'")),
                    None => Ok(instructions),
                };
            };

            let instruction = match token.kind {
                TokenKind::RightBrace => {
                    if opener.is_some() {
                        return Ok(instructions);
                    }
                    return Err(ParseError::at(&token, "Unexpected '}'"));
                }
                TokenKind::RightParen => {
                    return Err(ParseError::at(&token, "Unexpected ')'"));
                }
                TokenKind::LeftBrace => {
                    self.enter(&token)?;
                    let body = self.parse_sequence(Some(&token))?;
                    self.depth -= 1;
                    Instruction::PushCode(Rc::from(body))
                }
                TokenKind::LeftParen => Instruction::PushLiteral(self.parse_vector(&token)?),
                TokenKind::Name => Instruction::invoke(&token.text),
                TokenKind::Int | TokenKind::Str | TokenKind::Atom => {
                    Instruction::PushLiteral(literal(&token)?)
                }
                TokenKind::Error | TokenKind::Whitespace | TokenKind::Comment => {
                    return Err(invalid(&token));
                }
            };
            instructions.push(instruction);
        }
    }

    /// Parse vector items after `(` up to the matching `)`
    fn parse_vector(&mut self, opener: &Token) -> Result<Value, ParseError> {
        self.enter(opener)?;
        let mut items = Vec::new();
        loop {
            let kind = match self.tokens.peek() {
                Some(token) => token.kind,
                None => return Err(ParseError::at(opener, "Unclosed vector '('")),
            };
            if kind == TokenKind::RightParen {
                self.tokens.next();
                self.depth -= 1;
                return Ok(Value::Vec(Rc::from(items)));
            }
            items.push(self.parse_vector_item(opener)?);
        }
    }

    fn enter(&mut self, opener: &Token) -> Result<(), ParseError> {
        if self.depth >= MAX_NESTING {
            return Err(ParseError::at(opener, "Nesting too deep"));
        }
        self.depth += 1;
        Ok(())
    }

    fn parse_vector_item(&mut self, opener: &Token) -> Result<Value, ParseError> {
        let Some(token) = self.tokens.next() else {
            return Err(ParseError::at(opener, "Unclosed vector '('"));
        };
        match token.kind {
            TokenKind::LeftParen => self.parse_vector(&token),
            TokenKind::Name => Ok(Value::name(&token.text)),
            TokenKind::Int | TokenKind::Str | TokenKind::Atom => literal(&token),
            TokenKind::LeftBrace => Err(ParseError::at(
                &token,
                "Code blocks cannot appear inside a vector literal",
            )),
            TokenKind::RightBrace => Err(ParseError::at(&token, "Unexpected '}' inside vector")),
            TokenKind::RightParen
            | TokenKind::Error
            | TokenKind::Whitespace
            | TokenKind::Comment => Err(invalid(&token)),
        }
    }
}

fn invalid(token: &Token) -> ParseError {
    if token.text.starts_with('"') {
        ParseError::at(token, "Unclosed string literal - missing closing quote")
    } else {
        ParseError::at(token, format!("Unexpected character '{}'", token.text))
    }
}

fn literal(token: &Token) -> Result<Value, ParseError> {
    match token.kind {
        TokenKind::Int => token
            .text
            .parse::<BigInt>()
            .map(Value::Int)
            .map_err(|_| ParseError::at(token, format!("Invalid integer literal: {}", token.text))),
        TokenKind::Str => {
            // The token pattern guarantees both quotes are present
            let raw = &token.text[1..token.text.len() - 1];
            unescape_string(raw)
                .map(Value::str)
                .map_err(|message| ParseError::at(token, message))
        }
        TokenKind::Atom => Ok(Value::atom(&token.text)),
        _ => Err(invalid(token)),
    }
}

/// Process escape sequences in a string literal
///
/// Supported escape sequences:
/// - `\"` -> `"`  (quote)
/// - `\\` -> `\`  (backslash)
/// - `\n` -> newline
/// - `\r` -> carriage return
/// - `\t` -> tab
fn unescape_string(s: &str) -> Result<String, String> {
    let mut result = String::new();
    let mut chars = s.chars();

    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some('"') => result.push('"'),
                Some('\\') => result.push('\\'),
                Some('n') => result.push('\n'),
                Some('r') => result.push('\r'),
                Some('t') => result.push('\t'),
                Some(c) => {
                    return Err(format!(
                        "Unknown escape sequence '\\{}' in string literal. \
                         Supported: \\\" \\\\ \\n \\r \\t",
                        c
                    ));
                }
                None => {
                    return Err("String ends with incomplete escape sequence '\\'".to_string());
                }
            }
        } else {
            result.push(ch);
        }
    }

    Ok(result)
}
