//! Table-driven tokenizer
//!
//! A tokenizer is built from a list of `(TokenKind, pattern)` pairs. The
//! patterns are joined into a single alternation with one capture group per
//! entry, so earlier entries win when several could match at the same
//! position. Kinds listed as ignored (whitespace, comments) are dropped
//! from the normal stream, and every match passes through a remap hook
//! that may change its kind or text (`42` lexes as a name and is remapped
//! to an integer).
//!
//! The gurk table ends in a catch-all `Error` entry, so no input character
//! is ever silently skipped.

use regex::{CaptureMatches, Regex};
use std::fmt;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Str,
    Int,
    Atom,
    Name,
    Whitespace,
    Comment,
    /// Input that no other entry accepts
    Error,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::LeftParen => "'('",
            TokenKind::RightParen => "')'",
            TokenKind::LeftBrace => "'{'",
            TokenKind::RightBrace => "'}'",
            TokenKind::Str => "string",
            TokenKind::Int => "integer",
            TokenKind::Atom => "atom",
            TokenKind::Name => "name",
            TokenKind::Whitespace => "whitespace",
            TokenKind::Comment => "comment",
            TokenKind::Error => "invalid input",
        };
        f.write_str(name)
    }
}

/// A token with source position information
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Byte offset of the match in the source
    pub position: usize,
    /// Line number (0-indexed)
    pub line: usize,
    /// Column number (0-indexed, in characters)
    pub column: usize,
}

impl Token {
    pub fn span(&self) -> (usize, usize) {
        (self.position, self.position + self.text.len())
    }
}

/// Post-match hook: may rewrite the kind and text of every token
pub type Remap = fn(TokenKind, &str) -> (TokenKind, String);

fn identity(kind: TokenKind, text: &str) -> (TokenKind, String) {
    (kind, text.to_string())
}

pub struct Tokenizer {
    pattern: Regex,
    /// Kind of capture group `t{i}`
    kinds: Vec<TokenKind>,
    ignore: Vec<TokenKind>,
    remap: Remap,
}

impl Tokenizer {
    /// Compile a token table
    ///
    /// Entries are tried in order at each position. Patterns must not
    /// contain capture groups of their own.
    pub fn build(
        table: &[(TokenKind, &str)],
        ignore: &[TokenKind],
        remap: Option<Remap>,
    ) -> Result<Self, regex::Error> {
        let source = table
            .iter()
            .enumerate()
            .map(|(i, (_, pattern))| format!("(?P<t{}>{})", i, pattern))
            .collect::<Vec<_>>()
            .join("|");
        Ok(Tokenizer {
            pattern: Regex::new(&source)?,
            kinds: table.iter().map(|(kind, _)| *kind).collect(),
            ignore: ignore.to_vec(),
            remap: remap.unwrap_or(identity),
        })
    }

    /// Tokens with ignored kinds filtered out
    pub fn tokenize<'s>(&'s self, source: &'s str) -> TokenStream<'s> {
        let ignore = &self.ignore;
        TokenStream::new(
            self.matches(source)
                .filter(move |token| !ignore.contains(&token.kind)),
        )
    }

    /// Every token, including whitespace and comments
    pub fn tokenize_with_ignored<'s>(&'s self, source: &'s str) -> TokenStream<'s> {
        TokenStream::new(self.matches(source))
    }

    fn matches<'s>(&'s self, source: &'s str) -> Matches<'s> {
        Matches {
            tokenizer: self,
            captures: self.pattern.captures_iter(source),
            source,
            scanned: 0,
            line: 0,
            line_start: 0,
        }
    }
}

struct Matches<'s> {
    tokenizer: &'s Tokenizer,
    captures: CaptureMatches<'s, 's>,
    source: &'s str,
    /// Byte offset up to which newlines have been counted
    scanned: usize,
    line: usize,
    line_start: usize,
}

impl Matches<'_> {
    fn advance_to(&mut self, position: usize) {
        for (offset, ch) in self.source[self.scanned..position].char_indices() {
            if ch == '\n' {
                self.line += 1;
                self.line_start = self.scanned + offset + 1;
            }
        }
        self.scanned = position;
    }
}

impl Iterator for Matches<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let captures = self.captures.next()?;
        // Table patterns have no groups of their own, so group i+1 is entry i
        let (index, matched) = captures
            .iter()
            .skip(1)
            .enumerate()
            .find_map(|(i, group)| group.map(|m| (i, m)))?;

        self.advance_to(matched.start());
        let column = self.source[self.line_start..matched.start()].chars().count();
        let (kind, text) = (self.tokenizer.remap)(self.tokenizer.kinds[index], matched.as_str());

        Some(Token {
            kind,
            text,
            position: matched.start(),
            line: self.line,
            column,
        })
    }
}

/// Token iterator with pushback
///
/// `push` returns a token to the front of the stream, letting the parser
/// look one token ahead and change its mind.
pub struct TokenStream<'s> {
    tokens: Box<dyn Iterator<Item = Token> + 's>,
    pushed: Vec<Token>,
    last: Option<Token>,
}

impl<'s> TokenStream<'s> {
    fn new(tokens: impl Iterator<Item = Token> + 's) -> Self {
        TokenStream {
            tokens: Box::new(tokens),
            pushed: Vec::new(),
            last: None,
        }
    }

    pub fn push(&mut self, token: Token) {
        self.pushed.push(token);
    }

    /// The most recently returned token
    pub fn last_token(&self) -> Option<&Token> {
        self.last.as_ref()
    }

    pub fn peek(&mut self) -> Option<&Token> {
        if self.pushed.is_empty() {
            let token = self.tokens.next()?;
            self.pushed.push(token);
        }
        self.pushed.last()
    }
}

impl Iterator for TokenStream<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let token = self.pushed.pop().or_else(|| self.tokens.next())?;
        self.last = Some(token.clone());
        Some(token)
    }
}

const NAME_CHARS: &str = r##"[^\s(){}"#]"##;

/// The gurk token table, in priority order
fn gurk_table() -> Vec<(TokenKind, String)> {
    vec![
        (TokenKind::Str, r#""(?:[^"\\]|\\.)*""#.to_string()),
        // An unterminated string swallows the rest of the input
        (TokenKind::Error, r#""(?:[^"\\]|\\.)*\\?"#.to_string()),
        (TokenKind::LeftParen, r"\(".to_string()),
        (TokenKind::RightParen, r"\)".to_string()),
        (TokenKind::LeftBrace, r"\{".to_string()),
        (TokenKind::RightBrace, r"\}".to_string()),
        (TokenKind::Comment, r"#[^\n]*".to_string()),
        (TokenKind::Whitespace, r"\s+".to_string()),
        (TokenKind::Atom, format!(":{}+", NAME_CHARS)),
        (TokenKind::Name, format!(r##"[^\s(){{}}"#:]{}*"##, NAME_CHARS)),
        (TokenKind::Error, r"(?s:.)".to_string()),
    ]
}

fn is_integer(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

fn gurk_remap(kind: TokenKind, text: &str) -> (TokenKind, String) {
    match kind {
        TokenKind::Name if is_integer(text) => (TokenKind::Int, text.to_string()),
        TokenKind::Atom => (TokenKind::Atom, text[1..].to_string()),
        _ => (kind, text.to_string()),
    }
}

static GURK: LazyLock<Tokenizer> = LazyLock::new(|| {
    let table = gurk_table();
    let entries: Vec<(TokenKind, &str)> = table
        .iter()
        .map(|(kind, pattern)| (*kind, pattern.as_str()))
        .collect();
    Tokenizer::build(
        &entries,
        &[TokenKind::Whitespace, TokenKind::Comment],
        Some(gurk_remap),
    )
    .expect("gurk token table is a valid regex")
});

/// The shared tokenizer for gurk source
pub fn gurk_tokenizer() -> &'static Tokenizer {
    &GURK
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<(TokenKind, String)> {
        gurk_tokenizer()
            .tokenize(source)
            .map(|t| (t.kind, t.text))
            .collect()
    }

    #[test]
    fn test_basic_tokens() {
        assert_eq!(
            kinds(r#"1 -2 "hi" :ok dup ( ) { }"#),
            vec![
                (TokenKind::Int, "1".to_string()),
                (TokenKind::Int, "-2".to_string()),
                (TokenKind::Str, r#""hi""#.to_string()),
                (TokenKind::Atom, "ok".to_string()),
                (TokenKind::Name, "dup".to_string()),
                (TokenKind::LeftParen, "(".to_string()),
                (TokenKind::RightParen, ")".to_string()),
                (TokenKind::LeftBrace, "{".to_string()),
                (TokenKind::RightBrace, "}".to_string()),
            ]
        );
    }

    #[test]
    fn test_names_with_symbols() {
        let tokens = kinds("n! --fizzbuzz - + 1- _ . !");
        assert!(tokens.iter().all(|(kind, _)| *kind == TokenKind::Name));
        assert_eq!(tokens.len(), 8);
    }

    #[test]
    fn test_adjacent_delimiters() {
        assert_eq!(
            kinds("(1())"),
            vec![
                (TokenKind::LeftParen, "(".to_string()),
                (TokenKind::Int, "1".to_string()),
                (TokenKind::LeftParen, "(".to_string()),
                (TokenKind::RightParen, ")".to_string()),
                (TokenKind::RightParen, ")".to_string()),
            ]
        );
    }

    #[test]
    fn test_comments_ignored_unless_requested() {
        assert_eq!(kinds("1 # one\n2").len(), 2);
        let all: Vec<TokenKind> = gurk_tokenizer()
            .tokenize_with_ignored("1 # one\n2")
            .map(|t| t.kind)
            .collect();
        assert!(all.contains(&TokenKind::Comment));
        assert!(all.contains(&TokenKind::Whitespace));
    }

    #[test]
    fn test_string_with_escaped_quote() {
        assert_eq!(
            kinds(r#""a \" b""#),
            vec![(TokenKind::Str, r#""a \" b""#.to_string())]
        );
    }

    #[test]
    fn test_unclosed_string_is_error() {
        let tokens = kinds(r#"1 "never closed"#);
        assert_eq!(tokens[1].0, TokenKind::Error);
    }

    #[test]
    fn test_positions() {
        let tokens: Vec<Token> = gurk_tokenizer().tokenize("dup\n  swap").collect();
        assert_eq!((tokens[0].line, tokens[0].column), (0, 0));
        assert_eq!((tokens[1].line, tokens[1].column), (1, 2));
        assert_eq!(tokens[1].position, 6);
        assert_eq!(tokens[1].span(), (6, 10));
    }

    #[test]
    fn test_pushback() {
        let mut stream = gurk_tokenizer().tokenize("a b");
        let a = stream.next().unwrap();
        assert_eq!(stream.last_token().unwrap().text, "a");
        stream.push(a);
        assert_eq!(stream.peek().unwrap().text, "a");
        assert_eq!(stream.next().unwrap().text, "a");
        assert_eq!(stream.next().unwrap().text, "b");
        assert!(stream.next().is_none());
    }

    #[test]
    fn test_custom_table() {
        let tokenizer = Tokenizer::build(
            &[
                (TokenKind::Int, r"[0-9]+"),
                (TokenKind::Whitespace, r"\s+"),
                (TokenKind::Error, r"."),
            ],
            &[TokenKind::Whitespace],
            None,
        )
        .unwrap();
        let tokens: Vec<TokenKind> = tokenizer.tokenize("12 x").map(|t| t.kind).collect();
        assert_eq!(tokens, vec![TokenKind::Int, TokenKind::Error]);
    }
}
