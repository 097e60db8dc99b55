//! Gurk front end
//!
//! Turns source text into the instruction sequence the runtime executes.
//!
//! ```rust,ignore
//! let program = gurk_parser::parse("1 2 :math (+) import +")?;
//! ```

pub mod parser;
pub mod tokenizer;

pub use parser::{MAX_NESTING, ParseError, Parser, parse};
pub use tokenizer::{Token, TokenKind, TokenStream, Tokenizer, gurk_tokenizer};
