//! C++ tokenization: splice removal, lexing and bracket grouping.

pub mod group;
pub mod lexer;
pub mod splice;
pub mod token;

pub use group::{GroupError, dump_elements, group_tokens};
pub use lexer::{LexError, Lexer};
pub use splice::{LogicalText, OffsetMap};
pub use token::{Element, Group, Token, TokenKind, flatten, stringify_elements, stringify_tokens};

/// Lexes `raw` into all of its tokens, comments and directives included.
pub fn tokenize(raw: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(raw).collect()
}

/// Lexes `raw`, keeping only language tokens.
pub fn tokenize_source(raw: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(raw)
        .filter(|item| item.as_ref().map_or(true, |t| t.kind.is_language()))
        .collect()
}
