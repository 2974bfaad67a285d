use std::fmt::Write as _;
use thiserror::Error;
use tracing::debug;

use super::token::{Element, Group, Token, TokenKind};

/// An opening bracket that was never closed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unclosed '{symbol}' at offset {raw_offset}")]
pub struct GroupError {
    pub raw_offset: usize,
    pub symbol: String,
}

/// Nests the tokens between matching `{}`, `[]` and `()` pairs into groups.
///
/// A closer that does not match the innermost open group is kept as an
/// ordinary token at the current level. The innermost opener still open at
/// the end of input is reported as an error.
pub fn group_tokens(tokens: impl IntoIterator<Item = Token>) -> Result<Vec<Element>, GroupError> {
    let mut open: Vec<(Token, Vec<Element>)> = Vec::new();
    let mut current: Vec<Element> = Vec::new();

    for token in tokens {
        if token.kind.closer().is_some() {
            open.push((token, std::mem::take(&mut current)));
            continue;
        }

        let closes_innermost = open
            .last()
            .is_some_and(|(opener, _)| opener.kind.closer() == Some(token.kind));
        if closes_innermost {
            if let Some((start, parent)) = open.pop() {
                let nested = std::mem::replace(&mut current, parent);
                current.push(Element::Group(Group {
                    start,
                    nested,
                    end: token,
                }));
            }
            continue;
        }

        if matches!(
            token.kind,
            TokenKind::RightBrace | TokenKind::RightBracket | TokenKind::RightParen
        ) {
            debug!(
                offset = token.raw_start,
                symbol = %token.text,
                "closer does not match any open group"
            );
        }
        current.push(Element::Token(token));
    }

    match open.pop() {
        Some((opener, _)) => Err(GroupError {
            raw_offset: opener.raw_start,
            symbol: opener.text,
        }),
        None => Ok(current),
    }
}

/// Renders a grouped tree one element per line, indented by depth.
pub fn dump_elements(elements: &[Element]) -> String {
    let mut out = String::new();
    write_elements(&mut out, elements, 0);
    out
}

fn write_elements(out: &mut String, elements: &[Element], depth: usize) {
    let indent = "  ".repeat(depth);
    for element in elements {
        match element {
            Element::Token(token) => {
                let _ = writeln!(out, "{}{:?} {:?}", indent, token.kind, token.text);
            }
            Element::Group(group) => {
                let _ = writeln!(out, "{}{}", indent, group.start.text);
                write_elements(out, &group.nested, depth + 1);
                let _ = writeln!(out, "{}{}", indent, group.end.text);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenize::{Lexer, flatten};

    fn group(raw: &str) -> Result<Vec<Element>, GroupError> {
        let tokens: Vec<Token> = Lexer::new(raw)
            .collect::<Result<_, _>>()
            .expect("lexes");
        group_tokens(tokens)
    }

    #[test]
    fn test_nested_groups() {
        let elements = group("f(a[1], {b});").expect("groups");
        assert_eq!(elements.len(), 3);
        let call = elements[1].as_group().expect("call group");
        assert_eq!(call.opener(), TokenKind::LeftParen);
        assert_eq!(call.nested.len(), 4);
        assert!(call.nested[1].is_group_kind(TokenKind::LeftBracket));
        assert!(call.nested[3].is_group_kind(TokenKind::LeftBrace));
        assert_eq!((call.raw_start(), call.raw_end()), (1, 12));
    }

    #[test]
    fn test_flatten_restores_token_order() {
        let raw = "a{b(c)[d]}e";
        let tokens: Vec<Token> = Lexer::new(raw).collect::<Result<_, _>>().expect("lexes");
        let elements = group_tokens(tokens.clone()).expect("groups");
        let flat: Vec<Token> = flatten(&elements).into_iter().cloned().collect();
        assert_eq!(flat, tokens);
    }

    #[test]
    fn test_unmatched_closer_is_kept_as_token() {
        let elements = group("(a ] b)").expect("groups");
        let paren = elements[0].as_group().expect("group");
        assert!(paren.nested[1].is_token_kind(TokenKind::RightBracket));

        let elements = group("x }").expect("groups");
        assert!(elements[1].is_token_kind(TokenKind::RightBrace));
    }

    #[test]
    fn test_unclosed_opener_reports_innermost() {
        let err = group("{ a ( b").expect_err("unclosed");
        assert_eq!(err.raw_offset, 4);
        assert_eq!(err.symbol, "(");
        assert_eq!(err.to_string(), "unclosed '(' at offset 4");
    }

    #[test]
    fn test_dump_elements() {
        let elements = group("f(x);").expect("groups");
        assert_eq!(
            dump_elements(&elements),
            "Identifier \"f\"\n(\n  Identifier \"x\"\n)\nSemicolon \";\"\n"
        );
    }
}
