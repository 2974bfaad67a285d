//! Wrapping string literals of logging statements in a flash-string macro,
//! and finding calls that still pass plain string literals.

use tracing::{debug, trace};

use crate::config::Exemptions;
use crate::error::{CppScanError, Result};
use crate::rewrite::Replacement;
use crate::tokenize::{Element, Group, Token, TokenKind};

fn is_statement_start(element: &Element, prefixes: &[String]) -> bool {
    element.as_token().is_some_and(|token| {
        token.kind == TokenKind::Identifier
            && prefixes.iter().any(|prefix| token.text.starts_with(prefix.as_str()))
    })
}

/// Finds the statements beginning with an identifier that starts with one of
/// `prefixes`. Each statement runs through the next `;` at the same nesting
/// level. Brace groups are searched too; other groups are not.
pub fn find_logging_statements<'a>(
    elements: &'a [Element],
    prefixes: &[String],
) -> Result<Vec<&'a [Element]>> {
    let mut statements = Vec::new();
    collect_statements(elements, prefixes, &mut statements)?;
    debug!(count = statements.len(), "found logging statements");
    Ok(statements)
}

fn collect_statements<'a>(
    elements: &'a [Element],
    prefixes: &[String],
    statements: &mut Vec<&'a [Element]>,
) -> Result<()> {
    let mut ndx = 0;
    while ndx < elements.len() {
        let element = &elements[ndx];
        if is_statement_start(element, prefixes) {
            let semicolon = elements[ndx + 1..]
                .iter()
                .position(|e| e.is_token_kind(TokenKind::Semicolon))
                .ok_or(CppScanError::UnterminatedStatement {
                    raw_offset: element.raw_start(),
                })?;
            let beyond = ndx + 1 + semicolon + 1;
            statements.push(&elements[ndx..beyond]);
            ndx = beyond;
            continue;
        }
        if let Some(group) = element.as_group() {
            if group.opener() == TokenKind::LeftBrace {
                collect_statements(&group.nested, prefixes, statements)?;
            }
        }
        ndx += 1;
    }
    Ok(())
}

/// Replacements wrapping each top-level string literal of `statement` in
/// `wrapper(...)`. Literals inside a group, such as those already wrapped,
/// are left alone.
pub fn flashstr_replacements(statement: &[Element], wrapper: &str) -> Vec<Replacement> {
    let open = format!("{wrapper}(");
    let mut replacements = Vec::new();
    for token in statement.iter().filter_map(Element::as_token) {
        if !token.kind.is_string_literal() {
            continue;
        }
        trace!(offset = token.raw_start, "wrapping string literal");
        replacements.push(Replacement::before(token, open.as_str()));
        replacements.push(Replacement::after(token, ")"));
    }
    replacements
}

/// All replacements for the logging statements in `elements`.
pub fn logging_replacements(
    elements: &[Element],
    prefixes: &[String],
    wrapper: &str,
) -> Result<Vec<Replacement>> {
    let replacements: Vec<Replacement> = find_logging_statements(elements, prefixes)?
        .into_iter()
        .flat_map(|statement| flashstr_replacements(statement, wrapper))
        .collect();
    debug!(count = replacements.len(), "computed wrapper insertions");
    Ok(replacements)
}

/// A call whose argument list directly contains a string literal.
#[derive(Debug, Clone, Copy)]
pub struct StringCall<'a> {
    pub identifier: &'a Token,
    pub arguments: &'a Group,
}

impl StringCall<'_> {
    /// The call as two elements, for dumping or stringifying.
    pub fn elements(&self) -> [Element; 2] {
        [
            Element::Token(self.identifier.clone()),
            Element::Group(self.arguments.clone()),
        ]
    }
}

/// Finds each identifier followed by a parenthesized group that directly
/// contains a string literal, unless the identifier is exempt. Every group
/// is searched, so a later result may lie inside an earlier one.
pub fn find_calls_with_strings<'a>(
    elements: &'a [Element],
    exemptions: &Exemptions,
) -> Vec<StringCall<'a>> {
    let mut calls = Vec::new();
    collect_calls(elements, exemptions, &mut calls);
    debug!(count = calls.len(), "found calls with plain string literals");
    calls
}

fn collect_calls<'a>(
    elements: &'a [Element],
    exemptions: &Exemptions,
    calls: &mut Vec<StringCall<'a>>,
) {
    for (ndx, element) in elements.iter().enumerate() {
        let Some(group) = element.as_group() else {
            continue;
        };
        if ndx > 0 && group.opener() == TokenKind::LeftParen {
            if let Some(identifier) = elements[ndx - 1].as_token() {
                let has_string = group
                    .nested
                    .iter()
                    .filter_map(Element::as_token)
                    .any(|t| t.kind.is_string_literal());
                if identifier.kind == TokenKind::Identifier
                    && has_string
                    && !exemptions.is_exempt(&identifier.text)
                {
                    calls.push(StringCall {
                        identifier,
                        arguments: group,
                    });
                }
            }
        }
        collect_calls(&group.nested, exemptions, calls);
    }
}
