use regex::Regex;
use tracing::{debug, trace};

use super::{EnumerationDefinition, EnumeratorDefinition, ParseError, ParseErrorKind};
use crate::tokenize::{Element, Group, Token, TokenKind};

const TAS_ENUMERATOR: &str = "TASENUMERATOR";

/// Finds the enum definitions in a grouped token stream, including those
/// nested inside braces (namespaces, classes, functions), in source order.
///
/// Anything that starts with `enum` but is not shaped like a complete
/// definition (forward declarations, anonymous enums, `enum X {...} x;`) is
/// skipped. Once the shape matches, a malformed enumerator list is an error.
/// When `name_filter` is given, definitions whose name it doesn't match are
/// left out.
pub fn extract_enumerations(
    elements: &[Element],
    name_filter: Option<&Regex>,
) -> Result<Vec<EnumerationDefinition>, ParseError> {
    let mut definitions = Vec::new();
    find_enumerations(elements, name_filter, &mut definitions)?;
    debug!(count = definitions.len(), "extracted enum definitions");
    Ok(definitions)
}

fn find_enumerations(
    items: &[Element],
    name_filter: Option<&Regex>,
    out: &mut Vec<EnumerationDefinition>,
) -> Result<(), ParseError> {
    let mut offset = 0;
    while offset < items.len() {
        if let Some(candidate) = match_enum_shape(items, offset) {
            let wanted = name_filter.is_none_or(|re| re.is_match(&candidate.name.text));
            if wanted {
                out.push(candidate.parse()?);
            } else {
                trace!(name = %candidate.name.text, "enum name does not match the filter");
            }
            offset = candidate.next;
            continue;
        }

        match &items[offset] {
            Element::Group(group) if group.opener() == TokenKind::LeftBrace => {
                find_enumerations(&group.nested, name_filter, out)?;
            }
            element if element.is_identifier("enum") => {
                trace!(offset = element.raw_start(), "not an enum definition");
            }
            _ => {}
        }
        offset += 1;
    }
    Ok(())
}

/// The parts of `enum [class|struct] Name [: Type] { ... } ;`.
struct Candidate<'a> {
    name: &'a Token,
    is_scoped: bool,
    underlying_type: Option<String>,
    body: &'a Group,
    /// Index of the element after the semicolon.
    next: usize,
}

fn identifier_at(items: &[Element], i: usize) -> Option<&Token> {
    items
        .get(i)?
        .as_token()
        .filter(|t| t.kind == TokenKind::Identifier)
}

fn match_enum_shape(items: &[Element], offset: usize) -> Option<Candidate<'_>> {
    let mut i = offset;
    if !items.get(i)?.is_identifier("enum") {
        return None;
    }
    i += 1;

    let is_scoped = items.get(i)?.is_identifier("class") || items.get(i)?.is_identifier("struct");
    if is_scoped {
        i += 1;
    }

    let name = identifier_at(items, i)?;
    i += 1;

    let mut underlying_type = None;
    if items.get(i)?.is_token_kind(TokenKind::Colon) {
        underlying_type = Some(identifier_at(items, i + 1)?.text.clone());
        i += 2;
    }

    let body = items
        .get(i)?
        .as_group()
        .filter(|g| g.opener() == TokenKind::LeftBrace)?;
    i += 1;

    if !items.get(i)?.is_token_kind(TokenKind::Semicolon) {
        return None;
    }

    Some(Candidate {
        name,
        is_scoped,
        underlying_type,
        body,
        next: i + 1,
    })
}

impl Candidate<'_> {
    fn parse(&self) -> Result<EnumerationDefinition, ParseError> {
        let enumerators = self.parse_enumerator_list()?;
        Ok(EnumerationDefinition::new(
            self.name.text.clone(),
            self.is_scoped,
            self.underlying_type.clone(),
            enumerators,
        ))
    }

    fn error(&self, raw_offset: usize, kind: ParseErrorKind) -> ParseError {
        ParseError {
            enum_name: self.name.text.clone(),
            raw_offset,
            kind,
        }
    }

    fn parse_enumerator_list(&self) -> Result<Vec<EnumeratorDefinition>, ParseError> {
        let items = &self.body.nested;
        if items.is_empty() {
            return Err(self.error(self.body.raw_start(), ParseErrorKind::EmptyEnumeratorList));
        }

        let commas: Vec<usize> = items
            .iter()
            .filter(|e| e.is_token_kind(TokenKind::Comma))
            .map(Element::raw_start)
            .collect();
        let mut splits: Vec<&[Element]> = items
            .split(|e| e.is_token_kind(TokenKind::Comma))
            .collect();
        // One trailing comma is allowed.
        if splits.len() > 1 && splits.last().is_some_and(|s| s.is_empty()) {
            splits.pop();
        }

        splits
            .iter()
            .enumerate()
            .map(|(i, split)| {
                if split.is_empty() {
                    let at = commas.get(i).copied().unwrap_or(self.body.raw_start());
                    return Err(self.error(at, ParseErrorKind::EmptyEnumerator));
                }
                self.parse_enumerator(split)
            })
            .collect()
    }

    fn parse_enumerator(&self, items: &[Element]) -> Result<EnumeratorDefinition, ParseError> {
        let (name, display_name, mut offset) = match items {
            [first, Element::Group(group), ..]
                if first.is_identifier(TAS_ENUMERATOR) && group.opener() == TokenKind::LeftParen =>
            {
                let (name, display_name) = self.parse_tas_enumerator(group)?;
                (name, Some(display_name), 2)
            }
            [Element::Token(first), ..] if first.kind == TokenKind::Identifier => {
                (first.text.clone(), None, 1)
            }
            _ => {
                let at = items.first().map_or(self.body.raw_start(), Element::raw_start);
                return Err(self.error(at, ParseErrorKind::ExpectedEnumeratorName));
            }
        };

        if let Some(next) = items.get(offset) {
            if !next.is_token_kind(TokenKind::Assign) {
                return Err(self.error(next.raw_start(), ParseErrorKind::ExpectedAssign));
            }
            if offset + 1 >= items.len() {
                return Err(self.error(next.raw_start(), ParseErrorKind::MissingValue));
            }
            offset += 1;
        }

        Ok(EnumeratorDefinition::new(
            name,
            display_name,
            items[offset..].to_vec(),
        ))
    }

    /// `TASENUMERATOR(identifier, "display name")`.
    fn parse_tas_enumerator(&self, group: &Group) -> Result<(String, String), ParseError> {
        match group.nested.as_slice() {
            [Element::Token(name), Element::Token(comma), Element::Token(display)]
                if name.kind == TokenKind::Identifier
                    && comma.kind == TokenKind::Comma
                    && display.kind == TokenKind::String =>
            {
                Ok((name.text.clone(), string_literal_contents(&display.text).to_string()))
            }
            _ => Err(self.error(group.raw_start(), ParseErrorKind::MalformedTasEnumerator)),
        }
    }
}

/// The characters between the quotes of an ordinary string literal,
/// escapes left as written.
fn string_literal_contents(literal: &str) -> &str {
    match literal.find('"') {
        Some(open) if literal.len() >= open + 2 => &literal[open + 1..literal.len() - 1],
        _ => literal,
    }
}

/// Value of an integer literal, ignoring its suffix. `None` if it doesn't
/// fit in an `i64`.
pub fn parse_integer_literal(text: &str) -> Option<i64> {
    let digits = text.trim_end_matches(['u', 'U', 'l', 'L', 'z', 'Z']);
    let (body, radix) = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        (hex, 16)
    } else if let Some(binary) = digits
        .strip_prefix("0b")
        .or_else(|| digits.strip_prefix("0B"))
    {
        (binary, 2)
    } else if digits.len() > 1 && digits.starts_with('0') {
        (&digits[1..], 8)
    } else {
        (digits, 10)
    };
    if body.is_empty() || !body.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    i64::from_str_radix(body, radix).ok()
}
