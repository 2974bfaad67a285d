//! Hand-written lexer for the C++ token grammar.
//!
//! Lexing happens over the logical text (line splices removed). Each step
//! tries the rules in a fixed order at the current position; the first rule
//! that matches decides what happens. Token and error positions are mapped
//! back to raw offsets before they leave this module.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::iter::FusedIterator;
use std::path::PathBuf;
use tracing::trace;

use super::splice::LogicalText;
use super::token::{SYMBOLS, Token, TokenKind};

static FLOATING_POINT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:(?:[0-9]+\.[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?|[0-9]+[eE][+-]?[0-9]+)[fFlL]?",
    )
    .expect("Invalid floating point regex")
});

static INTEGER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:0[xX][0-9a-fA-F]+|0[bB][01]+|0[0-7]*|[1-9][0-9]*)(?:[uU](?:ll|LL|l|L|z|Z)?|(?:ll|LL|l|L|z|Z)[uU]?)?",
    )
    .expect("Invalid integer regex")
});

const SIMPLE_ESCAPES: &[u8] = b"'\"?\\abfnrtv";
const MAX_ESCAPE_LEN: usize = 12;
const MAX_RAW_DELIMITER_LEN: usize = 16;
const ERROR_CONTEXT_CHARS: usize = 20;

/// Failure to lex the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub file_path: Option<PathBuf>,
    /// Offset into the raw text at which lexing failed.
    pub raw_offset: usize,
    pub message: String,
    /// Up to 20 characters of raw text before `raw_offset`.
    pub context: String,
    /// Up to 20 characters of raw text starting at `raw_offset`.
    pub found: String,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(path) = &self.file_path {
            write!(f, "{}: ", path.display())?;
        }
        write!(
            f,
            "unable to lex at offset {}: {} (after {:?}, found {:?})",
            self.raw_offset, self.message, self.context, self.found
        )
    }
}

impl std::error::Error for LexError {}

/// Outcome of trying the rules at one position of the logical text.
#[derive(Debug, PartialEq, Eq)]
enum Step {
    Skip(usize),
    Emit {
        kind: TokenKind,
        start: usize,
        end: usize,
    },
    Fail {
        at: usize,
        message: &'static str,
    },
}

/// Iterator over the tokens of a raw text.
///
/// Yields comments and preprocessor directives along with language tokens.
/// After the first error no further items are produced.
pub struct Lexer<'a> {
    source: LogicalText<'a>,
    file_path: Option<PathBuf>,
    pos: usize,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(raw: &'a str) -> Self {
        Self::from_logical(LogicalText::new(raw))
    }

    pub fn from_logical(source: LogicalText<'a>) -> Self {
        Self {
            source,
            file_path: None,
            pos: 0,
            finished: false,
        }
    }

    /// Names the file in any error produced.
    pub fn with_file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    fn make_token(&self, kind: TokenKind, start: usize, end: usize) -> Token {
        let raw = self.source.raw();
        let map = self.source.offset_map();
        let raw_start = map.logical_to_raw(start).unwrap_or(raw.len());
        // Map the last byte rather than `end` so a splice right after the
        // token is not pulled into its raw text.
        let raw_end = map
            .logical_to_raw(end - 1)
            .map_or(raw.len(), |last| last + 1);
        let raw_text = raw[raw_start..raw_end].to_string();
        let text = if kind == TokenKind::RawString {
            raw_text.clone()
        } else {
            self.source.text()[start..end].to_string()
        };
        Token {
            kind,
            text,
            raw_text,
            raw_start,
            raw_end,
        }
    }

    fn error_at(&self, logical: usize, message: &str) -> LexError {
        let raw = self.source.raw();
        let raw_offset = self
            .source
            .logical_to_raw(logical)
            .unwrap_or(raw.len())
            .min(raw.len());
        let before = raw.get(..raw_offset).unwrap_or("");
        let after = raw.get(raw_offset..).unwrap_or("");
        let context_start = before
            .char_indices()
            .rev()
            .nth(ERROR_CONTEXT_CHARS - 1)
            .map_or(0, |(i, _)| i);
        let found_end = after
            .char_indices()
            .nth(ERROR_CONTEXT_CHARS)
            .map_or(after.len(), |(i, _)| i);
        LexError {
            file_path: self.file_path.clone(),
            raw_offset,
            message: message.to_string(),
            context: before[context_start..].to_string(),
            found: after[..found_end].to_string(),
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            if self.pos >= self.source.text().len() {
                self.finished = true;
                return None;
            }
            match scan(self.source.text(), self.pos) {
                Step::Skip(end) => self.pos = end,
                Step::Emit { kind, start, end } => {
                    self.pos = end;
                    return Some(Ok(self.make_token(kind, start, end)));
                }
                Step::Fail { at, message } => {
                    self.finished = true;
                    return Some(Err(self.error_at(at, message)));
                }
            }
        }
    }
}

impl FusedIterator for Lexer<'_> {}

fn is_horizontal_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | 0x0b | 0x0c)
}

fn is_identifier_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_identifier_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn line_end(bytes: &[u8], from: usize) -> usize {
    bytes[from..]
        .iter()
        .position(|&b| b == b'\n' || b == b'\r')
        .map_or(bytes.len(), |i| from + i)
}

fn at_line_start(bytes: &[u8], pos: usize) -> bool {
    pos == 0 || matches!(bytes[pos - 1], b'\n' | b'\r')
}

/// Tries each rule in order at `pos`.
fn scan(text: &str, pos: usize) -> Step {
    let bytes = text.as_bytes();

    if at_line_start(bytes, pos) {
        let mut p = pos;
        while p < bytes.len() && is_horizontal_space(bytes[p]) {
            p += 1;
        }
        if bytes.get(p) == Some(&b'#') {
            return Step::Emit {
                kind: TokenKind::PreprocessorDirective,
                start: p,
                end: line_end(bytes, p),
            };
        }
    }

    if let Some(end) = scan_whitespace(bytes, pos) {
        return Step::Skip(end);
    }

    let rest = &text[pos..];
    if rest.starts_with("[[") {
        if let Some(close) = rest[2..].find("]]") {
            trace!(offset = pos, "discarding attribute specifier");
            return Step::Skip(pos + 2 + close + 2);
        }
    }

    if rest.starts_with("//") {
        return Step::Emit {
            kind: TokenKind::Comment,
            start: pos,
            end: line_end(bytes, pos),
        };
    }
    if rest.starts_with("/*") {
        return match rest[2..].find("*/") {
            Some(close) => Step::Emit {
                kind: TokenKind::Comment,
                start: pos,
                end: pos + 2 + close + 2,
            },
            None => Step::Fail {
                at: pos,
                message: "unterminated block comment",
            },
        };
    }

    if let Some(step) = scan_literal(text, pos) {
        return step;
    }

    let first = bytes[pos];
    if first.is_ascii_digit()
        || (first == b'.' && bytes.get(pos + 1).is_some_and(|b| b.is_ascii_digit()))
    {
        return scan_number(text, pos);
    }

    for (symbol, kind) in SYMBOLS {
        if rest.starts_with(symbol) {
            return Step::Emit {
                kind: *kind,
                start: pos,
                end: pos + symbol.len(),
            };
        }
    }

    if is_identifier_start(first) {
        let len = bytes[pos..]
            .iter()
            .take_while(|&&b| is_identifier_continue(b))
            .count();
        return Step::Emit {
            kind: TokenKind::Identifier,
            start: pos,
            end: pos + len,
        };
    }

    Step::Fail {
        at: pos,
        message: "unexpected character",
    }
}

fn scan_whitespace(bytes: &[u8], pos: usize) -> Option<usize> {
    let mut p = pos;
    while p < bytes.len() && is_horizontal_space(bytes[p]) {
        p += 1;
    }
    match bytes.get(p) {
        Some(b'\r') if bytes.get(p + 1) == Some(&b'\n') => p += 2,
        Some(b'\r') | Some(b'\n') => p += 1,
        _ => {}
    }
    (p > pos).then_some(p)
}

/// Character, string and raw string literals, with their optional encoding
/// prefix. `None` if `pos` does not start one.
fn scan_literal(text: &str, pos: usize) -> Option<Step> {
    let bytes = text.as_bytes();
    for prefix in ["u8", "u", "U", "L", ""] {
        if !text[pos..].starts_with(prefix) {
            continue;
        }
        let p = pos + prefix.len();
        match (bytes.get(p), bytes.get(p + 1)) {
            (Some(b'\''), _) => return Some(scan_character(text, pos, p + 1)),
            (Some(b'"'), _) => return Some(scan_string(bytes, pos, p + 1)),
            (Some(b'R'), Some(b'"')) => return Some(scan_raw_string(text, pos, p + 2)),
            _ => {}
        }
    }
    None
}

fn scan_character(text: &str, start: usize, body: usize) -> Step {
    let bytes = text.as_bytes();
    let fail = |message| Step::Fail { at: start, message };
    let mut p = body;

    match bytes.get(p) {
        None => return fail("unterminated character literal"),
        Some(b'\'') => return fail("empty character literal"),
        Some(b'\n') | Some(b'\r') => return fail("newline in character literal"),
        Some(b'\\') => match bytes.get(p + 1) {
            None => return fail("unterminated character literal"),
            Some(c) if SIMPLE_ESCAPES.contains(c) => p += 2,
            Some(_) => {
                let limit = (p + 1 + MAX_ESCAPE_LEN).min(bytes.len());
                let close = bytes[p + 1..limit]
                    .iter()
                    .take_while(|&&b| b != b'\n' && b != b'\r')
                    .position(|&b| b == b'\'');
                match close {
                    Some(i) => p = p + 1 + i,
                    None => return fail("invalid escape sequence in character literal"),
                }
            }
        },
        Some(_) => {
            p += text[p..].chars().next().map_or(1, char::len_utf8);
        }
    }

    match bytes.get(p) {
        Some(b'\'') => Step::Emit {
            kind: TokenKind::Character,
            start,
            end: p + 1,
        },
        None => fail("unterminated character literal"),
        Some(_) => fail("character literal must contain exactly one character"),
    }
}

fn scan_string(bytes: &[u8], start: usize, body: usize) -> Step {
    let mut p = body;
    loop {
        match bytes.get(p) {
            None => {
                return Step::Fail {
                    at: start,
                    message: "unterminated string literal",
                };
            }
            Some(b'\\') => p += 2,
            Some(b'"') => {
                return Step::Emit {
                    kind: TokenKind::String,
                    start,
                    end: p + 1,
                };
            }
            Some(_) => p += 1,
        }
    }
}

fn scan_raw_string(text: &str, start: usize, delimiter_start: usize) -> Step {
    let bytes = text.as_bytes();
    let mut p = delimiter_start;
    loop {
        match bytes.get(p) {
            Some(b'(') => break,
            Some(&b)
                if p - delimiter_start < MAX_RAW_DELIMITER_LEN
                    && b.is_ascii_graphic()
                    && !matches!(b, b')' | b'\\') =>
            {
                p += 1
            }
            _ => {
                return Step::Fail {
                    at: start,
                    message: "invalid raw string delimiter",
                };
            }
        }
    }

    let closing = format!("){}\"", &text[delimiter_start..p]);
    match text[p + 1..].find(&closing) {
        Some(i) => Step::Emit {
            kind: TokenKind::RawString,
            start,
            end: p + 1 + i + closing.len(),
        },
        None => Step::Fail {
            at: start,
            message: "unterminated raw string literal",
        },
    }
}

fn scan_number(text: &str, pos: usize) -> Step {
    let rest = &text[pos..];
    let float_len = FLOATING_POINT.find(rest).map_or(0, |m| m.end());
    let int_len = INTEGER.find(rest).map_or(0, |m| m.end());

    let (kind, len) = if float_len > int_len {
        (TokenKind::FloatingPoint, float_len)
    } else {
        (TokenKind::Integer, int_len)
    };

    let malformed = Step::Fail {
        at: pos,
        message: "malformed numeric literal",
    };
    if len == 0 {
        return malformed;
    }
    match rest.as_bytes().get(len) {
        Some(&b) if is_identifier_continue(b) => malformed,
        _ => Step::Emit {
            kind,
            start: pos,
            end: pos + len,
        },
    }
}
