//! Offset-based text replacement over the raw source.

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::tokenize::Token;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplacementError {
    #[error("replacement range {start}..{end} is reversed")]
    ReversedRange { start: usize, end: usize },

    #[error("replacement at offset {start} neither removes nor inserts anything")]
    Empty { start: usize },

    #[error("replacement range {start}..{end} extends beyond the end of the text ({len} bytes)")]
    OutOfBounds { start: usize, end: usize, len: usize },

    #[error("replacement offset {offset} is not on a character boundary")]
    NotCharBoundary { offset: usize },

    #[error("replacements {first_start}..{first_end} and {second_start}..{second_end} overlap")]
    Overlap {
        first_start: usize,
        first_end: usize,
        second_start: usize,
        second_end: usize,
    },
}

/// Replace the raw text in `start..end` with `text`. When `start == end`
/// this is an insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Replacement {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

impl Replacement {
    pub fn new(
        start: usize,
        end: usize,
        text: impl Into<String>,
    ) -> Result<Self, ReplacementError> {
        let text = text.into();
        if start > end {
            return Err(ReplacementError::ReversedRange { start, end });
        }
        if start == end && text.is_empty() {
            return Err(ReplacementError::Empty { start });
        }
        Ok(Self { start, end, text })
    }

    /// Inserts `text` immediately before `token`.
    pub fn before(token: &Token, text: impl Into<String>) -> Self {
        Self {
            start: token.raw_start,
            end: token.raw_start,
            text: text.into(),
        }
    }

    /// Inserts `text` immediately after `token`.
    pub fn after(token: &Token, text: impl Into<String>) -> Self {
        Self {
            start: token.raw_end,
            end: token.raw_end,
            text: text.into(),
        }
    }

    /// Replaces the raw text of `token` with `text`.
    pub fn replace(token: &Token, text: impl Into<String>) -> Self {
        Self {
            start: token.raw_start,
            end: token.raw_end,
            text: text.into(),
        }
    }
}

/// Applies all `replacements` to `raw` at once.
///
/// Replacements are ordered by `(start, end)`; insertions at the same offset
/// keep their relative order. Overlapping replacements are rejected, as are
/// empty insertions and offsets beyond the text or inside a multi-byte
/// character.
pub fn apply_replacements(
    raw: &str,
    replacements: &[Replacement],
) -> Result<String, ReplacementError> {
    let mut sorted: Vec<&Replacement> = replacements.iter().collect();
    sorted.sort_by_key(|r| (r.start, r.end));

    for replacement in &sorted {
        let (start, end) = (replacement.start, replacement.end);
        if start > end {
            return Err(ReplacementError::ReversedRange { start, end });
        }
        if start == end && replacement.text.is_empty() {
            return Err(ReplacementError::Empty { start });
        }
        if end > raw.len() {
            return Err(ReplacementError::OutOfBounds {
                start,
                end,
                len: raw.len(),
            });
        }
        for offset in [start, end] {
            if !raw.is_char_boundary(offset) {
                return Err(ReplacementError::NotCharBoundary { offset });
            }
        }
    }

    for pair in sorted.windows(2) {
        if pair[0].end > pair[1].start {
            return Err(ReplacementError::Overlap {
                first_start: pair[0].start,
                first_end: pair[0].end,
                second_start: pair[1].start,
                second_end: pair[1].end,
            });
        }
    }

    let inserted: usize = sorted.iter().map(|r| r.text.len()).sum();
    let mut out = String::with_capacity(raw.len() + inserted);
    let mut pos = 0;
    for replacement in &sorted {
        out.push_str(&raw[pos..replacement.start]);
        out.push_str(&replacement.text);
        pos = replacement.end;
    }
    out.push_str(&raw[pos..]);

    debug!(count = sorted.len(), "applied replacements");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenize::tokenize_source;

    fn replacement(start: usize, end: usize, text: &str) -> Replacement {
        Replacement::new(start, end, text).expect("valid replacement")
    }

    #[test]
    fn test_new_validates() {
        assert_eq!(
            Replacement::new(5, 4, "x"),
            Err(ReplacementError::ReversedRange { start: 5, end: 4 })
        );
        assert_eq!(Replacement::new(3, 3, ""), Err(ReplacementError::Empty { start: 3 }));
        assert!(Replacement::new(3, 4, "").is_ok());
    }

    #[test]
    fn test_apply_in_any_order() {
        let raw = "int a = 1;";
        let out = apply_replacements(
            raw,
            &[replacement(8, 9, "2"), replacement(0, 3, "long"), replacement(4, 4, "*")],
        )
        .expect("applies");
        assert_eq!(out, "long *a = 2;");
    }

    #[test]
    fn test_insertions_at_same_offset_keep_order() {
        let out = apply_replacements("ab", &[replacement(1, 1, "x"), replacement(1, 1, "y")])
            .expect("applies");
        assert_eq!(out, "axyb");
    }

    #[test]
    fn test_insertion_before_span_at_same_start() {
        let out = apply_replacements("abc", &[replacement(1, 2, "B"), replacement(1, 1, "<")])
            .expect("applies");
        assert_eq!(out, "a<Bc");
    }

    #[test]
    fn test_overlap_is_rejected() {
        let err = apply_replacements("abcdef", &[replacement(1, 4, "x"), replacement(3, 5, "y")])
            .expect_err("overlap");
        assert_eq!(
            err,
            ReplacementError::Overlap {
                first_start: 1,
                first_end: 4,
                second_start: 3,
                second_end: 5
            }
        );

        let err = apply_replacements("abcdef", &[replacement(1, 4, "x"), replacement(2, 2, "y")])
            .expect_err("insertion inside span");
        assert!(matches!(err, ReplacementError::Overlap { .. }));
    }

    #[test]
    fn test_out_of_bounds_and_char_boundary() {
        let err = apply_replacements("abc", &[replacement(2, 4, "x")]).expect_err("out of bounds");
        assert_eq!(err, ReplacementError::OutOfBounds { start: 2, end: 4, len: 3 });

        let err = apply_replacements("é", &[replacement(1, 1, "x")]).expect_err("mid character");
        assert_eq!(err, ReplacementError::NotCharBoundary { offset: 1 });
    }

    #[test]
    fn test_token_relative_replacements() {
        let raw = "f(\"a\", x);";
        let tokens = tokenize_source(raw).expect("lexes");
        let string = &tokens[2];
        let ident = &tokens[4];
        let out = apply_replacements(
            raw,
            &[
                Replacement::before(string, "W("),
                Replacement::after(string, ")"),
                Replacement::replace(ident, "y"),
            ],
        )
        .expect("applies");
        assert_eq!(out, "f(W(\"a\"), y);");
    }

    #[test]
    fn test_empty_insertion_is_rejected() {
        let tokens = tokenize_source("abc").expect("lexes");
        let replacements = [
            Replacement::after(&tokens[0], "x"),
            Replacement::before(&tokens[0], ""),
        ];
        let err = apply_replacements("abc", &replacements).expect_err("empty insertion");
        assert_eq!(err, ReplacementError::Empty { start: 0 });

        let out =
            apply_replacements("abc", &[Replacement::replace(&tokens[0], "")]).expect("deletion");
        assert_eq!(out, "");
    }

    #[test]
    fn test_no_replacements_is_identity() {
        assert_eq!(apply_replacements("abc", &[]).expect("applies"), "abc");
    }
}
