//! Phase 2 translation: removal of backslash-newline line splices.
//!
//! The lexer works on the spliced ("logical") text, but every position it
//! reports must point into the original ("raw") text, because that is the
//! text a person edits and the text the rewriter patches. [`OffsetMap`]
//! provides that translation.

use std::borrow::Cow;

/// Breakpoints mapping logical offsets back to raw offsets.
///
/// Stored in descending order of logical offset. The first entry is always
/// `(logical.len(), raw.len())` and the last always has logical offset 0, so
/// every logical offset in `0..=logical.len()` has exactly one governing
/// breakpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetMap {
    breakpoints: Vec<(usize, usize)>,
}

impl OffsetMap {
    fn identity(len: usize) -> Self {
        let mut breakpoints = vec![(len, len)];
        if len > 0 {
            breakpoints.push((0, 0));
        }
        Self { breakpoints }
    }

    /// Length of the logical text this map was built for.
    pub fn logical_len(&self) -> usize {
        self.breakpoints[0].0
    }

    /// Length of the raw text this map was built for.
    pub fn raw_len(&self) -> usize {
        self.breakpoints[0].1
    }

    /// The `(logical, raw)` breakpoints, highest logical offset first.
    pub fn breakpoints(&self) -> &[(usize, usize)] {
        &self.breakpoints
    }

    /// Maps a logical offset to its raw offset. `None` if the offset is past
    /// the end of the logical text.
    pub fn logical_to_raw(&self, logical: usize) -> Option<usize> {
        if logical > self.logical_len() {
            return None;
        }
        let idx = self.breakpoints.partition_point(|&(l, _)| l > logical);
        let (l, r) = self.breakpoints[idx];
        Some(r + (logical - l))
    }

    /// Maps a raw offset to its logical offset. `None` if the raw offset is
    /// inside a removed splice or past the end of the raw text.
    pub fn raw_to_logical(&self, raw: usize) -> Option<usize> {
        if raw > self.raw_len() {
            return None;
        }
        let idx = self.breakpoints.partition_point(|&(_, r)| r > raw);
        let (l, r) = self.breakpoints[idx];
        if idx == 0 {
            return (raw == r).then_some(l);
        }
        let segment_len = self.breakpoints[idx - 1].0 - l;
        (raw - r < segment_len).then_some(l + (raw - r))
    }
}

/// Raw text with its line splices removed.
#[derive(Debug, Clone)]
pub struct LogicalText<'a> {
    raw: &'a str,
    logical: Cow<'a, str>,
    map: OffsetMap,
}

impl<'a> LogicalText<'a> {
    /// Removes every `\` + newline splice from `raw`.
    ///
    /// When there are no splices the logical text borrows `raw`.
    pub fn new(raw: &'a str) -> Self {
        let bytes = raw.as_bytes();
        let mut logical = String::new();
        let mut breakpoints = Vec::new();
        let mut start = 0;
        let mut search = 0;
        let mut spliced = false;

        while let Some(found) = raw[search..].find('\\') {
            let pos = search + found;
            let splice_len = match &bytes[pos + 1..] {
                [b'\n', ..] => 2,
                [b'\r', b'\n', ..] => 3,
                _ => 0,
            };
            if splice_len == 0 {
                search = pos + 1;
                continue;
            }
            spliced = true;
            if pos > start {
                breakpoints.push((logical.len(), start));
                logical.push_str(&raw[start..pos]);
            }
            start = pos + splice_len;
            search = start;
        }

        if !spliced {
            return Self {
                raw,
                logical: Cow::Borrowed(raw),
                map: OffsetMap::identity(raw.len()),
            };
        }

        if start < raw.len() {
            breakpoints.push((logical.len(), start));
            logical.push_str(&raw[start..]);
        }
        if breakpoints.is_empty() {
            // Nothing but splices.
            breakpoints.push((0, raw.len()));
        } else {
            breakpoints.push((logical.len(), raw.len()));
        }
        breakpoints.reverse();

        Self {
            raw,
            logical: Cow::Owned(logical),
            map: OffsetMap { breakpoints },
        }
    }

    pub fn raw(&self) -> &'a str {
        self.raw
    }

    pub fn text(&self) -> &str {
        &self.logical
    }

    pub fn offset_map(&self) -> &OffsetMap {
        &self.map
    }

    /// True if at least one splice was removed.
    pub fn has_splices(&self) -> bool {
        matches!(self.logical, Cow::Owned(_))
    }

    pub fn logical_to_raw(&self, logical: usize) -> Option<usize> {
        self.map.logical_to_raw(logical)
    }

    pub fn raw_to_logical(&self, raw: usize) -> Option<usize> {
        self.map.raw_to_logical(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_splices_borrows_raw() {
        let text = LogicalText::new("int x = 1;\n");
        assert!(!text.has_splices());
        assert_eq!(text.text(), "int x = 1;\n");
        assert_eq!(text.logical_to_raw(4), Some(4));
        assert_eq!(text.logical_to_raw(11), Some(11));
        assert_eq!(text.logical_to_raw(12), None);
    }

    #[test]
    fn test_empty_text() {
        let text = LogicalText::new("");
        assert_eq!(text.text(), "");
        assert_eq!(text.logical_to_raw(0), Some(0));
        assert_eq!(text.raw_to_logical(0), Some(0));
    }

    #[test]
    fn test_single_splice() {
        let text = LogicalText::new("ab\\\ncd");
        assert!(text.has_splices());
        assert_eq!(text.text(), "abcd");
        assert_eq!(text.offset_map().breakpoints(), &[(4, 6), (2, 4), (0, 0)]);
        assert_eq!(text.logical_to_raw(1), Some(1));
        assert_eq!(text.logical_to_raw(2), Some(4));
        assert_eq!(text.logical_to_raw(4), Some(6));
    }

    #[test]
    fn test_consecutive_splices_record_no_empty_segment() {
        let text = LogicalText::new("a\\\n\\\nb");
        assert_eq!(text.text(), "ab");
        assert_eq!(text.offset_map().breakpoints(), &[(2, 6), (1, 5), (0, 0)]);
    }

    #[test]
    fn test_leading_and_trailing_splices() {
        let text = LogicalText::new("\\\nab\\\n");
        assert_eq!(text.text(), "ab");
        assert_eq!(text.logical_to_raw(0), Some(2));
        assert_eq!(text.logical_to_raw(1), Some(3));
        assert_eq!(text.logical_to_raw(2), Some(6));
    }

    #[test]
    fn test_only_splices() {
        let text = LogicalText::new("\\\n\\\n");
        assert_eq!(text.text(), "");
        assert_eq!(text.logical_to_raw(0), Some(4));
    }

    #[test]
    fn test_crlf_splice() {
        let text = LogicalText::new("#define X \\\r\n  1\r\n");
        assert_eq!(text.text(), "#define X   1\r\n");
        assert_eq!(text.logical_to_raw(10), Some(13));
    }

    #[test]
    fn test_escaped_backslash_is_not_a_splice() {
        let text = LogicalText::new("'\\\\' x");
        assert!(!text.has_splices());
    }

    #[test]
    fn test_raw_to_logical_inside_splice_is_undefined() {
        let text = LogicalText::new("ab\\\ncd");
        assert_eq!(text.raw_to_logical(1), Some(1));
        assert_eq!(text.raw_to_logical(2), None);
        assert_eq!(text.raw_to_logical(3), None);
        assert_eq!(text.raw_to_logical(4), Some(2));
        assert_eq!(text.raw_to_logical(6), Some(4));
        assert_eq!(text.raw_to_logical(7), None);
    }

    #[test]
    fn test_round_trip_all_logical_offsets() {
        let text = LogicalText::new("x\\\ny\\\n\\\nz w\\\n");
        for i in 0..=text.text().len() {
            let raw = text.logical_to_raw(i).unwrap();
            assert_eq!(text.raw_to_logical(raw), Some(i), "offset {i}");
        }
    }
}
