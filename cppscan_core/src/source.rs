//! A C++ file held in memory, with its tokens computed on demand.

use once_cell::unsync::OnceCell;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::enums::{EnumerationDefinition, extract_enumerations};
use crate::error::{CppScanError, Result};
use crate::file_edit::FileContents;
use crate::rewrite::{Replacement, apply_replacements};
use crate::tokenize::{Element, Lexer, Token, group_tokens};

pub const HEADER_EXTENSIONS: &[&str] = &["h", "hh", "hpp", "hxx", "h++"];
pub const SOURCE_EXTENSIONS: &[&str] = &["c", "cc", "cpp", "cxx", "c++", "ino"];

/// Which tokens to return from [`CppSource::tokens`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenFilter {
    /// Language tokens only.
    #[default]
    Source,
    /// Comments and preprocessor directives too.
    All,
}

#[derive(Debug, Clone)]
pub struct CppSource {
    file_path: Option<PathBuf>,
    raw_source: String,
    grouped: OnceCell<Vec<Element>>,
}

impl CppSource {
    pub fn new(file_path: impl Into<PathBuf>, raw_source: impl Into<String>) -> Self {
        Self {
            file_path: Some(file_path.into()),
            raw_source: raw_source.into(),
            grouped: OnceCell::new(),
        }
    }

    pub fn from_text(raw_source: impl Into<String>) -> Self {
        Self {
            file_path: None,
            raw_source: raw_source.into(),
            grouped: OnceCell::new(),
        }
    }

    pub fn from_file(file_path: impl AsRef<Path>) -> Result<Self> {
        let file_path = file_path.as_ref();
        let raw_source = fs::read_to_string(file_path)?;
        debug!(path = %file_path.display(), bytes = raw_source.len(), "loaded source");
        Ok(Self::new(file_path, raw_source))
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn raw_source(&self) -> &str {
        &self.raw_source
    }

    /// The path for messages, `<text>` when there is none.
    pub fn display_name(&self) -> String {
        self.file_path
            .as_ref()
            .map_or_else(|| "<text>".to_string(), |p| p.display().to_string())
    }

    /// One-based line of a raw offset. Offsets past the end count as the
    /// last line.
    pub fn line_number(&self, raw_offset: usize) -> usize {
        let end = raw_offset.min(self.raw_source.len());
        self.raw_source.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() + 1
    }

    pub fn file_contents(&self) -> FileContents {
        FileContents::from_text(self.file_path.clone().unwrap_or_default(), self.raw_source.clone())
    }

    fn lexer(&self) -> Lexer<'_> {
        let lexer = Lexer::new(&self.raw_source);
        match &self.file_path {
            Some(path) => lexer.with_file_path(path),
            None => lexer,
        }
    }

    pub fn tokens(&self, filter: TokenFilter) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        for token in self.lexer() {
            let token = token?;
            if filter == TokenFilter::All || token.kind.is_language() {
                tokens.push(token);
            }
        }
        debug!(file = %self.display_name(), count = tokens.len(), ?filter, "tokenized");
        Ok(tokens)
    }

    /// Language tokens nested into bracket groups. Computed once.
    pub fn grouped_tokens(&self) -> Result<&[Element]> {
        let grouped = self.grouped.get_or_try_init(|| -> Result<Vec<Element>> {
            Ok(group_tokens(self.tokens(TokenFilter::Source)?)?)
        })?;
        Ok(grouped)
    }

    pub fn enum_definitions(
        &self,
        name_filter: Option<&Regex>,
    ) -> Result<Vec<EnumerationDefinition>> {
        Ok(extract_enumerations(self.grouped_tokens()?, name_filter)?)
    }

    fn has_extension(&self, extensions: &[&str]) -> bool {
        self.file_path
            .as_deref()
            .and_then(Path::extension)
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| extensions.contains(&ext))
    }

    pub fn is_header_file(&self) -> bool {
        self.has_extension(HEADER_EXTENSIONS)
    }

    pub fn is_source_file(&self) -> bool {
        self.has_extension(SOURCE_EXTENSIONS)
    }

    /// Headers in the same directory sharing this file's stem.
    pub fn find_header_paths(&self) -> Vec<PathBuf> {
        self.find_paired_paths(HEADER_EXTENSIONS)
    }

    /// Source files in the same directory sharing this file's stem.
    pub fn find_source_paths(&self) -> Vec<PathBuf> {
        self.find_paired_paths(SOURCE_EXTENSIONS)
    }

    fn find_paired_paths(&self, extensions: &[&str]) -> Vec<PathBuf> {
        let Some(path) = self.file_path.as_deref() else {
            return Vec::new();
        };
        let Some(stem) = path.file_stem() else {
            return Vec::new();
        };
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut paths: Vec<PathBuf> = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| p.file_stem() == Some(stem))
            .filter(|p| {
                p.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| extensions.contains(&ext))
            })
            .collect();
        paths.sort();
        paths
    }

    /// A new source with `replacements` applied to the raw text.
    pub fn edit(&self, replacements: &[Replacement]) -> Result<CppSource> {
        let raw_source = apply_replacements(&self.raw_source, replacements)?;
        Ok(Self {
            file_path: self.file_path.clone(),
            raw_source,
            grouped: OnceCell::new(),
        })
    }

    /// Writes the raw text to the file this source came from.
    pub fn write_back(&self) -> Result<()> {
        let Some(path) = &self.file_path else {
            return Err(CppScanError::file_edit(self.display_name(), "source has no file path"));
        };
        fs::write(path, &self.raw_source)?;
        debug!(path = %path.display(), "wrote source");
        Ok(())
    }
}
