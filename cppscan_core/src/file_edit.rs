//! Reading files, editing sections of them in memory, writing them back.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{CppScanError, Result};

/// A file's path along with its current (possibly edited) contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContents {
    file_path: PathBuf,
    raw_source: String,
    original_raw_source: String,
}

impl FileContents {
    pub fn read(file_path: impl AsRef<Path>) -> Result<Self> {
        let file_path = file_path.as_ref();
        let raw_source = fs::read_to_string(file_path)?;
        debug!(path = %file_path.display(), bytes = raw_source.len(), "read file");
        Ok(Self::from_text(file_path, raw_source))
    }

    pub fn from_text(file_path: impl Into<PathBuf>, raw_source: impl Into<String>) -> Self {
        let raw_source = raw_source.into();
        Self {
            file_path: file_path.into(),
            original_raw_source: raw_source.clone(),
            raw_source,
        }
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn raw_source(&self) -> &str {
        &self.raw_source
    }

    pub fn is_modified(&self) -> bool {
        self.raw_source != self.original_raw_source
    }

    /// Writes the current contents to the file.
    pub fn update_file(&self) -> Result<()> {
        fs::write(&self.file_path, &self.raw_source)?;
        info!(path = %self.file_path.display(), "updated file");
        Ok(())
    }

    /// Replaces the text in `start..end` with `section`.
    pub fn replace_section(&mut self, section: &str, start: usize, end: usize) -> Result<()> {
        let len = self.raw_source.len();
        if start > end || end > len {
            return Err(CppScanError::file_edit(
                &self.file_path,
                format!("section location [{start}, {end}] is not in [0, {len}]"),
            ));
        }
        if !self.raw_source.is_char_boundary(start) || !self.raw_source.is_char_boundary(end) {
            return Err(CppScanError::file_edit(
                &self.file_path,
                format!("section location [{start}, {end}] splits a character"),
            ));
        }
        self.raw_source.replace_range(start..end, section);
        Ok(())
    }

    /// Finds the text between `start_tag` and the first `end_tag` after it.
    ///
    /// An empty `start_tag` means the start of the file and an empty
    /// `end_tag` the end of the file, but at least one must be given. With
    /// `include_tags` the range covers the tags themselves too. `None` if a
    /// tag is missing.
    pub fn find_tagged_section(
        &self,
        start_tag: &str,
        end_tag: &str,
        include_tags: bool,
    ) -> Result<Option<(usize, usize)>> {
        if start_tag.is_empty() && end_tag.is_empty() {
            return Err(CppScanError::file_edit(
                &self.file_path,
                "must specify at least one tag",
            ));
        }

        let (start, search_from) = if start_tag.is_empty() {
            (0, 0)
        } else {
            let Some(found) = self.raw_source.find(start_tag) else {
                return Ok(None);
            };
            let after_tag = found + start_tag.len();
            (if include_tags { found } else { after_tag }, after_tag)
        };

        let end = if end_tag.is_empty() {
            self.raw_source.len()
        } else {
            let Some(found) = self.raw_source[search_from..].find(end_tag) else {
                return Ok(None);
            };
            let found = search_from + found;
            if include_tags { found + end_tag.len() } else { found }
        };

        Ok(Some((start, end)))
    }

    /// Replaces a tagged section with `replacement`. With `retain_tags` only
    /// the text between the tags changes; otherwise the tags go too.
    ///
    /// Returns `false`, changing nothing, if the section wasn't found.
    pub fn replace_tagged_section(
        &mut self,
        start_tag: &str,
        end_tag: &str,
        replacement: &str,
        retain_tags: bool,
    ) -> Result<bool> {
        match self.find_tagged_section(start_tag, end_tag, !retain_tags)? {
            Some((start, end)) => {
                self.replace_section(replacement, start, end)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
