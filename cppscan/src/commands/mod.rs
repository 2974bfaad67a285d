//! Command handlers for the cppscan CLI.

pub mod add_flashstr;
pub mod enum_to_string;
pub mod enums;
pub mod find_strings;
pub mod tokenize;

use cppscan_core::error::{CppScanError, Result};
use cppscan_core::source::{HEADER_EXTENSIONS, SOURCE_EXTENSIONS};
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

fn is_cpp_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| HEADER_EXTENSIONS.contains(&ext) || SOURCE_EXTENSIONS.contains(&ext))
}

/// Expands the command-line paths into the files to process. Files are
/// taken as given; directories are searched recursively for C++ files, which
/// are returned sorted.
pub fn collect_input_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(path)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .map(|e| e.into_path())
                .filter(|p| is_cpp_file(p))
                .collect();
            found.sort();
            if found.is_empty() {
                warn!("No C++ files found in {:?}", path);
            }
            debug!("Found {} C++ files in {:?}", found.len(), path);
            files.extend(found);
        } else {
            return Err(CppScanError::invalid_path(path));
        }
    }
    Ok(files)
}

/// The enum name filter: the command-line pattern if given, else the one
/// from the configuration.
pub fn enum_name_filter(pattern: Option<&str>, configured: Option<Regex>) -> Result<Option<Regex>> {
    match pattern {
        Some(pattern) => Ok(Some(Regex::new(pattern)?)),
        None => Ok(configured),
    }
}
