use std::path::PathBuf;
use thiserror::Error;

use crate::enums::ParseError;
use crate::rewrite::ReplacementError;
use crate::tokenize::{GroupError, LexError};

#[derive(Error, Debug)]
pub enum CppScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Group(#[from] GroupError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Replacement(#[from] ReplacementError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid regex pattern: {0}")]
    Regex(#[from] regex::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Environment variable not set: {0}")]
    EnvVarNotSet(String),

    #[error("Invalid path: {path}")]
    InvalidPath { path: PathBuf },

    #[error("File edit error in {file}: {message}")]
    FileEdit { file: PathBuf, message: String },

    #[error("Expected a semicolon to end the statement starting at offset {raw_offset}")]
    UnterminatedStatement { raw_offset: usize },
}

pub type Result<T> = std::result::Result<T, CppScanError>;

impl CppScanError {
    pub fn config(message: impl Into<String>) -> Self {
        CppScanError::Config(message.into())
    }

    pub fn file_edit(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        CppScanError::FileEdit {
            file: file.into(),
            message: message.into(),
        }
    }

    pub fn invalid_path(path: impl Into<PathBuf>) -> Self {
        CppScanError::InvalidPath { path: path.into() }
    }
}
