//! Command-line interface definitions for cppscan.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// cppscan - C++ source tooling for tokenizing, enum extraction and rewriting
#[derive(Parser, Debug)]
#[command(name = "cppscan")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to cppscan.toml configuration file
    #[arg(short, long, global = true, env = "CPPSCAN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output (-v, -vv, -vvv for increasing verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all log output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// The log filter used when `RUST_LOG` is not set.
    pub fn default_log_filter(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Print the tokens of C++ files
    Tokenize(TokenizeArgs),

    /// Print the enum definitions found in C++ files
    Enums(EnumsArgs),

    /// Generate printing functions for the enums in C++ files
    EnumToString(EnumToStringArgs),

    /// Wrap string literals in logging statements with the flash-string macro
    AddFlashstr(AddFlashstrArgs),

    /// Find calls passing string literals that are not stored in flash
    FindStrings(FindStringsArgs),
}

#[derive(Args, Debug, Clone)]
pub struct TokenizeArgs {
    /// C++ files, or directories to search for them
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Include comments and preprocessor directives
    #[arg(long, conflicts_with = "grouped")]
    pub all: bool,

    /// Print the tokens nested into bracket groups
    #[arg(long)]
    pub grouped: bool,
}

#[derive(Args, Debug, Clone)]
pub struct EnumsArgs {
    /// C++ files, or directories to search for them
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Only enums whose name matches this regex (overrides config file)
    #[arg(long)]
    pub pattern: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "pretty")]
    pub format: OutputFormat,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Json,
}

#[derive(Args, Debug, Clone)]
pub struct EnumToStringArgs {
    /// C++ files, or directories to search for them
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Only enums whose name matches this regex (overrides config file)
    #[arg(long)]
    pub pattern: Option<String>,

    /// Replace the generated sections of the header and source files
    #[arg(long)]
    pub update: bool,
}

#[derive(Args, Debug, Clone)]
pub struct AddFlashstrArgs {
    /// C++ files, or directories to search for them
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Print the statements that would change without writing the files
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct FindStringsArgs {
    /// C++ files, or directories to search for them
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}
