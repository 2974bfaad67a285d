//! C++ source tooling: a byte-accurate lexer for C++ with line splices, a
//! bracket grouper, an enum definition extractor, and rewriting of the raw
//! source through offset-based replacements.
//!
//! ```
//! use cppscan_core::source::CppSource;
//!
//! let source = CppSource::from_text("enum class EColor : uint8_t { kRed, kGreen = 4 };");
//! let enums = source.enum_definitions(None).unwrap();
//! assert_eq!(enums[0].name, "EColor");
//! assert_eq!(enums[0].enumerators[1].numeric_value, Some(4));
//! ```

pub mod codegen;
pub mod config;
pub mod enums;
pub mod error;
pub mod file_edit;
pub mod rewrite;
pub mod source;
pub mod tokenize;

pub use error::{CppScanError, Result};
