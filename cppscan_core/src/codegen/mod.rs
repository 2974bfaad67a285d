//! Source generation and rewriting built on the token tree.

pub mod enum_to_string;
pub mod flashstr;

pub use enum_to_string::{EnumToStringGenerator, GeneratedCode};
pub use flashstr::{
    StringCall, find_calls_with_strings, find_logging_statements, flashstr_replacements,
    logging_replacements,
};
