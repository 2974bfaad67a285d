//! Enumeration definitions found in C++ sources.

mod extract;

pub use extract::{extract_enumerations, parse_integer_literal};

use serde::{Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

use crate::tokenize::{Element, TokenKind, stringify_elements};

/// What was wrong with an enumerator list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("enumeration definitions list is empty")]
    EmptyEnumeratorList,
    #[error("expected non-empty list of tokens between commas")]
    EmptyEnumerator,
    #[error("expected an enumerator name")]
    ExpectedEnumeratorName,
    #[error("expected TASENUMERATOR to be followed by (identifier, string)")]
    MalformedTasEnumerator,
    #[error("expected an equal sign following the enumerator name")]
    ExpectedAssign,
    #[error("expected an enumerator value after the equal sign")]
    MissingValue,
}

/// A malformed enumerator list inside something shaped like an enum
/// definition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at offset {raw_offset}, while parsing enum definition for {enum_name}")]
pub struct ParseError {
    pub enum_name: String,
    pub raw_offset: usize,
    pub kind: ParseErrorKind,
}

fn serialize_initializer<S: Serializer>(
    value: &[Element],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    if value.is_empty() {
        serializer.serialize_none()
    } else {
        serializer.serialize_some(&stringify_elements(value))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumeratorDefinition {
    pub name: String,
    /// Contents of the `TASENUMERATOR` string literal, without the quotes.
    pub display_name: Option<String>,
    /// Initializer expression; empty when the enumerator has none.
    #[serde(rename = "initializer", serialize_with = "serialize_initializer")]
    pub value: Vec<Element>,
    pub numeric_value: Option<i64>,
}

impl EnumeratorDefinition {
    pub fn new(name: impl Into<String>, display_name: Option<String>, value: Vec<Element>) -> Self {
        Self {
            name: name.into(),
            display_name,
            value,
            numeric_value: None,
        }
    }

    /// The name to print for this enumerator: the display name if given,
    /// else the name with a leading `k` removed when followed by an
    /// uppercase letter (`kFooBar` prints as `FooBar`).
    pub fn print_name(&self) -> &str {
        if let Some(display_name) = &self.display_name {
            return display_name;
        }
        let mut chars = self.name.chars();
        match (chars.next(), chars.next()) {
            (Some('k'), Some(c)) if c.is_ascii_uppercase() => &self.name[1..],
            _ => &self.name,
        }
    }

    pub fn quoted_print_name(&self) -> String {
        format!("\"{}\"", self.print_name())
    }

    /// The initializer rendered as source text, if there is one.
    pub fn initializer_text(&self) -> Option<String> {
        (!self.value.is_empty()).then(|| stringify_elements(&self.value))
    }

    fn compute_numeric_value(&self, prior: Option<&EnumeratorDefinition>) -> Option<i64> {
        match self.value.as_slice() {
            [] => match prior {
                None => Some(0),
                Some(prior) => prior.numeric_value.and_then(|v| v.checked_add(1)),
            },
            [Element::Token(token)] if token.kind == TokenKind::Integer => {
                parse_integer_literal(&token.text)
            }
            _ => None,
        }
    }
}

impl fmt::Display for EnumeratorDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.display_name {
            Some(display_name) => write!(f, "TASENUMERATOR({}, \"{}\")", self.name, display_name)?,
            None => write!(f, "{}", self.name)?,
        }
        if let Some(initializer) = self.initializer_text() {
            write!(f, " = {}", initializer)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumerationDefinition {
    pub name: String,
    pub is_scoped: bool,
    pub underlying_type: Option<String>,
    pub enumerators: Vec<EnumeratorDefinition>,
    all_values_known: bool,
    /// Index of the enumerator with the smallest value, first one on ties.
    #[serde(skip)]
    minimum: Option<usize>,
    /// Index of the enumerator with the largest value, first one on ties.
    #[serde(skip)]
    maximum: Option<usize>,
}

impl EnumerationDefinition {
    pub fn new(
        name: impl Into<String>,
        is_scoped: bool,
        underlying_type: Option<String>,
        enumerators: Vec<EnumeratorDefinition>,
    ) -> Self {
        let mut definition = Self {
            name: name.into(),
            is_scoped,
            underlying_type,
            enumerators,
            all_values_known: false,
            minimum: None,
            maximum: None,
        };
        definition.resolve_values();
        definition
    }

    /// Fills in the numeric values that can be determined without
    /// evaluating expressions, then recomputes the derived extremes.
    ///
    /// Values that are already known are left alone, so calling this again
    /// changes nothing.
    pub fn resolve_values(&mut self) {
        for i in 0..self.enumerators.len() {
            if self.enumerators[i].numeric_value.is_some() {
                continue;
            }
            let prior = i.checked_sub(1).map(|p| &self.enumerators[p]);
            let value = self.enumerators[i].compute_numeric_value(prior);
            self.enumerators[i].numeric_value = value;
        }

        self.all_values_known = self.enumerators.iter().all(|e| e.numeric_value.is_some());
        self.minimum = None;
        self.maximum = None;
        if !self.all_values_known || self.enumerators.is_empty() {
            return;
        }

        let mut minimum = 0;
        let mut maximum = 0;
        for (i, enumerator) in self.enumerators.iter().enumerate().skip(1) {
            if enumerator.numeric_value > self.enumerators[maximum].numeric_value {
                maximum = i;
            }
            if enumerator.numeric_value < self.enumerators[minimum].numeric_value {
                minimum = i;
            }
        }
        self.minimum = Some(minimum);
        self.maximum = Some(maximum);
    }

    pub fn all_values_known(&self) -> bool {
        self.all_values_known
    }

    pub fn minimum_enumerator(&self) -> Option<&EnumeratorDefinition> {
        self.minimum.map(|i| &self.enumerators[i])
    }

    pub fn maximum_enumerator(&self) -> Option<&EnumeratorDefinition> {
        self.maximum.map(|i| &self.enumerators[i])
    }

    pub fn minimum_value(&self) -> Option<i64> {
        self.minimum_enumerator().and_then(|e| e.numeric_value)
    }

    pub fn maximum_value(&self) -> Option<i64> {
        self.maximum_enumerator().and_then(|e| e.numeric_value)
    }

    /// True when every value is known and the distinct values form one
    /// contiguous run, so a lookup table can replace a chain of branches.
    pub fn is_dense(&self) -> bool {
        let (Some(min), Some(max)) = (self.minimum_value(), self.maximum_value()) else {
            return false;
        };
        let distinct: BTreeSet<i64> = self
            .enumerators
            .iter()
            .filter_map(|e| e.numeric_value)
            .collect();
        i128::from(max) - i128::from(min) + 1 == distinct.len() as i128
    }
}

impl fmt::Display for EnumerationDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "enum")?;
        if self.is_scoped {
            write!(f, " class")?;
        }
        write!(f, " {}", self.name)?;
        if let Some(underlying_type) = &self.underlying_type {
            write!(f, " : {}", underlying_type)?;
        }
        writeln!(f, " {{")?;
        for enumerator in &self.enumerators {
            writeln!(f, "  {},", enumerator)?;
        }
        write!(f, "}};")
    }
}
