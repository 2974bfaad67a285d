//! Generation of printing functions for C++ enums.
//!
//! For each enum `E` three functions are declared and defined:
//! `ToFlashStringHelper(E)` returning the enumerator's name as a flash
//! string, `PrintValueTo(E, Print&)`, and (on host builds only)
//! `operator<<(std::ostream&, E)`. The header and source text live between
//! tag comments so they can be regenerated in place.

use tracing::{debug, info};

use crate::config::EnumToStringConfig;
use crate::enums::EnumerationDefinition;
use crate::error::Result;
use crate::file_edit::FileContents;

pub const BEGIN_HEADER_TAG: &str = "// BEGIN_HEADER_GENERATED_BY_MAKE_ENUM_TO_STRING";
pub const END_HEADER_TAG: &str = "// END_HEADER_GENERATED_BY_MAKE_ENUM_TO_STRING";
pub const BEGIN_SOURCE_TAG: &str = "// BEGIN_SOURCE_GENERATED_BY_MAKE_ENUM_TO_STRING";
pub const END_SOURCE_TAG: &str = "// END_SOURCE_GENERATED_BY_MAKE_ENUM_TO_STRING";

/// Generated text for one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedCode {
    /// Goes in the header, between the header tags.
    pub declarations: String,
    /// Goes in the source file, between the source tags.
    pub definitions: String,
}

pub struct EnumToStringGenerator<'a> {
    config: &'a EnumToStringConfig,
}

impl<'a> EnumToStringGenerator<'a> {
    pub fn new(config: &'a EnumToStringConfig) -> Self {
        Self { config }
    }

    /// `None` when there are no enums to generate for.
    pub fn generate(&self, enums: &[EnumerationDefinition]) -> Option<GeneratedCode> {
        if enums.is_empty() {
            return None;
        }
        info!(enum_count = enums.len(), "Generating enum printing functions");
        let code = GeneratedCode {
            declarations: self.declarations(enums),
            definitions: self.definitions(enums),
        };
        debug!(
            declarations = code.declarations.len(),
            definitions = code.definitions.len(),
            "Enum printing functions generated"
        );
        Some(code)
    }

    fn namespace_open(&self) -> String {
        format!("\nnamespace {} {{\n\n", self.config.namespace)
    }

    fn namespace_close(&self) -> String {
        format!("}}  // namespace {}\n", self.config.namespace)
    }

    pub fn declarations(&self, enums: &[EnumerationDefinition]) -> String {
        let host = &self.config.host_target_macro;
        let mut output = self.namespace_open();

        for enum_def in enums {
            output.push_str(&format!(
                "const __FlashStringHelper* ToFlashStringHelper({} v);\n",
                enum_def.name
            ));
        }
        output.push_str("\n\n");

        for enum_def in enums {
            output.push_str(&format!("size_t PrintValueTo({} v, Print& out);\n", enum_def.name));
        }
        output.push_str("\n\n");

        output.push_str(&format!("#if {}\n", host));
        output.push_str("// Support for debug logging of enums.\n");
        for enum_def in enums {
            output.push_str(&format!(
                "std::ostream& operator<<(std::ostream& os, {} v);\n",
                enum_def.name
            ));
        }
        output.push_str(&format!("#endif  // {}\n\n", host));

        output.push_str(&self.namespace_close());
        output
    }

    pub fn definitions(&self, enums: &[EnumerationDefinition]) -> String {
        let host = &self.config.host_target_macro;
        let mut output = self.namespace_open();

        for enum_def in enums {
            output.push_str(&self.define_to_flash_string_helper(enum_def));
        }
        output.push_str("\n\n");

        for enum_def in enums {
            output.push_str(&self.define_print_value_to(enum_def));
        }
        output.push_str("\n\n");

        output.push_str(&format!("#if {}\n", host));
        output.push_str("// Support for debug logging of enums.\n");
        for enum_def in enums {
            output.push_str(&define_stream_insert(enum_def));
        }
        output.push_str(&format!("\n#endif  // {}\n\n", host));

        output.push_str(&self.namespace_close());
        output
    }

    fn define_to_flash_string_helper(&self, enum_def: &EnumerationDefinition) -> String {
        let name = &enum_def.name;
        let flash = &self.config.flash_string_macro;

        let mut output = format!(
            "\nconst __FlashStringHelper* ToFlashStringHelper({name} v) {{\n#ifdef TO_FLASH_STRING_HELPER_USE_SWITCH\n  switch (v) {{"
        );
        for enumerator in &enum_def.enumerators {
            output.push_str(&format!(
                "\n    case {}::{}:\n      return {}({});",
                name,
                enumerator.name,
                flash,
                enumerator.quoted_print_name()
            ));
        }
        output.push_str("\n  }\n#else   // !TO_FLASH_STRING_HELPER_USE_SWITCH");
        for enumerator in &enum_def.enumerators {
            output.push_str(&format!(
                "\n  if (v == {}::{}) {{\n    return {}({});\n  }}",
                name,
                enumerator.name,
                flash,
                enumerator.quoted_print_name()
            ));
        }
        output.push_str("\n#endif  // TO_FLASH_STRING_HELPER_USE_SWITCH\n  return nullptr;\n}\n");
        output
    }

    fn define_print_value_to(&self, enum_def: &EnumerationDefinition) -> String {
        format!(
            "\nsize_t PrintValueTo({name} v, Print& out) {{\n  auto flash_string = ToFlashStringHelper(v);\n  if (flash_string != nullptr) {{\n    return out.print(flash_string);\n  }}\n  return {printer}(\n        {flash}(\"{name}\"), static_cast<uint32_t>(v), out);\n}}\n",
            name = enum_def.name,
            printer = self.config.unknown_value_printer,
            flash = self.config.flash_string_macro,
        )
    }
}

fn define_stream_insert(enum_def: &EnumerationDefinition) -> String {
    let name = &enum_def.name;
    let mut output =
        format!("\nstd::ostream& operator<<(std::ostream& os, {name} v) {{\n  switch (v) {{");
    for enumerator in &enum_def.enumerators {
        output.push_str(&format!(
            "\n    case {}::{}:\n      return os << {};",
            name,
            enumerator.name,
            enumerator.quoted_print_name()
        ));
    }
    output.push_str(&format!(
        "\n  }}\n  return os << \"Unknown {name}, value=\" << static_cast<int64_t>(v);\n}}\n"
    ));
    output
}

/// The declarations between header tags, ready to paste into a header.
pub fn tagged_header_section(declarations: &str) -> String {
    format!("{BEGIN_HEADER_TAG}\n{declarations}\n{END_HEADER_TAG}\n")
}

/// The definitions between source tags, ready to paste into a source file.
pub fn tagged_source_section(definitions: &str) -> String {
    format!("{BEGIN_SOURCE_TAG}\n{definitions}\n{END_SOURCE_TAG}\n")
}

/// Replaces the generated header section of `contents`. `false` if the file
/// has no such section.
pub fn update_header_section(contents: &mut FileContents, declarations: &str) -> Result<bool> {
    contents.replace_tagged_section(
        BEGIN_HEADER_TAG,
        END_HEADER_TAG,
        &format!("\n{declarations}\n"),
        true,
    )
}

/// Replaces the generated source section of `contents`. `false` if the file
/// has no such section.
pub fn update_source_section(contents: &mut FileContents, definitions: &str) -> Result<bool> {
    contents.replace_tagged_section(
        BEGIN_SOURCE_TAG,
        END_SOURCE_TAG,
        &format!("\n{definitions}\n"),
        true,
    )
}
