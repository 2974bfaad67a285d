//! Enums command - prints the enum definitions found in each file.

use crate::cli::{Cli, EnumsArgs, OutputFormat};
use crate::commands::{collect_input_files, enum_name_filter};
use cppscan_core::config::CppScanConfig;
use cppscan_core::enums::EnumerationDefinition;
use cppscan_core::error::Result;
use cppscan_core::source::CppSource;
use serde_json::{Value, json};
use tracing::info;

/// Runs the enums command.
pub fn run(cli: &Cli, args: EnumsArgs) -> Result<()> {
    let config = CppScanConfig::load(cli.config.as_deref())?;
    let filter = enum_name_filter(args.pattern.as_deref(), config.enum_name_regex()?)?;

    let mut files = Vec::new();
    for path in collect_input_files(&args.files)? {
        let source = CppSource::from_file(&path)?;
        let definitions = source.enum_definitions(filter.as_ref())?;
        info!("Found {} enums in {:?}", definitions.len(), path);
        match args.format {
            OutputFormat::Pretty => print!("{}", pretty(&source, &definitions)),
            OutputFormat::Json => files.push(json!({
                "file": source.display_name(),
                "enums": definitions.iter().map(to_json).collect::<Vec<_>>(),
            })),
        }
    }

    if args.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&files)?);
    }
    Ok(())
}

fn to_json(definition: &EnumerationDefinition) -> Value {
    json!({
        "definition": definition,
        "minimum_value": definition.minimum_value(),
        "maximum_value": definition.maximum_value(),
        "is_dense": definition.is_dense(),
    })
}

fn pretty(source: &CppSource, definitions: &[EnumerationDefinition]) -> String {
    let mut output = format!("// {}\n", source.display_name());
    for definition in definitions {
        output.push_str(&format!("{}\n", definition));

        let values: Vec<String> = definition
            .enumerators
            .iter()
            .map(|e| match e.numeric_value {
                Some(value) => format!("{}={}", e.name, value),
                None => format!("{}=?", e.name),
            })
            .collect();
        output.push_str(&format!("// values: {}\n", values.join(", ")));

        if let (Some(min), Some(max)) = (
            definition.minimum_enumerator(),
            definition.maximum_enumerator(),
        ) {
            output.push_str(&format!(
                "// minimum: {}, maximum: {}, dense: {}\n",
                min.name,
                max.name,
                definition.is_dense()
            ));
        }
    }
    output
}
