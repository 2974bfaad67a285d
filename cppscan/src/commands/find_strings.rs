//! Find-strings command - lists calls that pass plain string literals.

use crate::cli::{Cli, FindStringsArgs};
use crate::commands::collect_input_files;
use cppscan_core::codegen::flashstr::find_calls_with_strings;
use cppscan_core::config::{CppScanConfig, Exemptions};
use cppscan_core::error::Result;
use cppscan_core::source::CppSource;
use cppscan_core::tokenize::{dump_elements, stringify_elements};
use tracing::{debug, info};

/// Runs the find-strings command.
pub fn run(cli: &Cli, args: FindStringsArgs) -> Result<()> {
    let config = CppScanConfig::load(cli.config.as_deref())?;
    let exemptions = config.flashstr.exemptions()?;

    let mut total = 0;
    for path in collect_input_files(&args.files)? {
        let source = CppSource::from_file(&path)?;
        let lines = report(&source, &exemptions)?;
        total += lines.len();
        for line in lines {
            println!("{line}");
        }
    }
    info!("Found {} calls with plain string literals", total);
    Ok(())
}

/// One `file:line: call` line per call found.
fn report(source: &CppSource, exemptions: &Exemptions) -> Result<Vec<String>> {
    let calls = find_calls_with_strings(source.grouped_tokens()?, exemptions);
    Ok(calls
        .iter()
        .map(|call| {
            let elements = call.elements();
            debug!("Call tokens:\n{}", dump_elements(&elements));
            format!(
                "{}:{}: {}",
                source.display_name(),
                source.line_number(call.identifier.raw_start),
                stringify_elements(&elements)
            )
        })
        .collect())
}
