//! Add-flashstr command - wraps the string literals of logging statements in
//! the configured flash-string macro.

use crate::cli::{AddFlashstrArgs, Cli};
use crate::commands::collect_input_files;
use cppscan_core::codegen::flashstr::{find_logging_statements, flashstr_replacements};
use cppscan_core::config::{CppScanConfig, FlashStrConfig};
use cppscan_core::error::Result;
use cppscan_core::rewrite::Replacement;
use cppscan_core::source::CppSource;
use cppscan_core::tokenize::{dump_elements, stringify_elements};
use std::path::Path;
use tracing::{debug, info};

/// Runs the add-flashstr command.
pub fn run(cli: &Cli, args: AddFlashstrArgs) -> Result<()> {
    let config = CppScanConfig::load(cli.config.as_deref())?;
    for path in collect_input_files(&args.files)? {
        process_file(&path, &config.flashstr, args.dry_run)?;
    }
    Ok(())
}

/// Returns the number of literals wrapped (or that would be, on a dry run).
fn process_file(path: &Path, config: &FlashStrConfig, dry_run: bool) -> Result<usize> {
    let source = CppSource::from_file(path)?;
    let elements = source.grouped_tokens()?;

    let mut all_replacements: Vec<Replacement> = Vec::new();
    for statement in find_logging_statements(elements, &config.statement_prefixes)? {
        let replacements = flashstr_replacements(statement, &config.wrapper);
        if replacements.is_empty() {
            continue;
        }
        debug!("Statement tokens:\n{}", dump_elements(statement));
        println!(
            "{}:{}: {}",
            source.display_name(),
            source.line_number(statement[0].raw_start()),
            stringify_elements(statement)
        );
        all_replacements.extend(replacements);
    }

    let wrapped = all_replacements.len() / 2;
    if all_replacements.is_empty() {
        debug!("Nothing to wrap in {:?}", path);
    } else if dry_run {
        info!("Would wrap {} string literals in {:?}", wrapped, path);
    } else {
        info!("Applying {} replacements to {:?}", all_replacements.len(), path);
        source.edit(&all_replacements)?.write_back()?;
    }
    Ok(wrapped)
}
