//! Enum-to-string command - generates printing functions for enums, and
//! optionally writes them into the tagged sections of the header and source
//! files.

use crate::cli::{Cli, EnumToStringArgs};
use crate::commands::{collect_input_files, enum_name_filter};
use cppscan_core::codegen::enum_to_string::{
    EnumToStringGenerator, tagged_header_section, tagged_source_section, update_header_section,
    update_source_section,
};
use cppscan_core::config::CppScanConfig;
use cppscan_core::error::Result;
use cppscan_core::file_edit::FileContents;
use cppscan_core::source::CppSource;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Runs the enum-to-string command.
pub fn run(cli: &Cli, args: EnumToStringArgs) -> Result<()> {
    let config = CppScanConfig::load(cli.config.as_deref())?;
    let filter = enum_name_filter(args.pattern.as_deref(), config.enum_name_regex()?)?;

    for path in collect_input_files(&args.files)? {
        process_file(&path, &config, filter.as_ref(), args.update)?;
    }
    Ok(())
}

fn process_file(
    path: &Path,
    config: &CppScanConfig,
    filter: Option<&Regex>,
    update: bool,
) -> Result<()> {
    let source = CppSource::from_file(path)?;
    let enums = source.enum_definitions(filter)?;
    let Some(code) = EnumToStringGenerator::new(&config.enum_to_string).generate(&enums) else {
        debug!("No enum definitions in {:?}", path);
        return Ok(());
    };
    info!("Generated functions for {} enum definitions in {:?}", enums.len(), path);

    let mut header_updated = false;
    let mut source_updated = false;
    if update {
        if let Some(mut header) = paired_file(&source, FileKind::Header)? {
            header_updated = update_header_section(&mut header, &code.declarations)?;
            if header_updated {
                header.update_file()?;
            } else {
                warn!("No generated header section in {:?}", header.file_path());
            }
        }
        if let Some(mut definitions_file) = paired_file(&source, FileKind::Source)? {
            source_updated = update_source_section(&mut definitions_file, &code.definitions)?;
            if source_updated {
                definitions_file.update_file()?;
            } else {
                warn!("No generated source section in {:?}", definitions_file.file_path());
            }
        }
    }

    let rule = "-".repeat(80);
    if !header_updated {
        println!("{rule}\nPlease add this content to the appropriate header file:\n{rule}\n");
        println!("{}", tagged_header_section(&code.declarations));
    }
    if !source_updated {
        println!("{rule}\nPlease add this content to the appropriate source file:\n{rule}\n");
        println!("{}", tagged_source_section(&code.definitions));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileKind {
    Header,
    Source,
}

/// The file of `kind` to update for `source`: the file itself if it is of
/// that kind, else its one paired file. `None`, with a warning, when there is
/// no single candidate.
fn paired_file(source: &CppSource, kind: FileKind) -> Result<Option<FileContents>> {
    let (is_kind, candidates, name): (bool, Vec<PathBuf>, &str) = match kind {
        FileKind::Header => (source.is_header_file(), source.find_header_paths(), "header"),
        FileKind::Source => (source.is_source_file(), source.find_source_paths(), "source"),
    };
    if is_kind {
        return Ok(Some(source.file_contents()));
    }
    match candidates.as_slice() {
        [path] => Ok(Some(FileContents::read(path)?)),
        [] => {
            warn!(
                "Unable to find a {} file corresponding to {}",
                name,
                source.display_name()
            );
            Ok(None)
        }
        _ => {
            warn!(
                "Unable to choose a single {} file corresponding to {}; candidates: {:?}",
                name,
                source.display_name(),
                candidates
            );
            Ok(None)
        }
    }
}
