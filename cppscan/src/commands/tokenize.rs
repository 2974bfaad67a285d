//! Tokenize command - prints the tokens of each file.

use crate::cli::{Cli, TokenizeArgs};
use crate::commands::collect_input_files;
use cppscan_core::error::Result;
use cppscan_core::source::{CppSource, TokenFilter};
use cppscan_core::tokenize::dump_elements;
use tracing::info;

/// Runs the tokenize command.
pub fn run(_cli: &Cli, args: TokenizeArgs) -> Result<()> {
    let filter = if args.all {
        TokenFilter::All
    } else {
        TokenFilter::Source
    };

    for path in collect_input_files(&args.files)? {
        let source = CppSource::from_file(&path)?;
        println!("{}", render(&source, filter, args.grouped)?);
        info!("Tokenized {:?}", path);
    }
    Ok(())
}

fn render(source: &CppSource, filter: TokenFilter, grouped: bool) -> Result<String> {
    let mut output = format!("// {}\n", source.display_name());
    if grouped {
        output.push_str(&dump_elements(source.grouped_tokens()?));
    } else {
        for token in source.tokens(filter)? {
            output.push_str(&format!("{}\n", token));
        }
    }
    Ok(output)
}
