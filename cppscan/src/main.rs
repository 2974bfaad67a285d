mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use cppscan_core::error::Result;
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

fn init_tracing(cli: &Cli) {
    // RUST_LOG wins over -v/-q
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.default_log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    debug!(command = ?cli.command, "Running command");
    match cli.command.clone() {
        Commands::Tokenize(args) => commands::tokenize::run(cli, args),
        Commands::Enums(args) => commands::enums::run(cli, args),
        Commands::EnumToString(args) => commands::enum_to_string::run(cli, args),
        Commands::AddFlashstr(args) => commands::add_flashstr::run(cli, args),
        Commands::FindStrings(args) => commands::find_strings::run(cli, args),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
