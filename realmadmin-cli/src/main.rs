//! `realmadmin` CLI - command-line front end for directory administration
//!
//! Authenticates an operator, opens a bound directory session, and manages
//! the encrypted settings file.

mod cli;
mod commands;
mod error;
mod util;

use clap::Parser;
use cli::Cli;
use realmadmin_core::tracing::{TracingLevel, init_tracing};

use crate::error::CliError;
use crate::util::Context;

fn main() {
    let cli = Cli::parse();
    let quiet = cli.quiet;

    if let Err(e) = run(cli) {
        if !quiet {
            eprintln!("Error: {e}");
        }
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let context = Context::load(cli.config.as_deref(), cli.vault.as_deref(), cli.passphrase)?;

    let mut tracing_config = context.config.tracing_config();
    if cli.verbose > 0 || cli.quiet {
        tracing_config = tracing_config.with_level(TracingLevel::from_verbosity(cli.verbose, cli.quiet));
    }
    if let Err(e) = init_tracing(&tracing_config) {
        eprintln!("Warning: logging disabled: {e}");
    }

    commands::dispatch(&context, cli.command)
}
