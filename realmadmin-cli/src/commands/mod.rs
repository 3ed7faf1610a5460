//! Command handler modules for the CLI.

mod connect;
mod settings;

use crate::cli::Commands;
use crate::error::CliError;
use crate::util::Context;

/// Dispatch a CLI command to the appropriate handler.
pub fn dispatch(context: &Context, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Connect(args) => connect::cmd_connect(context, &args),
        Commands::ConnectLocal {
            host,
            port,
            ldaps,
            env,
            format,
        } => connect::cmd_connect_local(context, &host, port, ldaps, &env, format),
        Commands::Settings(subcmd) => settings::cmd_settings(context, subcmd),
    }
}
