#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Custodia CLI: inspect roles, resolved permissions, the project
//! workflow, and the configuration file.

pub mod cli;
pub mod commands;
pub mod error;

use std::io::Write;

use custodia_core::CustodiaConfig;

pub use cli::{Cli, Command, ConfigAction};
pub use error::{CliError, Result};

/// Runs a parsed command against `config`, writing to `out`.
pub fn run(cli: &Cli, config: &CustodiaConfig, out: &mut impl Write) -> Result<()> {
    let explicit = cli.config.as_deref();
    match &cli.command {
        Command::Roles => commands::cmd_roles(out),
        Command::Permissions { role } => commands::cmd_permissions(config, *role, out),
        Command::Workflow { state } => commands::cmd_workflow(state.as_deref(), out),
        Command::Config { action } => match action {
            ConfigAction::Path => commands::cmd_config_path(explicit, out),
            ConfigAction::Show => commands::cmd_config_show(config, out),
            ConfigAction::Init { file, force } => {
                commands::cmd_config_init(explicit, file.as_deref(), *force, out)
            }
        },
    }
}
