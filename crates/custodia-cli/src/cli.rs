//! Argument definitions.

use clap::{Parser, Subcommand};
use custodia_core::Role;

/// Inspect Custodia roles, permissions, workflows, and configuration.
#[derive(Debug, Parser)]
#[command(name = "custodia", version, about)]
pub struct Cli {
    /// Path to a config file (overrides CUSTODIA_CONFIG).
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the roles and their stored values.
    Roles,

    /// Show the permissions a role resolves to.
    Permissions {
        /// Role name or integer value.
        #[arg(short, long)]
        role: Role,
    },

    /// Show the project workflow.
    Workflow {
        /// Only list the triggers allowed from this state.
        #[arg(short, long)]
        state: Option<String>,
    },

    /// Configuration management.
    Config {
        /// Config action.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// `custodia config` subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the config file that would be read.
    Path,

    /// Print the effective configuration as TOML.
    Show,

    /// Write a default config file.
    Init {
        /// Where to write it (defaults to the resolved config path).
        #[arg(short, long)]
        file: Option<String>,

        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}
