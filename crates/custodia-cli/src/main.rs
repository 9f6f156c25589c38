//! The `custodia` binary.

use clap::Parser;
use custodia_cli::{Cli, Command, ConfigAction};
use custodia_core::CustodiaConfig;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // `config init` must work even when the target file is unreadable.
    let config = match &cli.command {
        Command::Config {
            action: ConfigAction::Init { .. },
        } => CustodiaConfig::default(),
        _ => CustodiaConfig::load(cli.config.as_deref())?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.as_str().into()),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(command = ?cli.command, "Running command");
    custodia_cli::run(&cli, &config, &mut std::io::stdout().lock())?;
    Ok(())
}
