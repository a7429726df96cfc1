mod config;
mod observability;

use clap::{Args, Parser, Subcommand};
use config::{Config, ConfigError};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(version, about = "Relay that merges and sorts blog posts from an upstream API")]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Serve /api/ping and /api/posts
    Aggregator(AggregatorArgs),
}

#[derive(Args)]
struct AggregatorArgs {
    #[arg(long)]
    config_file_path: Option<PathBuf>,
    /// Overrides the listener port from the config file
    #[arg(long, env = "PORT")]
    port: Option<u16>,
}

#[derive(thiserror::Error, Debug)]
enum RelayError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Observability(#[from] observability::ObservabilityError),
    #[error("aggregator failed: {0}")]
    Aggregator(#[from] aggregator::errors::AggregatorError),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        CliCommand::Aggregator(args) => run_aggregator(args).await,
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "Exiting");
        eprintln!("relay: {e}");
        process::exit(1);
    }
}

async fn run_aggregator(args: AggregatorArgs) -> Result<(), RelayError> {
    let config = Config::load(args.config_file_path.as_deref(), args.port)?;

    // Keep the guard alive so buffered Sentry events are flushed on exit
    let _sentry = observability::init(&config.common)?;

    tokio::select! {
        result = aggregator::run(config.aggregator) => result?,
        _ = tokio::signal::ctrl_c() => tracing::info!("Received SIGINT, shutting down"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_aggregator_args() {
        let cli = Cli::try_parse_from([
            "relay",
            "aggregator",
            "--config-file-path",
            "/etc/relay.yaml",
            "--port",
            "4000",
        ])
        .unwrap();

        let CliCommand::Aggregator(args) = cli.command;
        assert_eq!(args.config_file_path, Some(PathBuf::from("/etc/relay.yaml")));
        assert_eq!(args.port, Some(4000));
    }
}
