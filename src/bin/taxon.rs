//! Taxon CLI - namespace classification for AL code bases.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Classify(args) => cli::classify_command(args, config).await?,
        Commands::Review(args) => cli::review_command(args, config).await?,
        Commands::Index(args) => cli::index_command(args, config).await?,
        Commands::Namespaces(args) => cli::namespaces_command(args, config).await?,
        Commands::Export(args) => cli::export_command(args, config).await?,
        Commands::PrintDefaultConfig => cli::print_default_config().await?,
        Commands::InitConfig(args) => cli::init_config(args).await?,
        Commands::ValidateConfig(args) => cli::validate_config(args).await?,
    }

    Ok(())
}
