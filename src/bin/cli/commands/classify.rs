//! Batch classification command.

use std::path::Path;

use anyhow::Context;
use tracing::warn;

use taxon_rs::{ClassifyOptions, TaxonEngine};

use crate::cli::args::{ClassifyArgs, OutputFormat};
use crate::cli::config_builder::load_configuration;
use crate::cli::output::display_run;

/// Classify every target object under the roots.
pub async fn classify_command(args: ClassifyArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let mut config = load_configuration(config_path).await?;
    if let Some(max_concurrency) = args.max_concurrency {
        config.oracle = config.oracle.with_max_concurrency(max_concurrency);
    }

    let mut engine = TaxonEngine::new(config)?;
    if args.offline {
        warn!("Running offline: objects without a forced rule are recorded without a suggestion");
    } else if !args.dry_run {
        engine = engine
            .with_chat_oracle()
            .context("Suggestion provider is not available (use --offline or --dry-run to skip it)")?;
    }

    let options = ClassifyOptions {
        force: args.force,
        dry_run: args.dry_run,
    };
    let run = engine
        .classify(&args.roots.roots, options)
        .await
        .context("Classification failed")?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&run)?),
        OutputFormat::Table => display_run(&run),
    }
    Ok(())
}
