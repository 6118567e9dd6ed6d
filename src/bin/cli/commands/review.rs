//! Single-object review command.

use std::path::Path;

use anyhow::Context;

use taxon_rs::TaxonEngine;

use crate::cli::args::{OutputFormat, ReviewArgs};
use crate::cli::config_builder::load_configuration;
use crate::cli::output::display_review;

/// Re-decide every object with the given name and upsert the ledger.
pub async fn review_command(args: ReviewArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = load_configuration(config_path).await?;
    let engine = TaxonEngine::new(config)?
        .with_chat_oracle()
        .context("Suggestion provider is not available")?;

    let outcomes = engine
        .review(&args.roots.roots, &args.name)
        .await
        .with_context(|| format!("Review of '{}' failed", args.name))?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcomes)?),
        OutputFormat::Table => outcomes.iter().for_each(display_review),
    }
    Ok(())
}
