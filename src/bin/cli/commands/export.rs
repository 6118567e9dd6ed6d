//! Ledger CSV export command.

use std::path::Path;

use anyhow::Context;
use owo_colors::OwoColorize;

use taxon_rs::TaxonEngine;

use crate::cli::args::ExportArgs;
use crate::cli::config_builder::load_configuration;

/// Write the ledger as CSV to a file or stdout.
pub async fn export_command(args: ExportArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = load_configuration(config_path).await?;
    let engine = TaxonEngine::new(config)?;
    let csv = engine.export_csv()?;

    match args.output {
        Some(path) => {
            tokio::fs::write(&path, csv)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "{} {}",
                "CSV written to".bright_green().bold(),
                path.display().to_string().cyan()
            );
        }
        None => print!("{csv}"),
    }
    Ok(())
}
