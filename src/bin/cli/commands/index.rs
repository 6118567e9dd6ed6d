//! Object index export command.

use std::path::Path;

use owo_colors::OwoColorize;

use taxon_rs::TaxonEngine;

use crate::cli::args::IndexArgs;
use crate::cli::config_builder::load_configuration;

/// Build the index and write it as JSON.
pub async fn index_command(args: IndexArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = load_configuration(config_path).await?;
    let engine = TaxonEngine::new(config)?;
    let index = engine.export_index(&args.roots.roots, &args.output).await?;

    let stats = index.stats();
    println!(
        "{} {} objects from {} files ({} skipped) -> {}",
        "Indexed".bright_green().bold(),
        index.len().to_string().cyan(),
        stats.files_discovered,
        stats.files_skipped,
        args.output.display().to_string().cyan()
    );
    if stats.key_collisions > 0 {
        println!(
            "   {} {} duplicate declarations, later files won",
            "note:".yellow(),
            stats.key_collisions
        );
    }
    Ok(())
}
