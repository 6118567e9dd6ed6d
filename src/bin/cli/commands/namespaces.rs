//! Namespace census command.

use std::path::Path;

use taxon_rs::TaxonEngine;

use crate::cli::args::NamespacesArgs;
use crate::cli::config_builder::load_configuration;
use crate::cli::output::display_census;

/// Print every namespace declared under the roots.
pub async fn namespaces_command(args: NamespacesArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = load_configuration(config_path).await?;
    let engine = TaxonEngine::new(config)?;
    let census = engine.namespace_census(&args.roots.roots).await?;
    display_census(&census, args.counts);
    Ok(())
}
