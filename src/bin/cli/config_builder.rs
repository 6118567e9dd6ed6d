//! Configuration loading for the CLI.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, info};

use taxon_rs::core::config::TaxonConfig;

/// Configuration file picked up from the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "taxon.yml";

/// Load and validate the configuration.
///
/// Without an explicit path, `./taxon.yml` is used when present and the
/// built-in defaults otherwise.
pub async fn load_configuration(config_path: Option<&Path>) -> anyhow::Result<TaxonConfig> {
    let path: Option<PathBuf> = match config_path {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
            fallback.exists().then_some(fallback)
        }
    };

    let config = match path {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            TaxonConfig::from_yaml_file(&path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        None => {
            debug!("No configuration file found, using defaults");
            TaxonConfig::default()
        }
    };

    config.validate().context("Invalid configuration")?;
    Ok(config)
}
