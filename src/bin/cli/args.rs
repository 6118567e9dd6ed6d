//! CLI Argument Structures
//!
//! All command definitions used by the taxon binary.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Namespace classification for multi-root AL code bases
#[derive(Parser)]
#[command(name = "taxon")]
#[command(version = VERSION)]
#[command(about = "Taxon - namespace classification for AL code bases")]
#[command(long_about = "
Index the objects of one or more AL source roots and assign every object of the
configured solutions a namespace from a controlled allow-list.

Common Usage:

  # Classify every object under two roots, skipping unchanged ledger entries
  taxon classify ./MED ./MTC ./base

  # See how much work a run would do without calling the provider
  taxon classify --dry-run

  # Re-decide a single object and show the difference to the ledger
  taxon review AMedCustomerMgt

  # Write the ledger as CSV
  taxon export -o namespaces.csv
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (defaults to ./taxon.yml when present)
    #[arg(short, long, global = true, env = "TAXON_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify every object of the configured solutions
    Classify(ClassifyArgs),

    /// Re-decide one object by name
    Review(ReviewArgs),

    /// Build the object index and write it as JSON
    Index(IndexArgs),

    /// List every namespace declared under the roots
    Namespaces(NamespacesArgs),

    /// Write the result ledger as CSV
    Export(ExportArgs),

    /// Print default configuration in YAML format
    #[command(name = "print-default-config")]
    PrintDefaultConfig,

    /// Initialize a configuration file with defaults
    #[command(name = "init-config")]
    InitConfig(InitConfigArgs),

    /// Validate a taxon configuration file
    #[command(name = "validate-config")]
    ValidateConfig(ValidateConfigArgs),
}

/// Source roots shared by the scanning commands.
#[derive(Args, Debug, Clone)]
pub struct RootArgs {
    /// Source roots; `scan.roots` from the configuration when omitted
    #[arg(value_name = "ROOT")]
    pub roots: Vec<PathBuf>,
}

#[derive(Args)]
pub struct ClassifyArgs {
    #[command(flatten)]
    pub roots: RootArgs,

    /// Re-decide objects even when their ledger entry is current
    #[arg(long)]
    pub force: bool,

    /// Report the work without querying the provider or writing the ledger
    #[arg(long)]
    pub dry_run: bool,

    /// Run without a suggestion provider (forced rules only)
    #[arg(long)]
    pub offline: bool,

    /// Cap on concurrent provider requests
    #[arg(long)]
    pub max_concurrency: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Args)]
pub struct ReviewArgs {
    /// Declared object name (case-insensitive)
    pub name: String,

    #[command(flatten)]
    pub roots: RootArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

#[derive(Args)]
pub struct IndexArgs {
    #[command(flatten)]
    pub roots: RootArgs,

    /// Output file
    #[arg(short, long, default_value = "al_index.json")]
    pub output: PathBuf,
}

#[derive(Args)]
pub struct NamespacesArgs {
    #[command(flatten)]
    pub roots: RootArgs,

    /// Show how many files declare each namespace
    #[arg(long)]
    pub counts: bool,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Output file; stdout when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct InitConfigArgs {
    /// Output configuration file name
    #[arg(short, long, default_value = "taxon.yml")]
    pub output: PathBuf,

    /// Overwrite existing configuration file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args)]
pub struct ValidateConfigArgs {
    /// Configuration file to validate
    #[arg(value_name = "CONFIG")]
    pub file: PathBuf,

    /// Show the allow-list and forced rules
    #[arg(long)]
    pub details: bool,
}

/// Output format for result listings
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored tables
    Table,
    /// Pretty JSON
    Json,
}
