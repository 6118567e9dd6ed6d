//! Configuration types and management for taxon-rs.
//!
//! The allow-list and the forced-rule table are plain configuration: the
//! defaults shipped here are a starting point, and every deployment is
//! expected to supply its own lists in a YAML file.

pub mod rules;
pub mod taxonomy;
pub mod validation;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::errors::{Result, TaxonError};
use crate::oracle::OracleConfig;

pub use rules::{GroupingConfig, NameMarkerRule, RulesConfig};
pub use taxonomy::{NamespaceEntry, TaxonomyConfig, CUSTOM_LABEL, INVALID_LABEL, OBSOLETE_LABEL};
pub use validation::{
    validate_not_blank, validate_positive_u64, validate_positive_usize, validate_range_f32,
    validate_unique_ci,
};

/// Main configuration for the taxon engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxonConfig {
    /// Source root scanning
    pub scan: ScanConfig,

    /// Product lines, identified by object name prefix
    #[serde(default)]
    pub solutions: Vec<SolutionConfig>,

    /// Allowed namespace labels
    pub taxonomy: TaxonomyConfig,

    /// Forced rules
    pub rules: RulesConfig,

    /// Context grouping normalization
    #[serde(default)]
    pub grouping: GroupingConfig,

    /// Reference resolution
    #[serde(default)]
    pub resolve: ResolveConfig,

    /// Suggestion provider settings
    #[serde(default)]
    pub oracle: OracleConfig,

    /// Retrieval neighbours
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Result ledger
    #[serde(default)]
    pub ledger: LedgerConfig,
}

impl Default for TaxonConfig {
    fn default() -> Self {
        Self {
            scan: ScanConfig::default(),
            solutions: vec![
                SolutionConfig::new("MED", "KVSMED"),
                SolutionConfig::new("MTC", "KVSMTC"),
            ],
            taxonomy: TaxonomyConfig::default(),
            rules: RulesConfig::default(),
            grouping: GroupingConfig::default(),
            resolve: ResolveConfig::default(),
            oracle: OracleConfig::default(),
            retrieval: RetrievalConfig::default(),
            ledger: LedgerConfig::default(),
        }
    }
}

impl TaxonConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| {
            TaxonError::io(format!("Failed to read config file: {}", path.display()), e)
        })?;

        serde_yaml::from_str(&content).map_err(Into::into)
    }

    /// Save configuration to a YAML file
    pub fn to_yaml_file(&self, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        let content = serde_yaml::to_string(self)?;
        std::fs::write(&path, content).map_err(|e| {
            TaxonError::io(format!("Failed to write config file: {}", path.display()), e)
        })
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        self.scan.validate()?;
        for solution in &self.solutions {
            solution.validate()?;
        }
        validate_unique_ci(self.solutions.iter().map(|s| s.tag.as_str()), "solutions.tag")?;
        validate_unique_ci(
            self.solutions.iter().map(|s| s.prefix.as_str()),
            "solutions.prefix",
        )?;
        self.taxonomy.validate()?;
        self.rules.validate()?;
        self.grouping.validate()?;
        self.resolve.validate()?;
        self.oracle.validate()?;
        self.retrieval.validate()?;
        self.ledger.validate()
    }
}

/// File discovery settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Roots scanned when none are given on the command line
    #[serde(default)]
    pub roots: Vec<PathBuf>,
    /// File extensions (without dot, case-insensitive) that are scanned
    pub extensions: Vec<String>,
    /// Directory names never descended into
    pub skip_dirs: Vec<String>,
    /// Files larger than this are skipped
    pub max_file_size_bytes: u64,
    /// Scanner worker threads; defaults to four per available core
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            extensions: vec!["al".to_string()],
            skip_dirs: vec![
                ".git".to_string(),
                ".alpackages".to_string(),
                ".vscode".to_string(),
                "node_modules".to_string(),
                "target".to_string(),
            ],
            max_file_size_bytes: 4 * 1024 * 1024,
            workers: None,
        }
    }
}

impl ScanConfig {
    /// Number of scanner threads to use.
    pub fn effective_workers(&self) -> usize {
        self.workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get() * 4)
                .unwrap_or(4)
        })
    }

    /// Whether `path` carries one of the configured extensions.
    pub fn accepts_extension(&self, path: &std::path::Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.extensions
                    .iter()
                    .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }

    /// Validate scan settings.
    pub fn validate(&self) -> Result<()> {
        if self.extensions.is_empty() {
            return Err(TaxonError::config_field(
                "at least one file extension is required",
                "scan.extensions",
            ));
        }
        validate_positive_u64(self.max_file_size_bytes, "scan.max_file_size_bytes")?;
        if let Some(workers) = self.workers {
            validate_positive_usize(workers, "scan.workers")?;
        }
        Ok(())
    }
}

/// A product line identified by the prefix its object names carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionConfig {
    /// Short tag used in results and rule overrides
    pub tag: String,
    /// Object name prefix (matched case-insensitively)
    pub prefix: String,
}

impl SolutionConfig {
    /// Create a new solution definition.
    pub fn new(tag: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            prefix: prefix.into(),
        }
    }

    fn validate(&self) -> Result<()> {
        validate_not_blank(&self.tag, "solutions.tag")?;
        validate_not_blank(&self.prefix, "solutions.prefix")
    }
}

/// Reference resolution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveConfig {
    /// Upper bound on resolved context objects per target
    pub max_context_objects: usize,
    /// Retry unresolved references against the name-only index
    pub name_fallback: bool,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            max_context_objects: 25,
            name_fallback: false,
        }
    }
}

impl ResolveConfig {
    fn validate(&self) -> Result<()> {
        validate_positive_usize(self.max_context_objects, "resolve.max_context_objects")
    }
}

/// Retrieval neighbour settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Whether neighbours are looked up at all
    pub enabled: bool,
    /// Upper bound on neighbours per target
    pub max_neighbors: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_neighbors: 8,
        }
    }
}

impl RetrievalConfig {
    fn validate(&self) -> Result<()> {
        if self.enabled {
            validate_positive_usize(self.max_neighbors, "retrieval.max_neighbors")?;
        }
        Ok(())
    }
}

/// Result ledger settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Line-delimited JSON file holding one entry per classified object
    pub path: PathBuf,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(".taxon/ledger.jsonl"),
        }
    }
}

impl LedgerConfig {
    fn validate(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Err(TaxonError::config_field("ledger path is empty", "ledger.path"));
        }
        Ok(())
    }
}
