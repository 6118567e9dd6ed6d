//! Error types for the taxon-rs library.
//!
//! Every fallible operation in the crate returns [`Result`]. Most per-file and
//! per-object failures are absorbed by the pipeline (logged and recorded as
//! diagnostics); the variants here cover the conditions that do surface to
//! callers, such as configuration problems or an unwritable result ledger.

use std::io;

use thiserror::Error;

/// Main result type for taxon operations.
pub type Result<T> = std::result::Result<T, TaxonError>;

/// Error type for all taxon operations.
#[derive(Error, Debug)]
pub enum TaxonError {
    /// I/O related errors (file operations, directory walks)
    #[error("I/O error: {message}")]
    Io {
        /// Human-readable error message
        message: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        /// Error description
        message: String,
        /// Configuration field that caused the error
        field: Option<String>,
    },

    /// Structural recognition errors
    #[error("Parse error: {message}")]
    Parse {
        /// Error description
        message: String,
        /// File path where the error occurred
        file_path: Option<String>,
    },

    /// Validation errors for input data
    #[error("Validation error: {message}")]
    Validation {
        /// Error description
        message: String,
        /// Field or input that failed validation
        field: Option<String>,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error description
        message: String,
        /// Data type being serialized
        data_type: Option<String>,
        /// Underlying serialization error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Suggestion provider errors (transport, HTTP status, empty answers)
    #[error("Oracle error: {message}")]
    Oracle {
        /// Error description
        message: String,
        /// Provider that produced the error
        provider: Option<String>,
    },

    /// Result ledger errors; these abort a batch
    #[error("Result sink error at {path}: {message}")]
    Sink {
        /// Ledger path
        path: String,
        /// Error description
        message: String,
    },

    /// Pipeline errors
    #[error("Pipeline error at stage '{stage}': {message}")]
    Pipeline {
        /// Pipeline stage where the error occurred
        stage: String,
        /// Error description
        message: String,
    },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal {
        /// Error description
        message: String,
        /// Additional context
        context: Option<String>,
    },
}

impl TaxonError {
    /// Create a new I/O error with context
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            field: None,
        }
    }

    /// Create a new configuration error with field context
    pub fn config_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a new parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            file_path: None,
        }
    }

    /// Create a new validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: None,
        }
    }

    /// Create a new oracle error
    pub fn oracle(message: impl Into<String>) -> Self {
        Self::Oracle {
            message: message.into(),
            provider: None,
        }
    }

    /// Create a new result sink error
    pub fn sink(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Sink {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new pipeline error
    pub fn pipeline(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Pipeline {
            stage: stage.into(),
            message: message.into(),
        }
    }

    /// Create a new internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            context: None,
        }
    }

    /// Add context to an existing error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        match &mut self {
            Self::Internal { context: ctx, .. } => {
                *ctx = Some(context.into());
            }
            Self::Oracle { provider, .. } if provider.is_none() => {
                *provider = Some(context.into());
            }
            _ => {}
        }
        self
    }
}

impl From<io::Error> for TaxonError {
    fn from(err: io::Error) -> Self {
        Self::io("I/O operation failed", err)
    }
}

impl From<serde_json::Error> for TaxonError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: format!("JSON serialization failed: {err}"),
            data_type: Some("JSON".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<serde_yaml::Error> for TaxonError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization {
            message: format!("YAML serialization failed: {err}"),
            data_type: Some("YAML".to_string()),
            source: Some(Box::new(err)),
        }
    }
}

impl From<regex::Error> for TaxonError {
    fn from(err: regex::Error) -> Self {
        Self::config(format!("Invalid pattern: {err}"))
    }
}

impl From<reqwest::Error> for TaxonError {
    fn from(err: reqwest::Error) -> Self {
        Self::oracle(format!("HTTP request failed: {err}"))
    }
}

/// Result extension trait for wrapping foreign errors with a context string.
pub trait TaxonResultExt<T> {
    /// Convert any displayable error into an internal error tagged with `context`.
    fn map_generic_err(self, context: &str) -> Result<T>;

    /// Convert a JSON error into a serialization error naming `data_type`.
    fn map_json_err(self, data_type: &str) -> Result<T>;
}

impl<T, E> TaxonResultExt<T> for std::result::Result<T, E>
where
    E: std::fmt::Display,
{
    fn map_generic_err(self, context: &str) -> Result<T> {
        self.map_err(|e| TaxonError::Internal {
            message: format!("{context}: {e}"),
            context: Some(context.to_string()),
        })
    }

    fn map_json_err(self, data_type: &str) -> Result<T> {
        self.map_err(|e| TaxonError::Serialization {
            message: format!("Failed to decode {data_type}: {e}"),
            data_type: Some(data_type.to_string()),
            source: None,
        })
    }
}
