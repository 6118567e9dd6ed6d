//! Oracle types for configuration, requests and responses.

use serde::{Deserialize, Serialize};

use crate::core::config::validation::{validate_positive_u64, validate_positive_usize, validate_range_f32};
use crate::core::errors::Result;
use crate::index::ObjectKind;
use crate::resolve::ContextObject;
use crate::retrieval::Neighbor;

/// Chat backend spoken by the oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKind {
    /// Azure OpenAI deployment (`api-key` header)
    AzureOpenai,
    /// OpenAI-compatible chat completions (bearer token)
    Openai,
    /// Local Ollama `generate` endpoint
    Ollama,
}

impl ProviderKind {
    /// Name used in logs and error context.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::AzureOpenai => "azure-openai",
            ProviderKind::Openai => "openai",
            ProviderKind::Ollama => "ollama",
        }
    }
}

/// Configuration for the suggestion oracle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Backend flavour
    pub provider: ProviderKind,
    /// Base URL; `AZURE_OPENAI_ENDPOINT` fills it when blank
    #[serde(default)]
    pub endpoint: String,
    /// Model or deployment name; `AZURE_OPENAI_DEPLOYMENT` fills it when blank
    pub model: String,
    /// API version query parameter (Azure only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    /// Sampling temperature
    pub temperature: f32,
    /// Completion token limit
    pub max_tokens: u32,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Maximum in-flight requests
    pub max_concurrency: usize,
    /// Source excerpt limit in characters
    pub excerpt_chars: usize,
    /// Language the provider should write reasons in
    pub reason_language: String,
    /// API key, read from the environment only
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::AzureOpenai,
            endpoint: String::new(),
            model: "gpt-4.1".to_string(),
            api_version: Some("2023-05-15".to_string()),
            temperature: 0.2,
            max_tokens: 800,
            timeout_secs: 120,
            max_concurrency: 4,
            excerpt_chars: 12_000,
            reason_language: "English".to_string(),
            api_key: None,
        }
    }
}

/// Factory and builder methods for [`OracleConfig`].
impl OracleConfig {
    /// Fill secrets and blank connection settings from environment variables.
    pub fn with_env(mut self) -> Self {
        let key_vars: &[&str] = match self.provider {
            ProviderKind::AzureOpenai => &["AZURE_OPENAI_KEY", "OPENAI_API_KEY"],
            ProviderKind::Openai => &["OPENAI_API_KEY"],
            ProviderKind::Ollama => &[],
        };
        if self.api_key.is_none() {
            self.api_key = key_vars.iter().find_map(|var| non_empty_env(var));
        }
        if self.provider == ProviderKind::AzureOpenai {
            if self.endpoint.trim().is_empty() {
                if let Some(endpoint) = non_empty_env("AZURE_OPENAI_ENDPOINT") {
                    self.endpoint = endpoint;
                }
            }
            if let Some(version) = non_empty_env("AZURE_OPENAI_API_VERSION") {
                self.api_version = Some(version);
            }
            if self.model.trim().is_empty() {
                if let Some(deployment) = non_empty_env("AZURE_OPENAI_DEPLOYMENT") {
                    self.model = deployment;
                }
            }
        }
        self
    }

    /// Sets the maximum number of in-flight requests.
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Validate numeric settings. Connection settings are checked when the
    /// oracle is constructed, since the environment may still fill them.
    pub fn validate(&self) -> Result<()> {
        validate_range_f32(self.temperature, 0.0, 2.0, "oracle.temperature")?;
        validate_positive_u64(u64::from(self.max_tokens), "oracle.max_tokens")?;
        validate_positive_u64(self.timeout_secs, "oracle.timeout_secs")?;
        validate_positive_usize(self.max_concurrency, "oracle.max_concurrency")?;
        validate_positive_usize(self.excerpt_chars, "oracle.excerpt_chars")
    }
}

fn non_empty_env(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|value| !value.trim().is_empty())
}

/// Everything the suggestion stage hands to a provider for one object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextPacket {
    /// Target kind
    pub kind: ObjectKind,
    /// Target name
    pub name: String,
    /// Target solution tag
    pub solution: Option<String>,
    /// Bounded excerpt of the target's source
    pub excerpt: String,
    /// Whether the excerpt was cut
    pub truncated: bool,
    /// Resolved references with their known namespaces
    pub references: Vec<ContextObject>,
    /// Similar already-labelled objects
    pub neighbors: Vec<Neighbor>,
}

impl ContextPacket {
    /// Cut `text` to at most `max_chars` characters on a char boundary.
    pub fn excerpt_of(text: &str, max_chars: usize) -> (String, bool) {
        match text.char_indices().nth(max_chars) {
            Some((cut, _)) => (text[..cut].to_string(), true),
            None => (text.to_string(), false),
        }
    }
}

/// A provider's decoded answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionResponse {
    /// Proposed label
    #[serde(default)]
    pub namespace: String,
    /// Justification
    #[serde(default)]
    pub reason: String,
    /// Secondary proposals
    #[serde(default)]
    pub alternatives: Vec<SuggestedAlternative>,
}

/// One alternative in a provider answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedAlternative {
    /// Proposed label
    #[serde(default)]
    pub namespace: String,
    /// Justification
    #[serde(default)]
    pub reason: String,
}
