//! Suggestion oracle: chat-model integration for namespace proposals.
//!
//! The engine talks to suggestion providers through [`SuggestionProvider`],
//! which returns the provider's raw text. Interpreting that text (JSON
//! extraction, allow-list validation) is the assignment engine's job, so a
//! provider only has to move bytes.
//!
//! [`ChatOracle`] speaks three backends:
//! - Azure OpenAI deployments (`api-key` header, `api-version` query)
//! - OpenAI-compatible chat completions (bearer token)
//! - Ollama's local `generate` endpoint

pub mod chat;
pub mod extract;
pub mod prompt;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::assign::AllowList;
use crate::core::errors::{Result, TaxonError, TaxonResultExt};

pub use chat::{ChatMessage, ChatRequest, ChatResponse, GenerateOptions, GenerateRequest, GenerateResponse};
pub use extract::{extract_first_object, Extracted};
pub use prompt::build_prompt;
pub use types::{ContextPacket, OracleConfig, ProviderKind, SuggestionResponse, SuggestedAlternative};

/// A collaborator that proposes a namespace for one object.
#[async_trait]
pub trait SuggestionProvider: Send + Sync {
    /// Return the provider's raw answer for `packet`.
    async fn suggest(&self, packet: &ContextPacket) -> Result<String>;

    /// Name used in logs.
    fn name(&self) -> &str {
        "provider"
    }
}

/// Chat-model suggestion provider
pub struct ChatOracle {
    config: OracleConfig,
    allow_list: AllowList,
    client: reqwest::Client,
}

impl ChatOracle {
    /// Create a new oracle; fails when connection settings are incomplete.
    pub fn new(config: OracleConfig, allow_list: AllowList) -> Result<Self> {
        if config.endpoint.trim().is_empty() {
            return Err(TaxonError::config_field(
                "oracle endpoint is not configured (set oracle.endpoint or AZURE_OPENAI_ENDPOINT)",
                "oracle.endpoint",
            ));
        }
        if config.model.trim().is_empty() {
            return Err(TaxonError::config_field("oracle model is not configured", "oracle.model"));
        }
        if config.provider != ProviderKind::Ollama && config.api_key.is_none() {
            return Err(TaxonError::config_field(
                format!(
                    "no API key for provider {} (set AZURE_OPENAI_KEY or OPENAI_API_KEY)",
                    config.provider.as_str()
                ),
                "oracle.api_key",
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_generic_err("building HTTP client")?;

        Ok(Self {
            config,
            allow_list,
            client,
        })
    }

    fn endpoint(&self) -> &str {
        self.config.endpoint.trim_end_matches('/')
    }

    async fn query_chat(&self, prompt: String) -> Result<String> {
        let (url, include_model) = match self.config.provider {
            ProviderKind::AzureOpenai => {
                let version = self.config.api_version.as_deref().unwrap_or("2023-05-15");
                (
                    format!(
                        "{}/openai/deployments/{}/chat/completions?api-version={}",
                        self.endpoint(),
                        self.config.model,
                        version
                    ),
                    false,
                )
            }
            _ => (format!("{}/chat/completions", self.endpoint()), true),
        };

        let request = ChatRequest {
            model: include_model.then(|| self.config.model.clone()),
            messages: vec![ChatMessage::system(prompt::SYSTEM_PROMPT), ChatMessage::user(prompt)],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let mut builder = self.client.post(&url).json(&request);
        if let Some(key) = &self.config.api_key {
            builder = match self.config.provider {
                ProviderKind::AzureOpenai => builder.header("api-key", key),
                _ => builder.bearer_auth(key),
            };
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(TaxonError::oracle(format!("chat API returned {status}: {error_text}"))
                .with_context(self.config.provider.as_str()));
        }

        let body = response.text().await?;
        let chat: ChatResponse = serde_json::from_str(&body).map_json_err("chat completion response")?;
        chat.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| {
                TaxonError::oracle("empty chat completion").with_context(self.config.provider.as_str())
            })
    }

    async fn query_ollama(&self, prompt: String) -> Result<String> {
        let url = format!("{}/api/generate", self.endpoint());
        let request = GenerateRequest {
            model: self.config.model.clone(),
            prompt,
            system: prompt::SYSTEM_PROMPT.to_string(),
            stream: false,
            options: GenerateOptions {
                temperature: self.config.temperature,
                num_predict: self.config.max_tokens,
            },
        };

        let response = self.client.post(&url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(TaxonError::oracle(format!("ollama returned {status}: {error_text}"))
                .with_context("ollama"));
        }

        let body = response.text().await?;
        let generated: GenerateResponse = serde_json::from_str(&body).map_json_err("ollama response")?;
        if generated.response.trim().is_empty() {
            return Err(TaxonError::oracle("empty ollama response").with_context("ollama"));
        }
        Ok(generated.response)
    }
}

#[async_trait]
impl SuggestionProvider for ChatOracle {
    async fn suggest(&self, packet: &ContextPacket) -> Result<String> {
        let prompt = build_prompt(packet, &self.allow_list, &self.config.reason_language);
        debug!(
            "Querying {} for {} {} ({} prompt chars)",
            self.config.provider.as_str(),
            packet.kind,
            packet.name,
            prompt.len()
        );
        match self.config.provider {
            ProviderKind::Ollama => self.query_ollama(prompt).await,
            ProviderKind::AzureOpenai | ProviderKind::Openai => self.query_chat(prompt).await,
        }
    }

    fn name(&self) -> &str {
        self.config.provider.as_str()
    }
}
