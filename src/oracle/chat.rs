//! Chat API request and response types.

use serde::{Deserialize, Serialize};

/// OpenAI-style chat completion request
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    /// Model name; Azure takes the deployment from the URL instead
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Conversation so far
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature
    pub temperature: f32,
    /// Completion length cap
    pub max_tokens: u32,
}

/// One chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// `system`, `user` or `assistant`
    pub role: String,
    /// Message text
    pub content: String,
}

impl ChatMessage {
    /// A system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// A user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Chat completion response.
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    /// Completion choices; the first one is used
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

/// One completion choice.
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    /// Assistant message
    pub message: ChatMessage,
}

/// Ollama `/api/generate` request
#[derive(Debug, Serialize)]
pub struct GenerateRequest {
    /// Model tag
    pub model: String,
    /// User prompt
    pub prompt: String,
    /// System prompt
    pub system: String,
    /// Always false; the answer is read in one piece
    pub stream: bool,
    /// Sampling options
    pub options: GenerateOptions,
}

/// Sampling options for Ollama.
#[derive(Debug, Serialize)]
pub struct GenerateOptions {
    /// Sampling temperature
    pub temperature: f32,
    /// Completion length cap
    pub num_predict: u32,
}

/// Ollama `/api/generate` response
#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    /// Generated text
    #[serde(default)]
    pub response: String,
}
