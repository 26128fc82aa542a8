use async_trait::async_trait;
use distil_core::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Generation parameters for a single chat-completion request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Model override for this request; falls back to the provider default.
    pub model: Option<String>,
    /// Sampling temperature. Reasoning models reject this field, so it stays
    /// unset for them.
    pub temperature: Option<f32>,
    /// Maximum tokens to generate.
    pub max_tokens: Option<usize>,
    /// Reasoning effort for reasoning models: "minimal", "low", "medium", "high".
    pub reasoning_effort: Option<String>,
}

/// Message in a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

/// Role of a message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// Response from a chat-completion provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMResponse {
    pub content: String,
    pub total_tokens: Option<usize>,
    pub prompt_tokens: Option<usize>,
    pub completion_tokens: Option<usize>,
    pub finish_reason: Option<String>,
    pub model: String,
}

/// Main trait for chat-completion providers.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate a completion for a single user prompt.
    async fn generate(&self, prompt: &str) -> Result<LLMResponse> {
        let messages = vec![Message {
            role: MessageRole::User,
            content: prompt.to_string(),
        }];
        self.generate_chat(&messages, &GenerationConfig::default())
            .await
    }

    /// Generate a chat completion with message history.
    async fn generate_chat(
        &self,
        messages: &[Message],
        config: &GenerationConfig,
    ) -> Result<LLMResponse>;

    /// Check if the provider is reachable and ready.
    async fn is_available(&self) -> bool;

    /// Name of this provider.
    fn provider_name(&self) -> &str;

    /// Default model identifier.
    fn model_name(&self) -> &str;
}
