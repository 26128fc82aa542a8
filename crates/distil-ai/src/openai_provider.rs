use crate::llm_provider::{GenerationConfig, LLMProvider, LLMResponse, Message, MessageRole};
use async_trait::async_trait;
use distil_core::{DistilError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration for the OpenAI chat-completions provider.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
            base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 15,
        }
    }
}

/// Chat-completions provider backed by the OpenAI API.
pub struct OpenAIProvider {
    config: OpenAIConfig,
    client: Client,
}

impl OpenAIProvider {
    pub fn new(config: OpenAIConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(DistilError::Configuration(
                "OpenAI API key not set. Set OPENAI_API_KEY or configure llm.api_key".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DistilError::Upstream(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(OpenAIConfig::default())
    }

    async fn try_request(&self, request: &ChatRequest) -> Result<LLMResponse> {
        let url = format!("{}/chat/completions", self.config.base_url);
        debug!(model = %request.model, "Sending chat completion request");

        let send = async {
            let response = self
                .client
                .post(&url)
                .header("Authorization", format!("Bearer {}", self.config.api_key))
                .header("Content-Type", "application/json")
                .json(request)
                .send()
                .await
                .map_err(|e| {
                    if e.is_timeout() {
                        DistilError::Timeout(format!(
                            "OpenAI request timed out after {}s",
                            self.config.timeout_secs
                        ))
                    } else {
                        DistilError::Upstream(format!("OpenAI request failed: {}", e))
                    }
                })?;

            let status = response.status();
            if !status.is_success() {
                let text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                return Err(DistilError::Upstream(format!(
                    "OpenAI API error ({}): {}",
                    status, text
                )));
            }

            response.json::<ChatResponse>().await.map_err(|e| {
                DistilError::Upstream(format!("Failed to parse OpenAI response: {}", e))
            })
        };

        // The timeout covers the full request, including reading the body.
        let parsed = tokio::time::timeout(Duration::from_secs(self.config.timeout_secs), send)
            .await
            .map_err(|_| {
                DistilError::Timeout(format!(
                    "OpenAI request timed out after {}s",
                    self.config.timeout_secs
                ))
            })??;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| DistilError::Upstream("OpenAI returned no choices".to_string()))?;

        if choice.message.content.trim().is_empty() {
            return Err(DistilError::Upstream(
                "OpenAI returned an empty completion".to_string(),
            ));
        }

        Ok(LLMResponse {
            content: choice.message.content,
            total_tokens: parsed.usage.as_ref().map(|u| u.total_tokens),
            prompt_tokens: parsed.usage.as_ref().map(|u| u.prompt_tokens),
            completion_tokens: parsed.usage.as_ref().map(|u| u.completion_tokens),
            finish_reason: choice.finish_reason,
            model: parsed.model.unwrap_or_else(|| request.model.clone()),
        })
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    async fn generate_chat(
        &self,
        messages: &[Message],
        config: &GenerationConfig,
    ) -> Result<LLMResponse> {
        let request = ChatRequest {
            model: config
                .model
                .clone()
                .unwrap_or_else(|| self.config.model.clone()),
            messages: messages.to_vec(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            reasoning_effort: config.reasoning_effort.clone(),
        };
        self.try_request(&request).await
    }

    async fn is_available(&self) -> bool {
        let probe = GenerationConfig {
            max_tokens: Some(1),
            ..Default::default()
        };
        let messages = [Message {
            role: MessageRole::User,
            content: "ping".to_string(),
        }];
        match self.generate_chat(&messages, &probe).await {
            Ok(_) => true,
            Err(e) => {
                warn!("OpenAI availability check failed: {}", e);
                false
            }
        }
    }

    fn provider_name(&self) -> &str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning_effort: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: usize,
    completion_tokens: usize,
    total_tokens: usize,
}
