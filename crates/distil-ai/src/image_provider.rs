use crate::prompts;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use distil_core::{ComicArtifact, DistilError, ImageGenerator, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Configuration for the OpenAI image-generation provider.
#[derive(Debug, Clone)]
pub struct OpenAIImageConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub size: String,
    pub quality: String,
    pub output_format: String,
    pub output_compression: u8,
    pub timeout_secs: u64,
}

impl Default for OpenAIImageConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
            base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            model: "gpt-image-1".to_string(),
            size: "1536x1024".to_string(),
            quality: "high".to_string(),
            output_format: "jpeg".to_string(),
            output_compression: 70,
            timeout_secs: 30,
        }
    }
}

/// Comic-strip renderer backed by the OpenAI images API.
pub struct OpenAIImageProvider {
    config: OpenAIImageConfig,
    client: Client,
}

impl OpenAIImageProvider {
    pub fn new(config: OpenAIImageConfig) -> Result<Self> {
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
        Self::new(OpenAIImageConfig::default())
    }
}

#[async_trait]
impl ImageGenerator for OpenAIImageProvider {
    async fn render(&self, script: &str) -> Result<ComicArtifact> {
        if script.trim().is_empty() {
            return Err(DistilError::InvalidInput(
                "comic script is empty".to_string(),
            ));
        }

        let endpoint = format!("{}/images/generations", self.config.base_url);
        let request = ImageRequest {
            model: self.config.model.clone(),
            prompt: prompts::comic_image_prompt(script),
            size: self.config.size.clone(),
            quality: self.config.quality.clone(),
            output_format: self.config.output_format.clone(),
            output_compression: self.config.output_compression,
        };
        debug!(model = %request.model, size = %request.size, "Requesting comic render");

        let send = async {
            let response = self
                .client
                .post(&endpoint)
                .header("Authorization", format!("Bearer {}", self.config.api_key))
                .header("Content-Type", "application/json")
                .json(&request)
                .send()
                .await
                .map_err(|e| {
                    if e.is_timeout() {
                        DistilError::Timeout(format!(
                            "Image request timed out after {}s",
                            self.config.timeout_secs
                        ))
                    } else {
                        DistilError::Upstream(format!("Image request failed: {}", e))
                    }
                })?;

            let status = response.status();
            if !status.is_success() {
                let text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                return Err(DistilError::Upstream(format!(
                    "Image API error ({}): {}",
                    status, text
                )));
            }

            response.json::<ImageResponse>().await.map_err(|e| {
                DistilError::Upstream(format!("Failed to parse image response: {}", e))
            })
        };

        let parsed = tokio::time::timeout(Duration::from_secs(self.config.timeout_secs), send)
            .await
            .map_err(|_| {
                DistilError::Timeout(format!(
                    "Image request timed out after {}s",
                    self.config.timeout_secs
                ))
            })??;

        let payload = parsed
            .data
            .into_iter()
            .next()
            .and_then(|datum| datum.b64_json)
            .ok_or_else(|| DistilError::Upstream("Image API returned no image data".to_string()))?;

        Ok(ComicArtifact {
            image: decode_image(&payload)?,
            media_type: format!("image/{}", self.config.output_format),
        })
    }
}

fn decode_image(b64: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(b64)
        .map_err(|e| DistilError::Upstream(format!("Failed to decode image payload: {}", e)))
}

#[derive(Debug, Serialize)]
struct ImageRequest {
    model: String,
    prompt: String,
    size: String,
    quality: String,
    output_format: String,
    output_compression: u8,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    data: Vec<ImageDatum>,
}

#[derive(Debug, Deserialize)]
struct ImageDatum {
    #[serde(default)]
    b64_json: Option<String>,
}
