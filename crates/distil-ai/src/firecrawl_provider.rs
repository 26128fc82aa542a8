use async_trait::async_trait;
use distil_core::{ContentExtractor, DistilError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Configuration for the Firecrawl scraping provider.
#[derive(Debug, Clone)]
pub struct FirecrawlConfig {
    pub api_key: String,
    pub base_url: String,
    /// Pages yielding fewer characters than this are rejected as unusable.
    pub min_content_chars: usize,
    pub timeout_secs: u64,
}

impl Default for FirecrawlConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("FIRECRAWL_API_KEY").unwrap_or_default(),
            base_url: "https://api.firecrawl.dev".to_string(),
            min_content_chars: 100,
            timeout_secs: 15,
        }
    }
}

/// Page-content extractor backed by the Firecrawl scrape API.
pub struct FirecrawlProvider {
    config: FirecrawlConfig,
    client: Client,
}

impl FirecrawlProvider {
    pub fn new(config: FirecrawlConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(DistilError::Configuration(
                "Firecrawl API key not set. Set FIRECRAWL_API_KEY or configure extraction.api_key"
                    .to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DistilError::Upstream(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(FirecrawlConfig::default())
    }
}

#[async_trait]
impl ContentExtractor for FirecrawlProvider {
    async fn extract(&self, url: &str) -> Result<String> {
        let endpoint = format!("{}/v1/scrape", self.config.base_url);
        let request = ScrapeRequest {
            url: url.to_string(),
        };
        debug!(%url, "Requesting page scrape");

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
                            "Firecrawl request timed out after {}s",
                            self.config.timeout_secs
                        ))
                    } else {
                        DistilError::Upstream(format!("Firecrawl request failed: {}", e))
                    }
                })?;

            let status = response.status();
            if !status.is_success() {
                let text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                return Err(DistilError::Upstream(format!(
                    "Firecrawl API error ({}): {}",
                    status, text
                )));
            }

            response.json::<ScrapeResponse>().await.map_err(|e| {
                DistilError::Upstream(format!("Failed to parse Firecrawl response: {}", e))
            })
        };

        let parsed = tokio::time::timeout(Duration::from_secs(self.config.timeout_secs), send)
            .await
            .map_err(|_| {
                DistilError::Timeout(format!(
                    "Firecrawl request timed out after {}s",
                    self.config.timeout_secs
                ))
            })??;

        content_from_response(parsed, self.config.min_content_chars)
    }
}

/// Picks the first non-empty content field. Scrape responses are not uniform
/// across page types, so several field names are tried in order.
fn first_content(response: &ScrapeResponse) -> Option<&str> {
    let candidates = [
        response.content.as_deref(),
        response.extracted_text.as_deref(),
        response.text.as_deref(),
        response.raw_text.as_deref(),
        response.data.as_ref().and_then(|d| d.markdown.as_deref()),
    ];
    candidates.into_iter().flatten().find(|s| !s.is_empty())
}

fn content_from_response(response: ScrapeResponse, min: usize) -> Result<String> {
    match first_content(&response) {
        Some(text) if text.chars().count() >= min => Ok(text.to_string()),
        Some(text) => Err(DistilError::InsufficientContent {
            got: text.chars().count(),
            min,
        }),
        None => Err(DistilError::InsufficientContent { got: 0, min }),
    }
}

#[derive(Debug, Serialize)]
struct ScrapeRequest {
    url: String,
}

#[derive(Debug, Default, Deserialize)]
struct ScrapeResponse {
    #[serde(default)]
    content: Option<String>,
    #[serde(default, rename = "extractedText")]
    extracted_text: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default, rename = "rawText")]
    raw_text: Option<String>,
    #[serde(default)]
    data: Option<ScrapeData>,
}

#[derive(Debug, Default, Deserialize)]
struct ScrapeData {
    #[serde(default)]
    markdown: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_reads_api_key_from_env() {
        std::env::set_var("FIRECRAWL_API_KEY", "test-key");
        let config = FirecrawlConfig::default();
        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.base_url, "https://api.firecrawl.dev");
        assert_eq!(config.min_content_chars, 100);
    }

    #[test]
    fn test_creation_requires_api_key() {
        let config = FirecrawlConfig {
            api_key: String::new(),
            ..FirecrawlConfig::default()
        };
        assert!(matches!(
            FirecrawlProvider::new(config),
            Err(DistilError::Configuration(_))
        ));
    }

    #[test]
    fn test_fallback_skips_empty_fields() {
        let raw = r#"{"content":"","extractedText":"","text":"actual body text","rawText":"x"}"#;
        let response: ScrapeResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(first_content(&response), Some("actual body text"));
    }

    #[test]
    fn test_fallback_reaches_nested_markdown() {
        let raw = r##"{"data":{"markdown":"# Heading\n\nBody."}}"##;
        let response: ScrapeResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(first_content(&response), Some("# Heading\n\nBody."));
    }

    #[test]
    fn test_short_content_is_rejected() {
        let response = ScrapeResponse {
            content: Some("too short".to_string()),
            ..ScrapeResponse::default()
        };
        let err = content_from_response(response, 100).unwrap_err();
        match err {
            DistilError::InsufficientContent { got, min } => {
                assert_eq!(got, 9);
                assert_eq!(min, 100);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_content_reports_zero_characters() {
        let err = content_from_response(ScrapeResponse::default(), 100).unwrap_err();
        assert!(matches!(
            err,
            DistilError::InsufficientContent { got: 0, min: 100 }
        ));
    }

    #[test]
    fn test_long_content_passes_threshold() {
        let body = "word ".repeat(50);
        let response = ScrapeResponse {
            content: Some(body.clone()),
            ..ScrapeResponse::default()
        };
        assert_eq!(content_from_response(response, 100).unwrap(), body);
    }
}
