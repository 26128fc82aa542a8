use crate::firecrawl_provider::{FirecrawlConfig, FirecrawlProvider};
use crate::image_provider::{OpenAIImageConfig, OpenAIImageProvider};
use crate::openai_provider::{OpenAIConfig, OpenAIProvider};
use crate::pipeline::RefinementPipeline;
use crate::refiner::LLMRefiner;
use distil_core::{
    ContentExtractor, DistilConfig, DistilError, ImageGenerator, Result, TextRefiner,
};
use std::sync::Arc;

/// Builds providers and pipelines from a loaded [`DistilConfig`].
pub struct ProviderFactory;

impl ProviderFactory {
    pub fn create_extractor(config: &DistilConfig) -> Result<Arc<dyn ContentExtractor>> {
        let api_key = config.extraction.api_key.clone().ok_or_else(|| {
            DistilError::Configuration(
                "Firecrawl API key not set. Set FIRECRAWL_API_KEY or configure extraction.api_key"
                    .to_string(),
            )
        })?;

        let provider = FirecrawlProvider::new(FirecrawlConfig {
            api_key,
            base_url: config.extraction.base_url.clone(),
            min_content_chars: config.extraction.min_content_chars,
            timeout_secs: config.extraction.timeout_secs,
        })?;
        Ok(Arc::new(provider))
    }

    pub fn create_refiner(config: &DistilConfig) -> Result<Arc<dyn TextRefiner>> {
        let provider = OpenAIProvider::new(OpenAIConfig {
            api_key: require_openai_key(config)?,
            base_url: config.llm.base_url.clone(),
            model: config.llm.simplify_model.clone(),
            timeout_secs: config.llm.timeout_secs,
        })?;
        Ok(Arc::new(LLMRefiner::new(
            Arc::new(provider),
            config.llm.clone(),
        )))
    }

    pub fn create_renderer(config: &DistilConfig) -> Result<Arc<dyn ImageGenerator>> {
        let provider = OpenAIImageProvider::new(OpenAIImageConfig {
            api_key: require_openai_key(config)?,
            base_url: config.llm.base_url.clone(),
            model: config.image.model.clone(),
            size: config.image.size.clone(),
            quality: config.image.quality.clone(),
            output_format: config.image.output_format.clone(),
            output_compression: config.image.output_compression,
            timeout_secs: config.image.timeout_secs,
        })?;
        Ok(Arc::new(provider))
    }

    /// Assemble the full pipeline from one config.
    pub fn create_pipeline(config: &DistilConfig) -> Result<RefinementPipeline> {
        Ok(RefinementPipeline::new(
            Self::create_extractor(config)?,
            Self::create_refiner(config)?,
            Self::create_renderer(config)?,
            config.pipeline.clone(),
        ))
    }
}

fn require_openai_key(config: &DistilConfig) -> Result<String> {
    config.llm.api_key.clone().ok_or_else(|| {
        DistilError::Configuration(
            "OpenAI API key not set. Set OPENAI_API_KEY or configure llm.api_key".to_string(),
        )
    })
}
