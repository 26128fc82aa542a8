pub mod factory;
pub mod firecrawl_provider;
pub mod image_provider;
pub mod llm_provider;
pub mod openai_provider;
pub mod pipeline;
pub mod prompts;
pub mod refiner;

pub use factory::ProviderFactory;
pub use firecrawl_provider::{FirecrawlConfig, FirecrawlProvider};
pub use image_provider::{OpenAIImageConfig, OpenAIImageProvider};
pub use llm_provider::*;
pub use openai_provider::{OpenAIConfig, OpenAIProvider};
pub use pipeline::RefinementPipeline;
pub use refiner::{LLMRefiner, RefinementPass};
