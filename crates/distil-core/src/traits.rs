use crate::types::ComicArtifact;
use crate::Result;
use async_trait::async_trait;

/// Retrieves the readable content of a web page.
#[async_trait]
pub trait ContentExtractor: Send + Sync {
    async fn extract(&self, url: &str) -> Result<String>;
}

/// Text refinement capabilities backed by a language model. Implementations
/// reject empty input, and `synthesize` and `simplify` additionally enforce
/// a minimum content length, before issuing any call.
#[async_trait]
pub trait TextRefiner: Send + Sync {
    /// Initial dense synthesis of raw extracted content.
    async fn synthesize(&self, content: &str) -> Result<String>;

    /// One simplification notch down from the given summary.
    async fn simplify(&self, summary: &str) -> Result<String>;

    /// Adds background and context to a summary.
    async fn expand(&self, summary: &str) -> Result<String>;

    /// Compresses content to at most `max_words` words.
    async fn condense(&self, content: &str, max_words: usize) -> Result<String>;

    /// Turns a summary into a comic-strip script.
    async fn script(&self, summary: &str) -> Result<String>;
}

/// Renders a comic script into an image artifact.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn render(&self, script: &str) -> Result<ComicArtifact>;
}
