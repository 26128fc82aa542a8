use crate::llm_provider::{GenerationConfig, LLMProvider, Message, MessageRole};
use crate::prompts;
use async_trait::async_trait;
use distil_core::{DistilError, LLMConfig, Result, TextRefiner};
use std::sync::Arc;
use tracing::debug;

/// One text-refinement capability, with its prompt and sampling profile.
///
/// Temperatures are fixed per pass: refinement passes that must preserve
/// facts run cool (0.4), while condensation and scriptwriting get more
/// freedom (0.7). Synthesis runs on a reasoning model and sends an effort
/// level instead of a temperature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefinementPass {
    Synthesize,
    Simplify,
    Expand,
    Condense { max_words: usize },
    Script,
}

impl RefinementPass {
    pub fn name(&self) -> &'static str {
        match self {
            RefinementPass::Synthesize => "synthesize",
            RefinementPass::Simplify => "simplify",
            RefinementPass::Expand => "expand",
            RefinementPass::Condense { .. } => "condense",
            RefinementPass::Script => "script",
        }
    }

    fn system_prompt(&self) -> String {
        match self {
            RefinementPass::Synthesize => prompts::synthesize_system_prompt().to_string(),
            RefinementPass::Simplify => prompts::simplify_system_prompt().to_string(),
            RefinementPass::Expand => prompts::expand_system_prompt().to_string(),
            RefinementPass::Condense { max_words } => prompts::condense_system_prompt(*max_words),
            RefinementPass::Script => prompts::script_system_prompt().to_string(),
        }
    }

    fn generation(&self, config: &LLMConfig) -> GenerationConfig {
        match self {
            RefinementPass::Synthesize => GenerationConfig {
                model: Some(config.synthesis_model.clone()),
                temperature: None,
                max_tokens: None,
                reasoning_effort: Some(config.reasoning_effort.clone()),
            },
            RefinementPass::Simplify => GenerationConfig {
                model: Some(config.simplify_model.clone()),
                temperature: Some(0.4),
                max_tokens: Some(config.max_tokens),
                reasoning_effort: None,
            },
            RefinementPass::Expand => GenerationConfig {
                model: Some(config.expand_model.clone()),
                temperature: Some(0.4),
                max_tokens: Some(config.max_tokens),
                reasoning_effort: None,
            },
            RefinementPass::Condense { .. } => GenerationConfig {
                model: Some(config.condense_model.clone()),
                temperature: Some(0.7),
                max_tokens: Some(config.max_tokens),
                reasoning_effort: None,
            },
            RefinementPass::Script => GenerationConfig {
                model: Some(config.script_model.clone()),
                temperature: Some(0.7),
                max_tokens: Some(config.max_tokens),
                reasoning_effort: None,
            },
        }
    }
}

/// [`TextRefiner`] that drives all passes through one chat-completion provider.
pub struct LLMRefiner {
    provider: Arc<dyn LLMProvider>,
    config: LLMConfig,
}

impl LLMRefiner {
    pub fn new(provider: Arc<dyn LLMProvider>, config: LLMConfig) -> Self {
        Self { provider, config }
    }

    async fn run_pass(&self, pass: RefinementPass, content: &str) -> Result<String> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(DistilError::InvalidInput(
                "no content to refine".to_string(),
            ));
        }

        // Synthesis and simplification carry the minimum-length gate; the
        // remaining passes accept any non-empty text.
        if matches!(pass, RefinementPass::Synthesize | RefinementPass::Simplify) {
            let got = trimmed.chars().count();
            if got < self.config.min_refine_chars {
                return Err(DistilError::InsufficientContent {
                    got,
                    min: self.config.min_refine_chars,
                });
            }
        }

        let messages = vec![
            Message {
                role: MessageRole::System,
                content: pass.system_prompt(),
            },
            Message {
                role: MessageRole::User,
                content: trimmed.to_string(),
            },
        ];
        let generation = pass.generation(&self.config);
        debug!(
            pass = pass.name(),
            model = generation.model.as_deref().unwrap_or("default"),
            "Running refinement pass"
        );

        let response = self.provider.generate_chat(&messages, &generation).await?;
        Ok(response.content.trim().to_string())
    }
}

#[async_trait]
impl TextRefiner for LLMRefiner {
    async fn synthesize(&self, content: &str) -> Result<String> {
        self.run_pass(RefinementPass::Synthesize, content).await
    }

    async fn simplify(&self, content: &str) -> Result<String> {
        self.run_pass(RefinementPass::Simplify, content).await
    }

    async fn expand(&self, content: &str) -> Result<String> {
        self.run_pass(RefinementPass::Expand, content).await
    }

    async fn condense(&self, content: &str, max_words: usize) -> Result<String> {
        if max_words == 0 {
            return Err(DistilError::InvalidInput(
                "condense target must be at least one word".to_string(),
            ));
        }
        self.run_pass(RefinementPass::Condense { max_words }, content)
            .await
    }

    async fn script(&self, content: &str) -> Result<String> {
        self.run_pass(RefinementPass::Script, content).await
    }
}
