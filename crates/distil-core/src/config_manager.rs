use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Failed to read config: {0}")]
    ReadError(String),

    #[error("Failed to parse config: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Main configuration for Distil
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DistilConfig {
    /// Content extraction (Firecrawl-compatible scrape API)
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Chat-completion API used for all text refinement passes
    #[serde(default)]
    pub llm: LLMConfig,

    /// Image generation for comic rendering
    #[serde(default)]
    pub image: ImageConfig,

    /// Pipeline behavior knobs
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Content-extraction service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Scrape API base URL
    #[serde(default = "default_firecrawl_url")]
    pub base_url: String,

    /// Firecrawl API key
    #[serde(default)]
    pub api_key: Option<String>,

    /// Pages whose extracted text is shorter than this are rejected
    #[serde(default = "default_min_content_chars")]
    pub min_content_chars: usize,

    /// Request timeout in seconds
    #[serde(default = "default_text_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            base_url: default_firecrawl_url(),
            api_key: None,
            min_content_chars: default_min_content_chars(),
            timeout_secs: default_text_timeout_secs(),
        }
    }
}

/// Chat-completion configuration
///
/// Each refinement capability keeps its own model so a single session can mix
/// a reasoning-tier synthesis with cheap simplification passes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    /// API base URL (any OpenAI-compatible endpoint)
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,

    /// OpenAI API key (also used for image generation)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model for the initial dense synthesis pass
    #[serde(default = "default_synthesis_model")]
    pub synthesis_model: String,

    /// Model for simplification passes
    #[serde(default = "default_simplify_model")]
    pub simplify_model: String,

    /// Model for the detail-expansion pass
    #[serde(default = "default_expand_model")]
    pub expand_model: String,

    /// Model for word-budgeted condensation
    #[serde(default = "default_condense_model")]
    pub condense_model: String,

    /// Model for comic-script generation
    #[serde(default = "default_script_model")]
    pub script_model: String,

    /// Reasoning effort for the synthesis model: "minimal", "low", "medium", "high"
    #[serde(default = "default_reasoning_effort")]
    pub reasoning_effort: String,

    /// Maximum tokens to generate per completion
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Request timeout in seconds
    #[serde(default = "default_text_timeout_secs")]
    pub timeout_secs: u64,

    /// Inputs shorter than this are rejected before any call
    #[serde(default = "default_min_refine_chars")]
    pub min_refine_chars: usize,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            base_url: default_openai_base_url(),
            api_key: None,
            synthesis_model: default_synthesis_model(),
            simplify_model: default_simplify_model(),
            expand_model: default_expand_model(),
            condense_model: default_condense_model(),
            script_model: default_script_model(),
            reasoning_effort: default_reasoning_effort(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_text_timeout_secs(),
            min_refine_chars: default_min_refine_chars(),
        }
    }
}

/// Image-generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Image model identifier
    #[serde(default = "default_image_model")]
    pub model: String,

    /// Output dimensions, e.g. "1536x1024"
    #[serde(default = "default_image_size")]
    pub size: String,

    /// Render quality: "low", "medium", "high", "auto"
    #[serde(default = "default_image_quality")]
    pub quality: String,

    /// Output format: "jpeg", "png", "webp"
    #[serde(default = "default_image_format")]
    pub output_format: String,

    /// Compression level for jpeg/webp output (0-100)
    #[serde(default = "default_image_compression")]
    pub output_compression: u8,

    /// Request timeout in seconds (image renders are slow)
    #[serde(default = "default_image_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            model: default_image_model(),
            size: default_image_size(),
            quality: default_image_quality(),
            output_format: default_image_format(),
            output_compression: default_image_compression(),
            timeout_secs: default_image_timeout_secs(),
        }
    }
}

/// Pipeline behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Word budget used by `condense` when the caller does not supply one
    #[serde(default = "default_condense_words")]
    pub default_condense_words: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_condense_words: default_condense_words(),
        }
    }
}

impl DistilConfig {
    /// Check invariants the pipeline relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.extraction.base_url.starts_with("http") {
            return Err(ConfigError::ValidationError(format!(
                "Invalid extraction base URL: {}",
                self.extraction.base_url
            )));
        }
        if !self.llm.base_url.starts_with("http") {
            return Err(ConfigError::ValidationError(format!(
                "Invalid LLM base URL: {}",
                self.llm.base_url
            )));
        }

        if self.extraction.min_content_chars == 0 {
            return Err(ConfigError::ValidationError(
                "min_content_chars must be greater than 0".to_string(),
            ));
        }
        if self.llm.min_refine_chars == 0 {
            return Err(ConfigError::ValidationError(
                "min_refine_chars must be greater than 0".to_string(),
            ));
        }
        if self.extraction.timeout_secs == 0
            || self.llm.timeout_secs == 0
            || self.image.timeout_secs == 0
        {
            return Err(ConfigError::ValidationError(
                "timeouts must be greater than 0 seconds".to_string(),
            ));
        }

        match self.llm.reasoning_effort.as_str() {
            "minimal" | "low" | "medium" | "high" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid reasoning effort: {}. Must be one of: minimal, low, medium, high",
                    other
                )))
            }
        }

        match self.image.output_format.as_str() {
            "jpeg" | "png" | "webp" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid image output format: {}. Must be one of: jpeg, png, webp",
                    other
                )))
            }
        }
        if self.image.output_compression > 100 {
            return Err(ConfigError::ValidationError(format!(
                "Invalid image compression: {}. Must be 0-100",
                self.image.output_compression
            )));
        }

        if self.pipeline.default_condense_words == 0 {
            return Err(ConfigError::ValidationError(
                "default_condense_words must be greater than 0".to_string(),
            ));
        }

        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                    other
                )))
            }
        }

        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: "pretty", "json", "compact"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Default value functions
fn default_firecrawl_url() -> String {
    "https://api.firecrawl.dev".to_string()
}
fn default_min_content_chars() -> usize {
    100
}
fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_synthesis_model() -> String {
    "o4-mini".to_string()
}
fn default_simplify_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_expand_model() -> String {
    "gpt-4o".to_string()
}
fn default_condense_model() -> String {
    "gpt-4o".to_string()
}
fn default_script_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_reasoning_effort() -> String {
    "medium".to_string()
}
fn default_max_tokens() -> usize {
    4096
}
fn default_min_refine_chars() -> usize {
    125
}
fn default_text_timeout_secs() -> u64 {
    15
}
fn default_image_timeout_secs() -> u64 {
    30
}
fn default_image_model() -> String {
    "gpt-image-1".to_string()
}
fn default_image_size() -> String {
    "1536x1024".to_string()
}
fn default_image_quality() -> String {
    "high".to_string()
}
fn default_image_format() -> String {
    "jpeg".to_string()
}
fn default_image_compression() -> u8 {
    70
}
fn default_condense_words() -> usize {
    100
}
// Warn by default so spinner output stays clean
fn default_log_level() -> String {
    "warn".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}

/// Configuration manager with smart defaults
#[derive(Debug)]
pub struct ConfigManager {
    config: DistilConfig,
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Load configuration with the following precedence:
    /// 1. Environment variables (.env file)
    /// 2. Config file (.distil.toml)
    /// 3. Sensible defaults
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_dotenv();

        let (config, config_path) = Self::load_config_file()?;
        Self::finish_load(config, config_path)
    }

    /// Load from an explicit config file, keeping env-variable precedence.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Self::load_dotenv();

        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let config = Self::read_toml_file(path)?;
        Self::finish_load(config, Some(path.to_path_buf()))
    }

    fn finish_load(
        config: DistilConfig,
        config_path: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let config = Self::apply_env_overrides(config);
        config.validate()?;

        if let Some(ref path) = config_path {
            info!("📄 Config file: {}", path.display());
        } else {
            info!("📄 Config file: NONE (using defaults)");
        }
        info!("🧠 Synthesis model: {}", config.llm.synthesis_model);
        info!("🎨 Image model: {}", config.image.model);

        Ok(Self {
            config,
            config_path,
        })
    }

    /// Load .env file if it exists
    fn load_dotenv() {
        // Try current directory first
        if Path::new(".env").exists() {
            if let Err(e) = dotenv::from_filename(".env") {
                warn!("Failed to load .env file: {}", e);
            }
            return;
        }

        // Try home directory
        if let Some(home) = dirs::home_dir() {
            let home_env = home.join(".distil.env");
            if home_env.exists() {
                if let Err(e) = dotenv::from_path(&home_env) {
                    warn!("Failed to load .distil.env: {}", e);
                }
            }
        }
    }

    /// Find and load config file
    /// Search order:
    /// 1. ./.distil.toml (current directory)
    /// 2. ~/.distil/config.toml (user config)
    /// 3. Use defaults
    fn load_config_file() -> Result<(DistilConfig, Option<PathBuf>), ConfigError> {
        let local_config = Path::new(".distil.toml");
        if local_config.exists() {
            let config = Self::read_toml_file(local_config)?;
            return Ok((config, Some(local_config.to_path_buf())));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".distil").join("config.toml");
            if user_config.exists() {
                let config = Self::read_toml_file(&user_config)?;
                return Ok((config, Some(user_config)));
            }
        }

        Ok((DistilConfig::default(), None))
    }

    /// Read TOML config file
    fn read_toml_file(path: &Path) -> Result<DistilConfig, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError(e.to_string()))?;

        let config: DistilConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut config: DistilConfig) -> DistilConfig {
        // Extraction configuration
        if let Ok(key) = std::env::var("FIRECRAWL_API_KEY") {
            config.extraction.api_key = Some(key);
        }
        if let Ok(url) = std::env::var("DISTIL_FIRECRAWL_URL") {
            config.extraction.base_url = url;
        }

        // LLM configuration
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            config.llm.api_key = Some(key);
        }
        if let Ok(url) = std::env::var("OPENAI_BASE_URL") {
            config.llm.base_url = url;
        }
        if let Ok(model) = std::env::var("DISTIL_SYNTHESIS_MODEL") {
            config.llm.synthesis_model = model;
        }
        if let Ok(model) = std::env::var("DISTIL_SIMPLIFY_MODEL") {
            config.llm.simplify_model = model;
        }
        if let Ok(model) = std::env::var("DISTIL_EXPAND_MODEL") {
            config.llm.expand_model = model;
        }
        if let Ok(model) = std::env::var("DISTIL_CONDENSE_MODEL") {
            config.llm.condense_model = model;
        }
        if let Ok(model) = std::env::var("DISTIL_SCRIPT_MODEL") {
            config.llm.script_model = model;
        }
        if let Ok(effort) = std::env::var("DISTIL_REASONING_EFFORT") {
            config.llm.reasoning_effort = effort;
        }
        if let Ok(timeout) = std::env::var("DISTIL_TEXT_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse() {
                config.llm.timeout_secs = secs;
                config.extraction.timeout_secs = secs;
            }
        }

        // Image configuration
        if let Ok(model) = std::env::var("DISTIL_IMAGE_MODEL") {
            config.image.model = model;
        }
        if let Ok(timeout) = std::env::var("DISTIL_IMAGE_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse() {
                config.image.timeout_secs = secs;
            }
        }

        // Logging
        if let Ok(level) = std::env::var("DISTIL_LOG") {
            config.logging.level = level;
        }

        config
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &DistilConfig {
        &self.config
    }

    /// Get the path to the config file that was loaded, if any
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Create a default config file
    pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        let config = DistilConfig::default();
        let toml_str =
            toml::to_string_pretty(&config).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::ReadError(e.to_string()))?;
        }

        std::fs::write(path, toml_str).map_err(|e| ConfigError::ReadError(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DistilConfig::default();
        assert_eq!(config.extraction.base_url, "https://api.firecrawl.dev");
        assert_eq!(config.extraction.min_content_chars, 100);
        assert_eq!(config.llm.min_refine_chars, 125);
        assert_eq!(config.llm.timeout_secs, 15);
        assert_eq!(config.image.timeout_secs, 30);
        assert_eq!(config.image.size, "1536x1024");
    }

    #[test]
    fn test_config_validation() {
        let config = DistilConfig::default();
        assert!(config.validate().is_ok());

        let mut bad_config = config.clone();
        bad_config.logging.level = "loud".to_string();
        assert!(bad_config.validate().is_err());

        let mut bad_config = config.clone();
        bad_config.image.output_compression = 101;
        assert!(bad_config.validate().is_err());

        let mut bad_config = config;
        bad_config.llm.min_refine_chars = 0;
        assert!(bad_config.validate().is_err());
    }

    #[test]
    fn test_environment_overrides() {
        std::env::set_var("FIRECRAWL_API_KEY", "fc-test-key");
        std::env::set_var("DISTIL_SYNTHESIS_MODEL", "o4");
        std::env::set_var("DISTIL_IMAGE_TIMEOUT_SECS", "45");

        let config = ConfigManager::apply_env_overrides(DistilConfig::default());
        assert_eq!(config.extraction.api_key.as_deref(), Some("fc-test-key"));
        assert_eq!(config.llm.synthesis_model, "o4");
        assert_eq!(config.image.timeout_secs, 45);

        // Clean up
        std::env::remove_var("FIRECRAWL_API_KEY");
        std::env::remove_var("DISTIL_SYNTHESIS_MODEL");
        std::env::remove_var("DISTIL_IMAGE_TIMEOUT_SECS");
    }
}
