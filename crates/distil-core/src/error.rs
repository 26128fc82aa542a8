use thiserror::Error;

#[derive(Error, Debug)]
pub enum DistilError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Insufficient content: {got} characters, at least {min} required")]
    InsufficientContent { got: usize, min: usize },

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Upstream service failure: {0}")]
    Upstream(String),

    #[error("Simplification limit reached after {0} passes")]
    LimitReached(u8),

    #[error("Operation not permitted: {0}")]
    InvalidState(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl DistilError {
    /// Timeouts are the one failure class callers may want to retry with a
    /// smaller request, so they stay distinguishable without matching.
    pub fn is_timeout(&self) -> bool {
        matches!(self, DistilError::Timeout(_))
    }
}

pub type Result<T> = std::result::Result<T, DistilError>;
