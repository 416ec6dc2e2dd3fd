//! Error types for quotebot

use thiserror::Error;

/// Result type alias using QuoteBotError
pub type Result<T> = std::result::Result<T, QuoteBotError>;

/// Error type alias for convenience
pub type Error = QuoteBotError;

/// Exit codes for CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const NOT_FOUND: i32 = 2;
    pub const INVALID_INPUT: i32 = 3;
}

/// Main error type for quotebot
#[derive(Debug, Error)]
pub enum QuoteBotError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("External service error: {0}")]
    ExternalError(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl QuoteBotError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::SessionNotFound(_) => exit_codes::NOT_FOUND,
            Self::InvalidInput(_) | Self::Config(_) => exit_codes::INVALID_INPUT,
            _ => exit_codes::GENERAL_ERROR,
        }
    }

    /// Whether this error came from a classifier, store or generator round trip.
    ///
    /// The serving boundary answers these with a generic failure message and
    /// never shows the inner detail to the user.
    pub fn is_collaborator_failure(&self) -> bool {
        matches!(
            self,
            Self::Database(_)
                | Self::Http(_)
                | Self::Llm(_)
                | Self::ExternalError(_)
                | Self::Serialization(_)
                | Self::Other(_)
        )
    }
}
