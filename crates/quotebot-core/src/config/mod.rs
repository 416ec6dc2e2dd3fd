//! Configuration management

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// LLM service configuration
    #[serde(default)]
    pub llm_service: LLMServiceConfig,

    /// Dialogue behaviour
    #[serde(default)]
    pub chat: ChatConfig,

    /// Plan store location
    #[serde(default)]
    pub store: StoreConfig,

    /// HTTP serving boundary
    #[serde(default)]
    pub server: ServerConfig,
}

/// LLM service configuration for external inference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMServiceConfig {
    /// Base URL of the LLM service for chat/completions
    #[serde(default = "default_llm_url")]
    pub url: String,

    /// Model (deployment) name for chat completions
    #[serde(default = "default_chat_model")]
    pub model: String,

    /// Base URL for embeddings service (can be different from LLM URL)
    #[serde(default)]
    pub embedding_url: Option<String>,

    /// Model name for embeddings
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Embedding dimensions (will be auto-detected if not specified)
    #[serde(default)]
    pub embedding_dimensions: Option<usize>,

    /// API key (optional, for authenticated services)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl LLMServiceConfig {
    /// Get the embeddings URL (falls back to main URL if not specified)
    pub fn embeddings_url(&self) -> &str {
        self.embedding_url.as_deref().unwrap_or(&self.url)
    }
}

impl Default for LLMServiceConfig {
    fn default() -> Self {
        Self {
            url: default_llm_url(),
            model: default_chat_model(),
            embedding_url: std::env::var("QUOTEBOT_EMBEDDING_URL").ok(),
            embedding_model: default_embedding_model(),
            embedding_dimensions: std::env::var("QUOTEBOT_EMBEDDING_DIMS")
                .ok()
                .and_then(|s| s.parse().ok()),
            api_key: std::env::var("QUOTEBOT_LLM_API_KEY").ok(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_llm_url() -> String {
    std::env::var("QUOTEBOT_LLM_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
}

fn default_chat_model() -> String {
    std::env::var("QUOTEBOT_LLM_MODEL").unwrap_or_else(|_| "gpt-4.1-mini".to_string())
}

fn default_embedding_model() -> String {
    std::env::var("QUOTEBOT_EMBEDDING_MODEL")
        .unwrap_or_else(|_| "sentence-transformers/all-MiniLM-L6-v2".to_string())
}

fn default_timeout() -> u64 {
    30
}

/// Sampling parameters for one completion call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingConfig {
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Dialogue configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Sampling for the intent classifier (deterministic)
    #[serde(default = "default_classifier_sampling")]
    pub classifier: SamplingConfig,

    /// Sampling for the answer generator
    #[serde(default = "default_generator_sampling")]
    pub generator: SamplingConfig,

    /// Maximum number of prior turns replayed to the generator
    #[serde(default = "default_max_history_turns")]
    pub max_history_turns: usize,

    /// Maximum characters of prior turns replayed to the generator
    #[serde(default = "default_max_history_chars")]
    pub max_history_chars: usize,

    /// Maximum accepted user message length in characters
    #[serde(default = "default_max_message_length")]
    pub max_message_length: usize,

    /// Idle time after which a session is discarded
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            classifier: default_classifier_sampling(),
            generator: default_generator_sampling(),
            max_history_turns: default_max_history_turns(),
            max_history_chars: default_max_history_chars(),
            max_message_length: default_max_message_length(),
            session_ttl_secs: default_session_ttl(),
        }
    }
}

fn default_classifier_sampling() -> SamplingConfig {
    SamplingConfig {
        temperature: 0.0,
        max_tokens: 300,
    }
}

fn default_generator_sampling() -> SamplingConfig {
    SamplingConfig {
        temperature: 0.2,
        max_tokens: 800,
    }
}

fn default_max_history_turns() -> usize {
    10
}

fn default_max_history_chars() -> usize {
    12_000
}

fn default_max_message_length() -> usize {
    2_000
}

fn default_session_ttl() -> u64 {
    3_600
}

/// Plan store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Database path (defaults to the user cache directory)
    #[serde(default)]
    pub db_path: Option<PathBuf>,

    /// Collection holding the insurance plans
    #[serde(default = "default_collection")]
    pub collection: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            collection: default_collection(),
        }
    }
}

impl StoreConfig {
    /// Resolve the database path: `QUOTEBOT_DB`, then config, then default
    pub fn resolve_db_path(&self) -> PathBuf {
        std::env::var("QUOTEBOT_DB")
            .map(PathBuf::from)
            .ok()
            .or_else(|| self.db_path.clone())
            .unwrap_or_else(crate::db::Database::default_path)
    }
}

fn default_collection() -> String {
    "insurance_quotes".to_string()
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5002
}

impl Config {
    /// Load config from default path
    pub fn load() -> Result<Self> {
        Self::load_from(Self::default_path())
    }

    /// Load config from a specific path, falling back to defaults if missing
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_yaml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_chat_defaults_match_classifier_and_generator_settings() {
        let chat = ChatConfig::default();
        assert_eq!(chat.classifier.temperature, 0.0);
        assert_eq!(chat.classifier.max_tokens, 300);
        assert_eq!(chat.generator.temperature, 0.2);
        assert_eq!(chat.generator.max_tokens, 800);
        assert!(chat.max_history_turns > 0);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = "chat:\n  max_history_turns: 4\nserver:\n  port: 9000\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.chat.max_history_turns, 4);
        assert_eq!(config.chat.max_message_length, 2_000);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.store.collection, "insurance_quotes");
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(
            &path,
            "chat:\n  max_history_chars: 500\nstore:\n  collection: quotes_test\n",
        )
        .unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.chat.max_history_chars, 500);
        assert_eq!(loaded.store.collection, "quotes_test");
    }

    #[test]
    fn test_load_invalid_yaml_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(&path, "chat: [unclosed").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(dir.path().join("absent.yml")).unwrap();
        assert_eq!(config.server.port, 5002);
    }

    #[test]
    fn test_embeddings_url_fallback() {
        let mut llm = LLMServiceConfig::default();
        llm.url = "http://llm:8000".to_string();
        llm.embedding_url = None;
        assert_eq!(llm.embeddings_url(), "http://llm:8000");
        llm.embedding_url = Some("http://embed:9000".to_string());
        assert_eq!(llm.embeddings_url(), "http://embed:9000");
    }
}
