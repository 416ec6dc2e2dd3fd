//! HTTP client for external LLM services (vLLM, OpenAI, Azure OpenAI, etc.)

use crate::config::{LLMServiceConfig, SamplingConfig};
use crate::error::{QuoteBotError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Trait for LLM service clients
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate chat completion
    async fn chat_completion(
        &self,
        messages: Vec<ChatMessage>,
        options: &CompletionOptions,
    ) -> Result<String>;

    /// Generate embeddings for text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Get embedding dimensions
    fn embedding_dimensions(&self) -> usize;

    /// Get model name
    fn model_name(&self) -> &str;
}

/// Chat message for completion requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Per-call sampling options
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionOptions {
    pub temperature: f32,
    pub max_tokens: u32,
    /// Ask the service for a JSON object response
    pub json_mode: bool,
}

impl CompletionOptions {
    pub fn from_sampling(sampling: SamplingConfig) -> Self {
        Self {
            temperature: sampling.temperature,
            max_tokens: sampling.max_tokens,
            json_mode: false,
        }
    }

    pub fn json(mut self) -> Self {
        self.json_mode = true;
        self
    }
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 512,
            json_mode: false,
        }
    }
}

/// Request counters, updated on every call
#[derive(Debug, Default)]
struct APIMetrics {
    total_requests: AtomicU64,
    total_errors: AtomicU64,
    total_latency_ms: AtomicU64,
}

/// Snapshot of API metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub total_errors: u64,
    pub avg_latency_ms: f64,
}

/// vLLM/OpenAI-compatible client
pub struct VLLMClient {
    http_client: reqwest::Client,
    config: LLMServiceConfig,
    embedding_dimensions: usize,
    metrics: Arc<APIMetrics>,
}

impl VLLMClient {
    /// Create new client from configuration
    pub fn new(config: LLMServiceConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(QuoteBotError::Http)?;

        // Use configured dimensions or default to 384 (MiniLM-L6-v2)
        let embedding_dimensions = config.embedding_dimensions.unwrap_or(384);

        Ok(Self {
            http_client,
            config,
            embedding_dimensions,
            metrics: Arc::new(APIMetrics::default()),
        })
    }

    /// Get current API metrics
    pub fn metrics(&self) -> MetricsSnapshot {
        let total = self.metrics.total_requests.load(Ordering::Relaxed);

        MetricsSnapshot {
            total_requests: total,
            total_errors: self.metrics.total_errors.load(Ordering::Relaxed),
            avg_latency_ms: if total > 0 {
                self.metrics.total_latency_ms.load(Ordering::Relaxed) as f64 / total as f64
            } else {
                0.0
            },
        }
    }

    fn record_error(&self) {
        self.metrics.total_errors.fetch_add(1, Ordering::Relaxed);
    }

    fn record_latency(&self, start: Instant) {
        let elapsed = start.elapsed().as_millis() as u64;
        self.metrics
            .total_latency_ms
            .fetch_add(elapsed, Ordering::Relaxed);
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.config.api_key {
            Some(ref api_key) => req.header("Authorization", format!("Bearer {}", api_key)),
            None => req,
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

fn build_chat_request<'a>(
    model: &'a str,
    messages: Vec<ChatMessage>,
    options: &CompletionOptions,
) -> ChatRequest<'a> {
    ChatRequest {
        model,
        messages,
        temperature: options.temperature,
        max_tokens: options.max_tokens,
        response_format: options.json_mode.then_some(ResponseFormat {
            kind: "json_object",
        }),
    }
}

#[async_trait]
impl LLMClient for VLLMClient {
    async fn chat_completion(
        &self,
        messages: Vec<ChatMessage>,
        options: &CompletionOptions,
    ) -> Result<String> {
        let start = Instant::now();
        self.metrics.total_requests.fetch_add(1, Ordering::Relaxed);

        let request = build_chat_request(&self.config.model, messages, options);
        let url = format!("{}/v1/chat/completions", self.config.url);

        tracing::debug!(
            model = %self.config.model,
            messages = request.messages.len(),
            json_mode = options.json_mode,
            "Sending chat completion"
        );

        let response = self
            .authorize(self.http_client.post(&url).json(&request))
            .send()
            .await
            .map_err(|e| {
                self.record_error();
                QuoteBotError::Http(e)
            })?;

        if !response.status().is_success() {
            self.record_error();
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(QuoteBotError::ExternalError(format!(
                "LLM service error (HTTP {}): {}",
                status, body
            )));
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            self.record_error();
            QuoteBotError::Http(e)
        })?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| {
                self.record_error();
                QuoteBotError::Llm("No response from LLM".to_string())
            })?
            .message
            .content;

        self.record_latency(start);
        Ok(content)
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let results = self.embed_batch(&[text.to_string()]).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| QuoteBotError::Llm("No embedding returned".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let start = Instant::now();
        self.metrics.total_requests.fetch_add(1, Ordering::Relaxed);

        #[derive(Serialize)]
        struct EmbedRequest<'a> {
            model: &'a str,
            input: &'a [String],
        }

        #[derive(Deserialize)]
        struct EmbedResponse {
            data: Vec<EmbedData>,
        }

        #[derive(Deserialize)]
        struct EmbedData {
            embedding: Vec<f32>,
        }

        let request = EmbedRequest {
            model: &self.config.embedding_model,
            input: texts,
        };

        let url = format!("{}/v1/embeddings", self.config.embeddings_url());

        let response = self
            .authorize(self.http_client.post(&url).json(&request))
            .send()
            .await
            .map_err(|e| {
                self.record_error();
                QuoteBotError::Http(e)
            })?;

        if !response.status().is_success() {
            self.record_error();
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(QuoteBotError::ExternalError(format!(
                "Embedding service error (HTTP {}): {}",
                status, body
            )));
        }

        let embed_response: EmbedResponse = response.json().await.map_err(|e| {
            self.record_error();
            QuoteBotError::Http(e)
        })?;

        if embed_response.data.len() != texts.len() {
            self.record_error();
            return Err(QuoteBotError::Llm(format!(
                "Embedding count mismatch: sent {}, received {}",
                texts.len(),
                embed_response.data.len()
            )));
        }

        self.record_latency(start);
        Ok(embed_response
            .data
            .into_iter()
            .map(|d| d.embedding)
            .collect())
    }

    fn embedding_dimensions(&self) -> usize {
        self.embedding_dimensions
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_constructors() {
        assert_eq!(ChatMessage::system("s").role, "system");
        assert_eq!(ChatMessage::user("u").role, "user");
        assert_eq!(ChatMessage::assistant("a").role, "assistant");
    }

    #[test]
    fn test_json_mode_request_body() {
        let options = CompletionOptions::from_sampling(SamplingConfig {
            temperature: 0.0,
            max_tokens: 300,
        })
        .json();
        let request = build_chat_request("gpt-4.1-mini", vec![ChatMessage::user("hi")], &options);
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["model"], "gpt-4.1-mini");
        assert_eq!(body["max_tokens"], 300);
        assert_eq!(body["response_format"]["type"], "json_object");
    }

    #[test]
    fn test_plain_request_omits_response_format() {
        let request = build_chat_request(
            "m",
            vec![ChatMessage::user("hi")],
            &CompletionOptions::default(),
        );
        let body = serde_json::to_value(&request).unwrap();
        assert!(body.get("response_format").is_none());
    }

    #[test]
    fn test_new_client_has_empty_metrics() {
        let client = VLLMClient::new(LLMServiceConfig::default()).unwrap();
        let metrics = client.metrics();
        assert_eq!(metrics.total_requests, 0);
        assert_eq!(metrics.avg_latency_ms, 0.0);
    }

    #[tokio::test]
    async fn test_failed_request_is_counted() {
        let client = VLLMClient::new(LLMServiceConfig {
            url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 2,
            ..LLMServiceConfig::default()
        })
        .unwrap();

        let result = client
            .chat_completion(vec![ChatMessage::user("hi")], &CompletionOptions::default())
            .await;
        assert!(result.is_err());

        let metrics = client.metrics();
        assert_eq!(metrics.total_requests, 1);
        assert_eq!(metrics.total_errors, 1);
    }
}
