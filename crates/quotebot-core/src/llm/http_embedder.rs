//! Plan and query embeddings from the configured embedding endpoint

use super::{Embedder, LLMClient};
use crate::config::LLMServiceConfig;
use crate::error::{QuoteBotError, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Embedder backed by an OpenAI-compatible `/v1/embeddings` endpoint
pub struct HttpEmbedder {
    client: Arc<dyn LLMClient>,
    model: String,
}

impl HttpEmbedder {
    /// `model` is recorded next to stored vectors; it must be the model the
    /// client's embedding endpoint serves.
    pub fn new(client: Arc<dyn LLMClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    /// Create from configuration
    pub fn from_config(config: LLMServiceConfig) -> Result<Self> {
        let model = config.embedding_model.clone();
        let client = super::VLLMClient::new(config)?;
        Ok(Self::new(Arc::new(client), model))
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.client.embed(text).await
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let vectors = self.client.embed_batch(texts).await?;
        // Callers zip vectors with their inputs
        if vectors.len() != texts.len() {
            return Err(QuoteBotError::Llm(format!(
                "Embedding service returned {} vectors for {} inputs",
                vectors.len(),
                texts.len()
            )));
        }
        Ok(vectors)
    }

    fn dimensions(&self) -> usize {
        self.client.embedding_dimensions()
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
