//! LLM trait definitions

use super::Intent;
use crate::chat::Turn;
use crate::error::Result;
use crate::search::PlanRecord;
use async_trait::async_trait;

/// Embedding generation trait
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate embedding for single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for batch of texts
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Get model name
    fn model_name(&self) -> &str;
}

/// Turns a user utterance into a routing intent.
///
/// Implementations never fail on malformed model output; they return
/// `Intent::Invalid` instead. An `Err` means the round trip itself failed.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(&self, utterance: &str, prior_questions: &[String]) -> Result<Intent>;
}

/// Writes the comparison answer for a set of plans.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    /// `history` is replayed oldest first.
    async fn generate(
        &self,
        utterance: &str,
        records: &[PlanRecord],
        history: &[Turn],
    ) -> Result<String>;
}
