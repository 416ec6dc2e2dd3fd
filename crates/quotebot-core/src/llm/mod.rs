//! LLM integration
//!
//! Provides traits and implementations for:
//! - Chat completions and embeddings via external services (vLLM, OpenAI, etc.)
//! - Intent classification of user utterances
//! - Plan comparison answers

mod client;
mod http_answer_generator;
mod http_embedder;
mod http_intent_classifier;
mod intent;
mod traits;

pub use client::{ChatMessage, CompletionOptions, LLMClient, MetricsSnapshot, VLLMClient};
pub use http_answer_generator::{HistoryBudget, HttpAnswerGenerator, NO_PLANS_TEXT};
pub use http_embedder::HttpEmbedder;
pub use http_intent_classifier::HttpIntentClassifier;
pub use intent::{
    parse_classification, Intent, MAX_COMPARISON_PREMIUMS, MIN_COMPARISON_PREMIUMS,
    PARSE_ERROR_REASON,
};
pub use traits::*;
