//! Quotebot Core Library
//!
//! Core functionality for the quotebot insurance quote comparison assistant.
//!
//! # Features
//! - LLM-based intent classification (NEW / FOLLOW_UP / INVALID) with a
//!   safe fallback for unparseable output
//! - Premium-keyed plan retrieval from SQLite with optional vector ranking
//! - Multi-turn dialogue controller that reuses the previous turn's plans
//!   for follow-up questions
//! - Per-session conversation store with idle expiry

pub mod amounts;
pub mod chat;
pub mod config;
pub mod db;
pub mod error;
pub mod ingest;
pub mod llm;
pub mod search;

pub use chat::{
    ChatOutcome, ChatReply, ChatResponse, ChatService, ConversationSession, DialogueController,
    DialogueState, ExtractiveAnswerGenerator, Rejection, RuleBasedClassifier, SessionStore, Turn,
};
pub use config::{ChatConfig, Config, LLMServiceConfig, ServerConfig, StoreConfig};
pub use db::{Database, NewPlan};
pub use error::{Error, QuoteBotError, Result};
pub use ingest::{ingest_plans, load_plan_file, IngestMode, IngestReport};
pub use llm::{
    AnswerGenerator, ChatMessage, Embedder, HttpAnswerGenerator, HttpEmbedder,
    HttpIntentClassifier, Intent, IntentClassifier, LLMClient, MetricsSnapshot, VLLMClient,
};
pub use search::{PlanFilter, PlanRecord, PlanRetriever, PlanStore, ScoredPlan, SqlitePlanStore};

/// Default cache directory name
pub const CACHE_DIR_NAME: &str = "quotebot";

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "quotebot";
