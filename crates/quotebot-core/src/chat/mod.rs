//! Multi-turn quote comparison dialogue
//!
//! Provides:
//! - Conversation state (turns and asked questions) per session
//! - The dialogue controller routing NEW / FOLLOW_UP / INVALID intents
//! - A session store serialising utterances per session
//! - Offline classifier and answer generator

mod controller;
mod extractive;
mod rule_classifier;
mod service;
mod session;
mod session_store;

pub use controller::{ChatOutcome, ChatReply, DialogueController, Rejection};
pub use extractive::{ExtractiveAnswerGenerator, NO_PLAN_DATA_MESSAGE};
pub use rule_classifier::RuleBasedClassifier;
pub use service::{ChatResponse, ChatService};
pub use session::{ConversationSession, DialogueState, Turn};
pub use session_store::{SessionGuard, SessionStore};
