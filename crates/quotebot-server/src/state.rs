//! Application state shared across route handlers

use quotebot_core::{ChatService, VLLMClient};
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<ChatService>,
    /// LLM client whose request counters `/health` reports; absent offline
    pub llm: Option<Arc<VLLMClient>>,
    /// Server start time for uptime reporting
    pub start_time: Instant,
}

impl AppState {
    pub fn new(chat: ChatService) -> Self {
        Self {
            chat: Arc::new(chat),
            llm: None,
            start_time: Instant::now(),
        }
    }

    pub fn with_llm(mut self, llm: Arc<VLLMClient>) -> Self {
        self.llm = Some(llm);
        self
    }
}
