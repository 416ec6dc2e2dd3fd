//! Session-aware chat entry point used by the CLI and the HTTP boundary

use super::controller::{ChatReply, DialogueController};
use super::session::ConversationSession;
use super::session_store::SessionStore;
use crate::config::ChatConfig;
use crate::error::{QuoteBotError, Result};
use serde::Serialize;

/// Reply to one message, tagged with the session it was processed in
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatResponse {
    pub session_id: String,
    #[serde(flatten)]
    pub reply: ChatReply,
}

pub struct ChatService {
    controller: DialogueController,
    sessions: SessionStore,
    max_message_length: usize,
}

impl ChatService {
    pub fn new(controller: DialogueController, config: &ChatConfig) -> Self {
        Self {
            controller,
            sessions: SessionStore::from_config(config),
            max_message_length: config.max_message_length,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Trimmed message, or `InvalidInput` when empty or too long
    pub fn validate_message<'a>(&self, message: &'a str) -> Result<&'a str> {
        let trimmed = message.trim();
        if trimmed.is_empty() {
            return Err(QuoteBotError::InvalidInput(
                "Message cannot be empty".to_string(),
            ));
        }
        if trimmed.chars().count() > self.max_message_length {
            return Err(QuoteBotError::InvalidInput(format!(
                "Message too long (max {} characters)",
                self.max_message_length
            )));
        }
        Ok(trimmed)
    }

    /// Process a message in the given session, creating one when the id is
    /// missing, unknown or expired.
    ///
    /// The controller runs on a copy of the session, which replaces the
    /// stored one only when the whole exchange succeeded.
    pub async fn send(&self, session_id: Option<&str>, message: &str) -> Result<ChatResponse> {
        let message = self.validate_message(message)?;

        self.sessions.expire_idle()?;
        let session_id = self.sessions.resolve(session_id)?;
        let mut guard = self.sessions.checkout(&session_id).await?;

        let mut working = guard.clone();
        let reply = self.controller.handle(&mut working, message).await?;
        *guard = working;

        tracing::info!(
            session = %session_id,
            turns = guard.len(),
            answered = reply.is_answered(),
            "Processed message"
        );

        Ok(ChatResponse { session_id, reply })
    }

    /// Clear a session. Unknown ids are a no-op.
    pub async fn reset(&self, session_id: &str) -> Result<()> {
        self.sessions.reset(session_id).await?;
        Ok(())
    }

    pub async fn history(&self, session_id: &str) -> Result<ConversationSession> {
        self.sessions.snapshot(session_id).await
    }
}
