//! Conversation state owned by one user session

use crate::search::PlanRecord;
use serde::Serialize;
use std::sync::Arc;

/// One committed exchange and the plans it was answered from
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    user_utterance: String,
    bot_response: String,
    referenced_records: Arc<[PlanRecord]>,
}

impl Turn {
    pub fn new(
        user_utterance: impl Into<String>,
        bot_response: impl Into<String>,
        referenced_records: Arc<[PlanRecord]>,
    ) -> Self {
        Self {
            user_utterance: user_utterance.into(),
            bot_response: bot_response.into(),
            referenced_records,
        }
    }

    pub fn user_utterance(&self) -> &str {
        &self.user_utterance
    }

    pub fn bot_response(&self) -> &str {
        &self.bot_response
    }

    pub fn records(&self) -> &[PlanRecord] {
        &self.referenced_records
    }

    /// Shared handle to the records, for reuse by a follow-up turn
    pub fn shared_records(&self) -> &Arc<[PlanRecord]> {
        &self.referenced_records
    }
}

/// Where a session stands in the dialogue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DialogueState {
    AwaitingFirstComparison,
    HasContext,
}

/// Turn log plus the comparison-relevant questions asked so far.
///
/// Both logs only grow through [`ConversationSession::commit`], so they always
/// have the same length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationSession {
    turns: Vec<Turn>,
    questions: Vec<String>,
}

impl ConversationSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last_turn(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn last_records(&self) -> Option<&Arc<[PlanRecord]>> {
        self.turns.last().map(Turn::shared_records)
    }

    pub fn state(&self) -> DialogueState {
        if self.turns.is_empty() {
            DialogueState::AwaitingFirstComparison
        } else {
            DialogueState::HasContext
        }
    }

    /// Append a turn and its question together
    pub fn commit(&mut self, turn: Turn) {
        self.questions.push(turn.user_utterance.clone());
        self.turns.push(turn);
    }

    pub fn reset(&mut self) {
        self.turns.clear();
        self.questions.clear();
    }
}
