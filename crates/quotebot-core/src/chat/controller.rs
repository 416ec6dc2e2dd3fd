//! Dialogue controller
//!
//! Routes each utterance by its classified intent:
//!
//! - `INVALID`: instructional message, session untouched
//! - `NEW`: fetch plans for the premiums; answer and commit, or report no match
//! - `FOLLOW_UP`: answer from the previous turn's plans, or ask for a comparison first
//!
//! Only answered utterances are committed. Collaborator errors propagate
//! before any commit, so a failed call leaves the session as it was.

use super::session::{ConversationSession, Turn};
use crate::amounts::format_amount_list;
use crate::error::Result;
use crate::llm::{AnswerGenerator, Intent, IntentClassifier};
use crate::search::{PlanRecord, PlanRetriever};
use serde::Serialize;
use std::sync::Arc;

/// Why an utterance was not answered
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rejection {
    Invalid { reason: String },
    NoMatch { premiums: Vec<f64> },
    EmptyHistory,
}

impl Rejection {
    /// User-facing instructional text
    pub fn message(&self) -> String {
        match self {
            Rejection::Invalid { reason } => format!(
                "Please provide 2-3 premium amounts to compare.\n\
                 Example: 'compare 18000, 22500, 28000'\n\n\
                 Reason: {}",
                reason
            ),
            Rejection::NoMatch { premiums } => {
                format!("No plans found for premiums: {}", format_amount_list(premiums))
            }
            Rejection::EmptyHistory => {
                "Please ask a comparison question first with 2-3 premiums.".to_string()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChatOutcome {
    /// A turn was committed
    Answered { follow_up: bool, plans: usize },
    Rejected(Rejection),
}

/// What the user sees, plus how it came about
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatReply {
    pub message: String,
    pub outcome: ChatOutcome,
}

impl ChatReply {
    fn rejected(rejection: Rejection) -> Self {
        Self {
            message: rejection.message(),
            outcome: ChatOutcome::Rejected(rejection),
        }
    }

    pub fn is_answered(&self) -> bool {
        matches!(self.outcome, ChatOutcome::Answered { .. })
    }
}

pub struct DialogueController {
    classifier: Arc<dyn IntentClassifier>,
    retriever: PlanRetriever,
    generator: Arc<dyn AnswerGenerator>,
}

impl DialogueController {
    pub fn new(
        classifier: Arc<dyn IntentClassifier>,
        retriever: PlanRetriever,
        generator: Arc<dyn AnswerGenerator>,
    ) -> Self {
        Self {
            classifier,
            retriever,
            generator,
        }
    }

    /// Process one trimmed, non-empty utterance against `session`.
    pub async fn handle(
        &self,
        session: &mut ConversationSession,
        utterance: &str,
    ) -> Result<ChatReply> {
        let intent = self
            .classifier
            .classify(utterance, session.questions())
            .await?;
        tracing::debug!(intent = intent.label(), state = ?session.state(), "Routing utterance");

        match intent {
            Intent::Invalid { reason } => Ok(ChatReply::rejected(Rejection::Invalid { reason })),
            Intent::New { premiums } => {
                let records = self.retriever.fetch(&premiums).await?;
                if records.is_empty() {
                    return Ok(ChatReply::rejected(Rejection::NoMatch { premiums }));
                }
                let records: Arc<[PlanRecord]> = Arc::from(records);
                self.answer(session, utterance, records, false).await
            }
            Intent::FollowUp => {
                let previous = session.last_records().cloned();
                match previous {
                    Some(records) => self.answer(session, utterance, records, true).await,
                    None => Ok(ChatReply::rejected(Rejection::EmptyHistory)),
                }
            }
        }
    }

    async fn answer(
        &self,
        session: &mut ConversationSession,
        utterance: &str,
        records: Arc<[PlanRecord]>,
        follow_up: bool,
    ) -> Result<ChatReply> {
        let response = self
            .generator
            .generate(utterance, &records, session.turns())
            .await?;

        let plans = records.len();
        session.commit(Turn::new(utterance, response.clone(), records));

        Ok(ChatReply {
            message: response,
            outcome: ChatOutcome::Answered { follow_up, plans },
        })
    }
}
