//! HTTP-based answer generator using external LLM service

use super::{AnswerGenerator, ChatMessage, CompletionOptions, LLMClient};
use crate::chat::Turn;
use crate::config::{ChatConfig, SamplingConfig};
use crate::error::Result;
use crate::search::PlanRecord;
use async_trait::async_trait;
use std::sync::Arc;

/// Placeholder sent instead of plan contents when nothing matched
pub const NO_PLANS_TEXT: &str = "No plans available";

const ADVISOR_SYSTEM_PROMPT: &str = r#"You are an expert insurance advisor who explains insurance plans in simple, easy-to-understand language.

Your job: Compare insurance plans and help users make informed decisions.

What to focus on:
1. Premium (yearly cost) - Which is cheapest? Most expensive? Price differences?
2. Sum Insured (coverage amount) - How much coverage do you get?
3. Deductible (what you pay first) - Zero deductible is better. High deductible = you pay more when claiming
4. Family Size (max members covered) - Important for families
5. Waiting Periods - When coverage starts for certain conditions
6. Room Rent Limits - Single AC, shared, ICU coverage
7. Co-payment - Do you have to pay a % when claiming?

How to explain:
- Use simple language (avoid jargon)
- Use bullet points and tables for clarity
- Explain trade-offs clearly
  Example: "Plan A is ₹4,500 cheaper per year BUT has a ₹25,000 deductible (you pay first ₹25k of any claim)"
- Make specific recommendations based on user needs
  Example: "For a couple with no kids, Plan B is better because..."
- Use comparisons: "Plan A vs Plan B: Both cover family of 4, but Plan B has zero deductible"

What NOT to do:
- Don't make up information
- Don't mention plans that aren't provided
- Don't use complex insurance terms without explaining them
- Don't be vague - give specific numbers and reasons
- If no plans are provided, say plainly that no comparable plan data is available

Format:
- Start with a quick summary table
- Then detailed comparison
- End with recommendation based on their question"#;

/// Limits on how much prior conversation is replayed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryBudget {
    pub max_turns: usize,
    pub max_chars: usize,
}

impl HistoryBudget {
    pub fn from_chat_config(config: &ChatConfig) -> Self {
        Self {
            max_turns: config.max_history_turns,
            max_chars: config.max_history_chars,
        }
    }

    /// Newest suffix of `history` that fits the budget.
    ///
    /// Turns are dropped whole from the oldest end; a single turn larger
    /// than `max_chars` is dropped too.
    pub fn select<'a>(&self, history: &'a [Turn]) -> &'a [Turn] {
        let mut chars = 0usize;
        let mut kept = 0usize;

        for turn in history.iter().rev() {
            if kept == self.max_turns {
                break;
            }
            let size = turn.user_utterance().chars().count() + turn.bot_response().chars().count();
            if chars + size > self.max_chars {
                break;
            }
            chars += size;
            kept += 1;
        }

        &history[history.len() - kept..]
    }
}

/// Answer generator backed by a chat completion endpoint
pub struct HttpAnswerGenerator {
    client: Arc<dyn LLMClient>,
    sampling: SamplingConfig,
    budget: HistoryBudget,
}

impl HttpAnswerGenerator {
    /// Create from LLM client
    pub fn new(client: Arc<dyn LLMClient>, sampling: SamplingConfig, budget: HistoryBudget) -> Self {
        Self {
            client,
            sampling,
            budget,
        }
    }

    fn build_messages(
        &self,
        utterance: &str,
        records: &[PlanRecord],
        history: &[Turn],
    ) -> Vec<ChatMessage> {
        let replayed = self.budget.select(history);
        if replayed.len() < history.len() {
            tracing::debug!(
                dropped = history.len() - replayed.len(),
                "Trimmed conversation history"
            );
        }

        let mut messages = Vec::with_capacity(2 + replayed.len() * 2);
        messages.push(ChatMessage::system(ADVISOR_SYSTEM_PROMPT));
        for turn in replayed {
            messages.push(ChatMessage::user(turn.user_utterance()));
            messages.push(ChatMessage::assistant(turn.bot_response()));
        }
        messages.push(ChatMessage::user(build_question_prompt(utterance, records)));
        messages
    }
}

fn plan_context(records: &[PlanRecord]) -> String {
    if records.is_empty() {
        return NO_PLANS_TEXT.to_string();
    }
    records
        .iter()
        .map(|r| format!("{}\n\n", r.content))
        .collect()
}

fn build_question_prompt(utterance: &str, records: &[PlanRecord]) -> String {
    format!(
        "Here are the insurance plans to compare:\n{}\nUser's question: {}\n\
         Please compare these plans and answer the user's question in simple, clear terms.",
        plan_context(records),
        utterance
    )
}

#[async_trait]
impl AnswerGenerator for HttpAnswerGenerator {
    async fn generate(
        &self,
        utterance: &str,
        records: &[PlanRecord],
        history: &[Turn],
    ) -> Result<String> {
        let messages = self.build_messages(utterance, records, history);
        let options = CompletionOptions::from_sampling(self.sampling);

        tracing::debug!(
            plans = records.len(),
            messages = messages.len(),
            "Generating comparison answer"
        );
        self.client.chat_completion(messages, &options).await
    }
}
