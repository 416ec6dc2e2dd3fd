//! HTTP-based intent classifier using external LLM service

use super::{
    parse_classification, ChatMessage, CompletionOptions, Intent, IntentClassifier, LLMClient,
};
use crate::config::SamplingConfig;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

const CLASSIFIER_SYSTEM_PROMPT: &str = r#"You are a query classifier for an insurance comparison chatbot.

Your job: Analyze user questions and extract premium amounts.

Classification rules:
1. NEW: User provides 2-3 premium amounts to compare
   - Must have at least 2 numbers
   - Can be any format: "18000, 22500" or "compare 18k and 22.5k" or "18000 vs 22500"

2. FOLLOW_UP: User asks about previously shown results
   - Questions like "which is cheaper?", "which has no deductible?", "best for family of 4?"
   - NO new premium amounts mentioned

3. INVALID:
   - Only 1 premium amount (need at least 2)
   - No premium amounts at all
   - Not insurance related (like "what is weather?")
   - More than 3 premiums

Output format (JSON only):
{
  "question_type": "NEW" | "FOLLOW_UP" | "INVALID",
  "premium_amounts": [list of numbers] or null,
  "reason": "brief explanation"
}

Examples:
Input: "compare 18000, 22500, 28000"
Output: {"question_type": "NEW", "premium_amounts": [18000, 22500, 28000], "reason": "3 premiums to compare"}

Input: "which one is cheaper?"
Output: {"question_type": "FOLLOW_UP", "premium_amounts": null, "reason": "Asking about previous results"}

Input: "show me 18000 plan"
Output: {"question_type": "INVALID", "premium_amounts": [18000], "reason": "Only 1 premium, need at least 2"}

Input: "what is the weather?"
Output: {"question_type": "INVALID", "premium_amounts": null, "reason": "Not insurance related"}"#;

/// Intent classifier backed by a chat completion endpoint in JSON mode
pub struct HttpIntentClassifier {
    client: Arc<dyn LLMClient>,
    sampling: SamplingConfig,
}

impl HttpIntentClassifier {
    /// Create from LLM client
    pub fn new(client: Arc<dyn LLMClient>, sampling: SamplingConfig) -> Self {
        Self { client, sampling }
    }
}

fn build_classification_prompt(utterance: &str, prior_questions: &[String]) -> String {
    let prior = if prior_questions.is_empty() {
        "None".to_string()
    } else {
        prior_questions
            .iter()
            .map(|q| format!("- {}\n", q))
            .collect::<String>()
    };

    format!(
        "Previous questions asked by user:\n{}\nCurrent question: \"{}\"\n\
         Classify this question and extract premium amounts. Output only JSON.",
        prior, utterance
    )
}

#[async_trait]
impl IntentClassifier for HttpIntentClassifier {
    async fn classify(&self, utterance: &str, prior_questions: &[String]) -> Result<Intent> {
        let messages = vec![
            ChatMessage::system(CLASSIFIER_SYSTEM_PROMPT),
            ChatMessage::user(build_classification_prompt(utterance, prior_questions)),
        ];
        let options = CompletionOptions::from_sampling(self.sampling).json();

        let response = self.client.chat_completion(messages, &options).await?;
        let intent = parse_classification(&response);

        tracing::debug!(intent = intent.label(), "Classified utterance");
        Ok(intent)
    }
}
