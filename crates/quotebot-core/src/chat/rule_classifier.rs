//! Deterministic intent classifier for offline use
//!
//! Amount counting decides NEW/INVALID; with no amounts, insurance or
//! comparison wording (or a referring question once a comparison exists)
//! makes it a follow-up.

use crate::amounts::extract_amounts;
use crate::error::Result;
use crate::llm::{Intent, IntentClassifier};
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

lazy_static! {
    static ref WORD_RE: Regex = Regex::new(r"[a-z]+(?:-[a-z]+)?").expect("valid word regex");
    static ref INSURANCE_TERMS: HashSet<&'static str> = [
        "premium", "premiums", "deductible", "deductibles", "cover", "covers", "coverage",
        "covered", "plan", "plans", "policy", "policies", "insured", "insurance", "claim",
        "claims", "co-payment", "copayment", "copay", "co-pay", "room", "rent", "waiting",
        "family", "members", "cheap", "cheaper", "cheapest", "expensive", "cost", "costs",
        "price", "benefit", "benefits", "hospital", "hospitalisation", "hospitalization",
        "maternity", "icu", "quote", "quotes",
    ]
    .into_iter()
    .collect();
    static ref REFERRING_TERMS: HashSet<&'static str> = [
        "which", "it", "them", "they", "those", "these", "both", "either", "one", "better",
        "best", "worth", "difference", "recommend", "compare",
    ]
    .into_iter()
    .collect();
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedClassifier;

impl RuleBasedClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Synchronous classification; never fails.
    pub fn classify_text(&self, utterance: &str, prior_questions: &[String]) -> Intent {
        let amounts = extract_amounts(utterance);
        if !amounts.is_empty() {
            return Intent::comparison(amounts);
        }

        let lowered = utterance.to_lowercase();
        let words: Vec<&str> = WORD_RE.find_iter(&lowered).map(|m| m.as_str()).collect();

        let on_topic = words.iter().any(|w| INSURANCE_TERMS.contains(w));
        let refers_back =
            !prior_questions.is_empty() && words.iter().any(|w| REFERRING_TERMS.contains(w));

        if on_topic || refers_back {
            Intent::FollowUp
        } else {
            Intent::invalid("Not insurance related")
        }
    }
}

#[async_trait]
impl IntentClassifier for RuleBasedClassifier {
    async fn classify(&self, utterance: &str, prior_questions: &[String]) -> Result<Intent> {
        Ok(self.classify_text(utterance, prior_questions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(utterance: &str, prior: &[&str]) -> Intent {
        let prior: Vec<String> = prior.iter().map(|s| s.to_string()).collect();
        RuleBasedClassifier::new().classify_text(utterance, &prior)
    }

    #[test]
    fn test_valid_comparison_formats() {
        for utterance in [
            "compare 18000, 22500, 28000",
            "18000 vs 22500 vs 28000",
            "show me 18k, 22.5k, 28k",
        ] {
            assert_eq!(
                classify(utterance, &[]),
                Intent::New {
                    premiums: vec![18000.0, 22500.0, 28000.0]
                },
                "{}",
                utterance
            );
        }
        assert_eq!(
            classify("compare plans 18000 and 22500 for family of 4", &[]),
            Intent::New {
                premiums: vec![18000.0, 22500.0]
            }
        );
    }

    #[test]
    fn test_single_premium_invalid() {
        assert_eq!(
            classify("show me 18000 plan", &[]),
            Intent::invalid("Only 1 premium, need at least 2")
        );
    }

    #[test]
    fn test_too_many_premiums_invalid() {
        assert!(matches!(
            classify("compare 10000, 20000, 30000, 40000", &[]),
            Intent::Invalid { .. }
        ));
    }

    #[test]
    fn test_off_topic_invalid() {
        assert_eq!(
            classify("what is the weather?", &[]),
            Intent::invalid("Not insurance related")
        );
        assert_eq!(
            classify("what is the weather?", &["compare 18000, 22500"]),
            Intent::invalid("Not insurance related")
        );
    }

    #[test]
    fn test_follow_up_questions() {
        let prior = ["compare 18000, 22500"];
        assert_eq!(classify("which is cheaper?", &prior), Intent::FollowUp);
        assert_eq!(classify("which has no deductible?", &prior), Intent::FollowUp);
        assert_eq!(classify("which is better for young couple?", &prior), Intent::FollowUp);
        assert_eq!(classify("is the extra worth it?", &prior), Intent::FollowUp);
    }

    #[test]
    fn test_follow_up_wording_without_history() {
        // The controller answers these with the empty-history message
        assert_eq!(classify("which is cheaper?", &[]), Intent::FollowUp);
        assert_eq!(
            classify("which is better for young couple?", &[]),
            Intent::invalid("Not insurance related")
        );
    }
}
