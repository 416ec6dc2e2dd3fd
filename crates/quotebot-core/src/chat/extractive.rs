//! Answer generator that summarises plan data without an LLM

use super::session::Turn;
use crate::amounts::format_amount;
use crate::error::Result;
use crate::llm::AnswerGenerator;
use crate::search::PlanRecord;
use async_trait::async_trait;
use std::fmt::Write as _;

pub const NO_PLAN_DATA_MESSAGE: &str =
    "No comparable plan data is available for this question.";

/// Metadata keys shown in the summary table, with their column headings
const ATTRIBUTE_COLUMNS: &[(&str, &str)] = &[
    ("sum_insured", "Sum insured"),
    ("deductible", "Deductible"),
    ("max_members", "Max members"),
    ("co_payment", "Co-payment"),
    ("room_rent", "Room rent"),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractiveAnswerGenerator;

impl ExtractiveAnswerGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, utterance: &str, records: &[PlanRecord]) -> String {
        if records.is_empty() {
            return NO_PLAN_DATA_MESSAGE.to_string();
        }

        let columns: Vec<&(&str, &str)> = ATTRIBUTE_COLUMNS
            .iter()
            .filter(|(key, _)| records.iter().any(|r| r.attribute(key).is_some()))
            .collect();

        let mut out = String::new();
        let _ = writeln!(out, "Question: {}\n", utterance);

        out.push_str("| Plan | Premium |");
        for (_, heading) in &columns {
            let _ = write!(out, " {} |", heading);
        }
        out.push_str("\n|---|---|");
        for _ in &columns {
            out.push_str("---|");
        }
        out.push('\n');

        for record in records {
            let _ = write!(out, "| {} | {} |", record.title, format_amount(record.premium));
            for (key, _) in &columns {
                let value = record.attribute(key).unwrap_or_else(|| "-".to_string());
                let _ = write!(out, " {} |", value);
            }
            out.push('\n');
        }

        if records.len() > 1 {
            let cheapest = records
                .iter()
                .min_by(|a, b| a.premium.total_cmp(&b.premium));
            let dearest = records
                .iter()
                .max_by(|a, b| a.premium.total_cmp(&b.premium));
            if let (Some(low), Some(high)) = (cheapest, dearest) {
                let _ = writeln!(
                    out,
                    "\nCheapest: {} at {} per year. Most expensive: {} at {} per year ({} more).",
                    low.title,
                    format_amount(low.premium),
                    high.title,
                    format_amount(high.premium),
                    format_amount(high.premium - low.premium)
                );
            }
        }

        out.push_str("\nDetails:\n");
        for record in records {
            let _ = writeln!(out, "\n{}\n{}", record.title, record.content.trim());
        }

        out
    }
}

#[async_trait]
impl AnswerGenerator for ExtractiveAnswerGenerator {
    async fn generate(
        &self,
        utterance: &str,
        records: &[PlanRecord],
        _history: &[Turn],
    ) -> Result<String> {
        Ok(self.render(utterance, records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::PlanMetadata;
    use serde_json::json;

    fn plan(title: &str, premium: f64, deductible: Option<i64>) -> PlanRecord {
        let mut metadata = PlanMetadata::new();
        metadata.insert("premium".into(), json!(premium));
        if let Some(d) = deductible {
            metadata.insert("deductible".into(), json!(d));
        }
        PlanRecord {
            id: 1,
            premium,
            title: title.to_string(),
            content: format!("{} full description", title),
            metadata,
        }
    }

    #[test]
    fn test_empty_records() {
        let text = ExtractiveAnswerGenerator::new().render("compare", &[]);
        assert_eq!(text, NO_PLAN_DATA_MESSAGE);
    }

    #[test]
    fn test_table_and_extremes() {
        let text = ExtractiveAnswerGenerator::new().render(
            "which is cheaper?",
            &[plan("Gold", 28000.0, Some(0)), plan("Basic", 18000.0, Some(25000))],
        );

        assert!(text.contains("| Plan | Premium | Deductible |"));
        assert!(text.contains("| Gold | 28000 | 0 |"));
        assert!(text.contains("| Basic | 18000 | 25000 |"));
        assert!(text.contains("Cheapest: Basic at 18000"));
        assert!(text.contains("Most expensive: Gold at 28000"));
        assert!(text.contains("(10000 more)"));
        assert!(text.contains("Basic full description"));
    }

    #[test]
    fn test_missing_attribute_dash() {
        let text = ExtractiveAnswerGenerator::new().render(
            "q",
            &[plan("A", 18000.0, Some(5000)), plan("B", 22500.0, None)],
        );
        assert!(text.contains("| B | 22500 | - |"));
    }

    #[test]
    fn test_single_plan_has_no_extremes() {
        let text = ExtractiveAnswerGenerator::new().render("q", &[plan("A", 18000.0, None)]);
        assert!(!text.contains("Cheapest"));
        assert!(text.contains("| A | 18000 |"));
    }
}
