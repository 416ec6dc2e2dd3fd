//! Classified intent of a user utterance and parsing of classifier output

use crate::amounts::parse_amount;
use serde::Serialize;
use serde_json::Value;

/// Reason attached to the fallback intent when classifier output is unusable
pub const PARSE_ERROR_REASON: &str = "parse error";

/// Fewest premiums a comparison can name
pub const MIN_COMPARISON_PREMIUMS: usize = 2;

/// Most premiums a comparison can name
pub const MAX_COMPARISON_PREMIUMS: usize = 3;

/// Routing decision for one utterance
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "question_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    /// Fresh comparison over 2-3 distinct premiums, in first-mentioned order
    New { premiums: Vec<f64> },
    /// Question about the plans of the previous turn
    FollowUp,
    Invalid { reason: String },
}

impl Intent {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Intent::Invalid {
            reason: reason.into(),
        }
    }

    pub fn parse_error() -> Self {
        Self::invalid(PARSE_ERROR_REASON)
    }

    /// Build a NEW intent, enforcing the 2-3 distinct premium rule.
    pub fn comparison(amounts: Vec<f64>) -> Self {
        let premiums = dedup_preserving_order(amounts);
        match premiums.len() {
            0 => Self::invalid("No premium amounts found"),
            n if n < MIN_COMPARISON_PREMIUMS => Self::invalid(format!(
                "Only {} premium, need at least {}",
                n, MIN_COMPARISON_PREMIUMS
            )),
            n if n > MAX_COMPARISON_PREMIUMS => Self::invalid(format!(
                "{} premiums given, maximum is {}",
                n, MAX_COMPARISON_PREMIUMS
            )),
            _ => Intent::New { premiums },
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Intent::New { .. } => "NEW",
            Intent::FollowUp => "FOLLOW_UP",
            Intent::Invalid { .. } => "INVALID",
        }
    }
}

fn dedup_preserving_order(amounts: Vec<f64>) -> Vec<f64> {
    let mut out: Vec<f64> = Vec::with_capacity(amounts.len());
    for amount in amounts {
        if !out.contains(&amount) {
            out.push(amount);
        }
    }
    out
}

/// Parse raw classifier output into an [`Intent`].
///
/// Never fails: anything that does not decode into the expected
/// `{question_type, premium_amounts, reason}` object becomes
/// `Intent::Invalid { reason: "parse error" }`.
pub fn parse_classification(raw: &str) -> Intent {
    match decode(raw) {
        Some(intent) => intent,
        None => {
            tracing::warn!(
                response = %truncate(raw, 200),
                "Unparseable classifier response, treating as INVALID"
            );
            Intent::parse_error()
        }
    }
}

fn decode(raw: &str) -> Option<Intent> {
    // Tolerate markdown fences and chatter around the object
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }

    let parsed: Value = serde_json::from_str(&raw[start..=end]).ok()?;
    let object = parsed.as_object()?;

    let question_type = object.get("question_type")?.as_str()?;
    let amounts = decode_amounts(object.get("premium_amounts"))?;
    let reason = object
        .get("reason")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|r| !r.is_empty());

    let intent = match question_type.trim().to_ascii_uppercase().as_str() {
        "NEW" => Intent::comparison(amounts),
        "FOLLOW_UP" | "FOLLOWUP" => {
            if amounts.is_empty() {
                Intent::FollowUp
            } else {
                Intent::invalid("Follow-up questions cannot mention new premium amounts")
            }
        }
        "INVALID" => Intent::invalid(reason.unwrap_or("Question could not be understood")),
        _ => return None,
    };

    Some(intent)
}

/// `null` or missing means no amounts; a non-array or any unreadable entry
/// makes the whole response unusable.
fn decode_amounts(value: Option<&Value>) -> Option<Vec<f64>> {
    let items = match value {
        None | Some(Value::Null) => return Some(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => return None,
    };

    items
        .iter()
        .map(|item| {
            let amount = match item {
                Value::Number(n) => n.as_f64()?,
                Value::String(s) => parse_amount(s)?,
                _ => return None,
            };
            (amount.is_finite() && amount > 0.0).then_some(amount)
        })
        .collect()
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
