//! Premium amount extraction and normalisation
//!
//! Users write premiums in many shapes: `18000`, `18,000`, `1,50,000`,
//! `18k`, `22.5K`, `₹28000`, `Rs 1.2 lakh`. Everything here reduces them to
//! plain `f64` rupee values.

use lazy_static::lazy_static;
use regex::Regex;

/// Amounts below this are counts ("family of 4"), not yearly premiums
pub const MIN_PREMIUM: f64 = 1_000.0;

lazy_static! {
    static ref AMOUNT_RE: Regex = Regex::new(
        r"(?i)(\d{1,3}(?:,\d{2,3})+|\d+(?:\.\d+)?)\s*(thousand|k|lakhs?|lacs?|l|million|mn|m)?\b"
    )
    .expect("valid amount regex");
    static ref TOKEN_RE: Regex = Regex::new(
        r"(?i)^(\d+(?:\.\d+)?)\s*(thousand|k|lakhs?|lacs?|l|million|mn|m)?$"
    )
    .expect("valid token regex");
    static ref CURRENCY_RE: Regex =
        Regex::new(r"(?i)^(?:₹|inr|rs\.?|\$)\s*").expect("valid currency regex");
}

fn multiplier(suffix: Option<&str>) -> f64 {
    match suffix.map(|s| s.to_ascii_lowercase()).as_deref() {
        Some("k") | Some("thousand") => 1_000.0,
        Some("l") | Some("lakh") | Some("lakhs") | Some("lac") | Some("lacs") => 100_000.0,
        Some("m") | Some("mn") | Some("million") => 1_000_000.0,
        _ => 1.0,
    }
}

/// Extract premium amounts from free text in first-seen order, de-duplicated.
pub fn extract_amounts(text: &str) -> Vec<f64> {
    let mut amounts: Vec<f64> = Vec::new();

    for caps in AMOUNT_RE.captures_iter(text) {
        let digits = caps[1].replace(',', "");
        let Ok(base) = digits.parse::<f64>() else {
            continue;
        };
        let value = base * multiplier(caps.get(2).map(|m| m.as_str()));

        if value < MIN_PREMIUM {
            continue;
        }
        if !amounts.contains(&value) {
            amounts.push(value);
        }
    }

    amounts
}

/// Parse a single amount token such as `"18k"`, `"₹22,500"` or `"1.5 lakh"`.
pub fn parse_amount(token: &str) -> Option<f64> {
    let trimmed = token.trim();
    let without_currency = CURRENCY_RE.replace(trimmed, "");
    let cleaned = without_currency.replace(',', "");
    let caps = TOKEN_RE.captures(cleaned.trim())?;
    let base: f64 = caps[1].parse().ok()?;
    let value = base * multiplier(caps.get(2).map(|m| m.as_str()));
    value.is_finite().then_some(value)
}

/// Render an amount the way users type it: no decimals for whole numbers.
pub fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.0}", value)
    } else {
        format!("{}", value)
    }
}

/// Render a list of amounts as `[18000, 22500]`
pub fn format_amount_list(values: &[f64]) -> String {
    let parts: Vec<String> = values.iter().map(|v| format_amount(*v)).collect();
    format!("[{}]", parts.join(", "))
}
