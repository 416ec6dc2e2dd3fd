//! Plan lookup
//!
//! A [`PlanStore`] answers filtered similarity queries; the
//! [`PlanRetriever`] turns a list of premium amounts into plan records with
//! one store lookup per premium.

mod retriever;
mod sqlite_store;

pub use retriever::PlanRetriever;
pub use sqlite_store::SqlitePlanStore;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Free-form plan attributes (premium, sum insured, deductible, ...)
pub type PlanMetadata = BTreeMap<String, serde_json::Value>;

/// An insurance plan as stored in the plan database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRecord {
    pub id: i64,
    pub premium: f64,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub metadata: PlanMetadata,
}

impl PlanRecord {
    /// Metadata value rendered as display text
    pub fn attribute(&self, key: &str) -> Option<String> {
        match self.metadata.get(key)? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(match n.as_f64() {
                Some(f) => crate::amounts::format_amount(f),
                None => n.to_string(),
            }),
            other => Some(other.to_string()),
        }
    }
}

/// Exact-match constraints applied before ranking
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanFilter {
    pub premium: f64,
}

impl PlanFilter {
    pub fn premium(premium: f64) -> Self {
        Self { premium }
    }
}

/// A plan and its similarity to the query, higher is closer
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPlan {
    pub record: PlanRecord,
    pub score: f32,
}

/// Content store queried by the retriever
#[async_trait]
pub trait PlanStore: Send + Sync {
    /// Up to `k` plans satisfying `filter`, best first
    async fn similarity_search(
        &self,
        query: &str,
        k: usize,
        filter: &PlanFilter,
    ) -> Result<Vec<ScoredPlan>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_attribute_rendering() {
        let mut metadata = PlanMetadata::new();
        metadata.insert("sum_insured".into(), json!(500000));
        metadata.insert("room_rent".into(), json!("Single AC"));
        metadata.insert("co_payment".into(), json!(null));
        let record = PlanRecord {
            id: 1,
            premium: 18000.0,
            title: "A".into(),
            content: "A".into(),
            metadata,
        };

        assert_eq!(record.attribute("sum_insured").as_deref(), Some("500000"));
        assert_eq!(record.attribute("room_rent").as_deref(), Some("Single AC"));
        assert_eq!(record.attribute("co_payment"), None);
        assert_eq!(record.attribute("missing"), None);
    }
}
