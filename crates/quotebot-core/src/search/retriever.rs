//! Premium-keyed plan retrieval

use super::{PlanFilter, PlanRecord, PlanStore};
use crate::amounts::format_amount;
use crate::error::Result;
use std::sync::Arc;

/// Fetches one plan per premium amount
#[derive(Clone)]
pub struct PlanRetriever {
    store: Arc<dyn PlanStore>,
}

impl PlanRetriever {
    pub fn new(store: Arc<dyn PlanStore>) -> Self {
        Self { store }
    }

    /// Best plan for each premium, in the order the premiums were given.
    ///
    /// Premiums without a stored plan are skipped, so the result can be
    /// shorter than `premiums`. Every call reads through to the store.
    pub async fn fetch(&self, premiums: &[f64]) -> Result<Vec<PlanRecord>> {
        let mut records = Vec::with_capacity(premiums.len());

        for &premium in premiums {
            let query = format!("insurance plan {}", format_amount(premium));
            let hits = self
                .store
                .similarity_search(&query, 1, &PlanFilter::premium(premium))
                .await?;

            match hits.into_iter().next() {
                Some(hit) => records.push(hit.record),
                None => tracing::debug!(premium, "No plan stored for premium"),
            }
        }

        Ok(records)
    }
}
