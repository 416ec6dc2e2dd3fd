//! SQLite-backed plan store
//!
//! Filters plans by exact premium, then ranks the survivors by cosine
//! similarity to the query when an embedder is configured.

use super::{PlanFilter, PlanStore, ScoredPlan};
use crate::db::vectors::cosine_similarity;
use crate::db::Database;
use crate::error::{QuoteBotError, Result};
use crate::llm::Embedder;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Score given to exact matches when no embedder ranks them
const UNRANKED_SCORE: f32 = 1.0;

pub struct SqlitePlanStore {
    db: Arc<Mutex<Database>>,
    collection: String,
    embedder: Option<Arc<dyn Embedder>>,
}

impl SqlitePlanStore {
    pub fn new(db: Database, collection: impl Into<String>) -> Self {
        Self::shared(Arc::new(Mutex::new(db)), collection)
    }

    /// Build over a database handle that is also used elsewhere
    pub fn shared(db: Arc<Mutex<Database>>, collection: impl Into<String>) -> Self {
        Self {
            db,
            collection: collection.into(),
            embedder: None,
        }
    }

    /// Rank candidates by similarity using stored plan vectors
    pub fn with_embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn lock(&self) -> Result<MutexGuard<'_, Database>> {
        self.db
            .lock()
            .map_err(|_| QuoteBotError::Other(anyhow::anyhow!("plan database lock poisoned")))
    }

    fn score_candidates(
        &self,
        filter: &PlanFilter,
        query_embedding: Option<(Vec<f32>, &str)>,
    ) -> Result<Vec<ScoredPlan>> {
        let db = self.lock()?;
        let candidates = db.plans_by_premium(&self.collection, filter.premium)?;

        let Some((query_vec, model)) = query_embedding else {
            return Ok(candidates
                .into_iter()
                .map(|record| ScoredPlan {
                    record,
                    score: UNRANKED_SCORE,
                })
                .collect());
        };

        let vectors: HashMap<i64, Vec<f32>> = db
            .plan_embeddings_for_premium(&self.collection, filter.premium, model)?
            .into_iter()
            .collect();
        Ok(candidates
            .into_iter()
            .map(|record| {
                let score = vectors
                    .get(&record.id)
                    .map(|v| cosine_similarity(&query_vec, v))
                    .unwrap_or(0.0);
                ScoredPlan { record, score }
            })
            .collect())
    }
}

#[async_trait]
impl PlanStore for SqlitePlanStore {
    async fn similarity_search(
        &self,
        query: &str,
        k: usize,
        filter: &PlanFilter,
    ) -> Result<Vec<ScoredPlan>> {
        if k == 0 {
            return Ok(Vec::new());
        }

        // Embed before taking the lock
        let query_embedding = match self.embedder {
            Some(ref embedder) => Some((embedder.embed(query).await?, embedder.model_name())),
            None => None,
        };

        let mut scored = self.score_candidates(filter, query_embedding)?;

        // Stable: ties keep insertion order
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(k);

        tracing::debug!(
            premium = filter.premium,
            matches = scored.len(),
            "Plan store lookup"
        );
        Ok(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::NewPlan;
    use crate::search::PlanMetadata;

    /// Two-dimensional embedding: ("gold" present, "silver" present)
    struct KeywordEmbedder;

    #[async_trait]
    impl Embedder for KeywordEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let text = text.to_lowercase();
            Ok(vec![
                if text.contains("gold") { 1.0 } else { 0.0 },
                if text.contains("silver") { 1.0 } else { 0.0 },
            ])
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            let mut out = Vec::new();
            for t in texts {
                out.push(self.embed(t).await?);
            }
            Ok(out)
        }

        fn dimensions(&self) -> usize {
            2
        }

        fn model_name(&self) -> &str {
            "keyword"
        }
    }

    fn seeded_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        for (premium, content) in [
            (18000.0, "Silver plan at 18000"),
            (18000.0, "Gold plan at 18000"),
            (22500.0, "Family plan at 22500"),
        ] {
            db.insert_plan(
                "quotes",
                &NewPlan {
                    premium,
                    title: content.to_string(),
                    content: content.to_string(),
                    metadata: PlanMetadata::new(),
                },
            )
            .unwrap();
        }
        db
    }

    #[tokio::test]
    async fn test_exact_premium_filter() {
        let store = SqlitePlanStore::new(seeded_db(), "quotes");

        let hits = store
            .similarity_search("insurance plan 22500", 5, &PlanFilter::premium(22500.0))
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].record.premium, 22500.0);

        let none = store
            .similarity_search("insurance plan 22000", 5, &PlanFilter::premium(22000.0))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_without_embedder_keeps_insertion_order() {
        let store = SqlitePlanStore::new(seeded_db(), "quotes");
        let hits = store
            .similarity_search("gold", 1, &PlanFilter::premium(18000.0))
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].record.content, "Silver plan at 18000");
    }

    #[tokio::test]
    async fn test_embedder_ranks_candidates() {
        let db = seeded_db();
        let embedder = KeywordEmbedder;
        for plan in db.plans_by_premium("quotes", 18000.0).unwrap() {
            let vector = embedder.embed(&plan.content).await.unwrap();
            db.insert_plan_embedding(plan.id, "keyword", &vector).unwrap();
        }

        let store = SqlitePlanStore::new(db, "quotes").with_embedder(Arc::new(KeywordEmbedder));
        let hits = store
            .similarity_search("gold insurance plan", 1, &PlanFilter::premium(18000.0))
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].record.content, "Gold plan at 18000");
        assert!(hits[0].score > 0.9);
    }

    #[tokio::test]
    async fn test_other_collection_is_invisible() {
        let store = SqlitePlanStore::new(seeded_db(), "other");
        let hits = store
            .similarity_search("q", 1, &PlanFilter::premium(18000.0))
            .await
            .unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_zero_k() {
        let store = SqlitePlanStore::new(seeded_db(), "quotes");
        let hits = store
            .similarity_search("q", 0, &PlanFilter::premium(18000.0))
            .await
            .unwrap();
        assert!(hits.is_empty());
    }
}
