//! Plan ingestion
//!
//! Loads plans from a JSON file of `{content, metadata: {premium, ...}}`
//! entries and stores them (optionally with embeddings) in a collection.

use crate::amounts::parse_amount;
use crate::db::{Database, NewPlan};
use crate::error::{QuoteBotError, Result};
use crate::llm::Embedder;
use crate::search::PlanMetadata;
use serde::{Deserialize, Serialize};
use std::path::Path;

const EMBED_BATCH_SIZE: usize = 32;
const MAX_TITLE_CHARS: usize = 80;

/// What to do when the target collection already holds plans
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IngestMode {
    /// Keep existing plans and do nothing
    #[default]
    Skip,
    /// Delete the collection and rebuild it
    Recreate,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IngestReport {
    pub collection: String,
    /// Plans already present before ingestion
    pub existing: usize,
    pub skipped: bool,
    pub removed: usize,
    pub inserted: usize,
    /// Entries whose content was already stored
    pub duplicates: usize,
    pub embedded: usize,
}

#[derive(Deserialize)]
struct RawPlan {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    metadata: PlanMetadata,
}

/// Read a plan file. Every entry needs non-empty `content` and a numeric
/// `metadata.premium`.
pub fn load_plan_file(path: impl AsRef<Path>) -> Result<Vec<NewPlan>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    parse_plans(&text).map_err(|e| match e {
        QuoteBotError::Parse(msg) => QuoteBotError::Parse(format!("{}: {}", path.display(), msg)),
        other => other,
    })
}

/// Parse plan entries from JSON text
pub fn parse_plans(text: &str) -> Result<Vec<NewPlan>> {
    let raw: Vec<RawPlan> = serde_json::from_str(text)
        .map_err(|e| QuoteBotError::Parse(format!("expected a JSON array of plans: {}", e)))?;

    raw.into_iter()
        .enumerate()
        .map(|(index, entry)| to_new_plan(index, entry))
        .collect()
}

fn to_new_plan(index: usize, entry: RawPlan) -> Result<NewPlan> {
    let content = entry
        .content
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .ok_or_else(|| QuoteBotError::Parse(format!("entry {} has no content", index)))?;

    let premium = match entry.metadata.get("premium") {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => parse_amount(s),
        _ => None,
    }
    .filter(|p| p.is_finite() && *p > 0.0)
    .ok_or_else(|| {
        QuoteBotError::Parse(format!("entry {} has no numeric metadata.premium", index))
    })?;

    Ok(NewPlan {
        premium,
        title: plan_title(&entry.metadata, &content),
        content,
        metadata: entry.metadata,
    })
}

fn plan_title(metadata: &PlanMetadata, content: &str) -> String {
    for key in ["plan_name", "name", "title"] {
        if let Some(name) = metadata.get(key).and_then(|v| v.as_str()) {
            if !name.trim().is_empty() {
                return name.trim().to_string();
            }
        }
    }

    let first_line = content.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    let title: String = first_line.trim().chars().take(MAX_TITLE_CHARS).collect();
    title
}

/// Store plans in `collection`, embedding newly inserted ones when an
/// embedder is given.
///
/// Removing the old collection and inserting the new plans happen in one
/// transaction, so a failed rebuild leaves the previous plans in place.
/// Embedding runs after that commit.
pub async fn ingest_plans(
    db: &Database,
    collection: &str,
    plans: &[NewPlan],
    embedder: Option<&dyn Embedder>,
    mode: IngestMode,
) -> Result<IngestReport> {
    let mut report = IngestReport {
        collection: collection.to_string(),
        ..IngestReport::default()
    };

    let inserted = db.transaction(|db| store_plans(db, collection, plans, mode, &mut report))?;
    if report.skipped {
        return Ok(report);
    }

    if let Some(embedder) = embedder {
        report.embedded = embed_inserted(db, embedder, &inserted).await?;
    }

    tracing::info!(
        collection,
        inserted = report.inserted,
        duplicates = report.duplicates,
        embedded = report.embedded,
        "Ingested plans"
    );
    Ok(report)
}

/// Returns the ids and contents of newly inserted plans
fn store_plans(
    db: &Database,
    collection: &str,
    plans: &[NewPlan],
    mode: IngestMode,
    report: &mut IngestReport,
) -> Result<Vec<(i64, String)>> {
    report.existing = db.count_plans(collection)?;

    if report.existing > 0 {
        match mode {
            IngestMode::Skip => {
                tracing::info!(
                    collection,
                    existing = report.existing,
                    "Collection already populated, skipping"
                );
                report.skipped = true;
                return Ok(Vec::new());
            }
            IngestMode::Recreate => {
                report.removed = db.delete_collection_rows(collection)?;
                tracing::info!(collection, removed = report.removed, "Deleting collection");
            }
        }
    }

    let mut inserted: Vec<(i64, String)> = Vec::new();
    for plan in plans {
        match db.insert_plan(collection, plan)? {
            Some(id) => inserted.push((id, plan.content.clone())),
            None => report.duplicates += 1,
        }
    }
    report.inserted = inserted.len();
    Ok(inserted)
}

async fn embed_inserted(
    db: &Database,
    embedder: &dyn Embedder,
    inserted: &[(i64, String)],
) -> Result<usize> {
    let model = embedder.model_name();
    let mut embedded = 0;

    for batch in inserted.chunks(EMBED_BATCH_SIZE) {
        let texts: Vec<String> = batch.iter().map(|(_, content)| content.clone()).collect();
        let vectors = embedder.embed_batch(&texts).await?;

        if let Some(first) = vectors.first() {
            if !db.check_model_compatibility(model, first.len())? {
                return Err(QuoteBotError::Config(format!(
                    "Embedding model {} produced {} dimensions, database expects {:?}",
                    model,
                    first.len(),
                    db.get_model_dimensions(model)?
                )));
            }
            db.register_model(model, first.len())?;
        }

        for ((plan_id, _), vector) in batch.iter().zip(vectors.iter()) {
            db.insert_plan_embedding(*plan_id, model, vector)?;
            embedded += 1;
        }
        tracing::debug!(embedded, total = inserted.len(), "Embedded plan batch");
    }

    Ok(embedded)
}
