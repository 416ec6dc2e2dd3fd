//! Plan storage operations

use super::Database;
use crate::error::Result;
use crate::search::{PlanMetadata, PlanRecord};
use chrono::Utc;
use rusqlite::{params, Row};
use sha2::{Digest, Sha256};

/// Hash content using SHA-256
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// A plan waiting to be stored
#[derive(Debug, Clone, PartialEq)]
pub struct NewPlan {
    pub premium: f64,
    pub title: String,
    pub content: String,
    pub metadata: PlanMetadata,
}

const PLAN_COLUMNS: &str = "id, premium, title, content, metadata";

fn row_to_plan(row: &Row<'_>) -> rusqlite::Result<PlanRecord> {
    let metadata_json: String = row.get(4)?;
    let metadata = serde_json::from_str::<PlanMetadata>(&metadata_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(PlanRecord {
        id: row.get(0)?,
        premium: row.get(1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        metadata,
    })
}

impl Database {
    /// Insert a plan into a collection.
    ///
    /// Returns the row id, or `None` when identical content already exists
    /// in the collection.
    pub fn insert_plan(&self, collection: &str, plan: &NewPlan) -> Result<Option<i64>> {
        let now = Utc::now().to_rfc3339();
        let hash = hash_content(&plan.content);
        let metadata_json = serde_json::to_string(&plan.metadata)?;

        let rows = self.conn.execute(
            "INSERT OR IGNORE INTO plans (collection, premium, title, content, metadata, hash, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                collection,
                plan.premium,
                plan.title,
                plan.content,
                metadata_json,
                hash,
                now
            ],
        )?;

        if rows == 0 {
            return Ok(None);
        }
        Ok(Some(self.conn.last_insert_rowid()))
    }

    /// Plans in a collection whose premium equals `premium` exactly, oldest first
    pub fn plans_by_premium(&self, collection: &str, premium: f64) -> Result<Vec<PlanRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM plans WHERE collection = ?1 AND premium = ?2 ORDER BY id",
            PLAN_COLUMNS
        ))?;

        let results = stmt
            .query_map(params![collection, premium], row_to_plan)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(results)
    }

    /// All plans in a collection ordered by premium
    pub fn list_plans(&self, collection: &str) -> Result<Vec<PlanRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM plans WHERE collection = ?1 ORDER BY premium, id",
            PLAN_COLUMNS
        ))?;

        let results = stmt
            .query_map(params![collection], row_to_plan)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(results)
    }

    /// Count plans in a collection
    pub fn count_plans(&self, collection: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM plans WHERE collection = ?1",
            params![collection],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Delete a collection and its embeddings
    pub fn delete_collection(&self, collection: &str) -> Result<usize> {
        self.transaction(|db| db.delete_collection_rows(collection))
    }

    /// Delete a collection's plans and vectors within the caller's transaction
    pub(crate) fn delete_collection_rows(&self, collection: &str) -> Result<usize> {
        self.conn.execute(
            "DELETE FROM plan_vectors WHERE plan_id IN
             (SELECT id FROM plans WHERE collection = ?1)",
            params![collection],
        )?;
        let rows = self
            .conn
            .execute("DELETE FROM plans WHERE collection = ?1", params![collection])?;
        Ok(rows)
    }
}
