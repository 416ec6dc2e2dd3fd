//! Database statistics

use super::Database;
use crate::error::Result;
use rusqlite::params;

/// Database stats for one collection
#[derive(Debug, Clone, serde::Serialize)]
pub struct DatabaseStats {
    pub collection: String,
    pub plan_count: usize,
    pub distinct_premiums: usize,
    pub embedded_count: usize,
    pub min_premium: Option<f64>,
    pub max_premium: Option<f64>,
    pub schema_version: Option<i32>,
}

impl Database {
    /// Get database statistics
    pub fn get_stats(&self, collection: &str) -> Result<DatabaseStats> {
        let (plan_count, distinct_premiums, min_premium, max_premium): (
            i64,
            i64,
            Option<f64>,
            Option<f64>,
        ) = self.conn.query_row(
            "SELECT COUNT(*), COUNT(DISTINCT premium), MIN(premium), MAX(premium)
             FROM plans WHERE collection = ?1",
            params![collection],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )?;

        let embedded_count = self.count_plan_embeddings(collection).unwrap_or(0);

        Ok(DatabaseStats {
            collection: collection.to_string(),
            plan_count: plan_count as usize,
            distinct_premiums: distinct_premiums as usize,
            embedded_count,
            min_premium,
            max_premium,
            schema_version: self.schema_version()?,
        })
    }
}
