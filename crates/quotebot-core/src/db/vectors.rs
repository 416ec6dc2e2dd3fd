//! Vector storage operations
//!
//! Stores plan embeddings as BLOBs and computes cosine similarity in Rust.

use super::Database;
use crate::error::Result;
use chrono::Utc;
use rusqlite::params;

impl Database {
    /// Insert or replace the embedding of a plan
    pub fn insert_plan_embedding(&self, plan_id: i64, model: &str, embedding: &[f32]) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let embedding_bytes = embedding_to_bytes(embedding);

        self.conn.execute(
            "INSERT OR REPLACE INTO plan_vectors (plan_id, model, embedding, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![plan_id, model, embedding_bytes, now],
        )?;
        Ok(())
    }

    /// Embeddings of the plans in a collection with the given premium
    pub fn plan_embeddings_for_premium(
        &self,
        collection: &str,
        premium: f64,
        model: &str,
    ) -> Result<Vec<(i64, Vec<f32>)>> {
        let mut stmt = self.conn.prepare(
            "SELECT pv.plan_id, pv.embedding
             FROM plan_vectors pv
             JOIN plans p ON p.id = pv.plan_id
             WHERE p.collection = ?1 AND p.premium = ?2 AND pv.model = ?3
             ORDER BY p.id",
        )?;

        let results = stmt
            .query_map(params![collection, premium, model], |row| {
                let plan_id: i64 = row.get(0)?;
                let embedding_bytes: Vec<u8> = row.get(1)?;
                Ok((plan_id, bytes_to_embedding(&embedding_bytes)))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(results)
    }

    /// Count stored embeddings for a collection
    pub fn count_plan_embeddings(&self, collection: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM plan_vectors pv
             JOIN plans p ON p.id = pv.plan_id
             WHERE p.collection = ?1",
            params![collection],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Check if model dimensions are compatible with expected dimensions
    pub fn check_model_compatibility(&self, model: &str, expected_dims: usize) -> Result<bool> {
        match self.get_model_dimensions(model)? {
            Some(stored_dims) => Ok(stored_dims == expected_dims),
            None => Ok(true),
        }
    }

    /// Register model with its dimensions
    pub fn register_model(&self, model: &str, dimensions: usize) -> Result<()> {
        let now = Utc::now().to_rfc3339();

        self.conn.execute(
            "INSERT INTO model_metadata (model, dimensions, created_at, last_used_at)
             VALUES (?1, ?2, ?3, ?3)
             ON CONFLICT(model) DO UPDATE SET last_used_at = ?3",
            params![model, dimensions as i64, now],
        )?;

        Ok(())
    }

    /// Get stored model dimensions
    pub fn get_model_dimensions(&self, model: &str) -> Result<Option<usize>> {
        let result = self.conn.query_row(
            "SELECT dimensions FROM model_metadata WHERE model = ?1",
            params![model],
            |row| row.get::<_, i64>(0),
        );

        match result {
            Ok(dims) => Ok(Some(dims as usize)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Convert f32 embedding to bytes (little-endian)
pub fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Convert bytes to f32 embedding
pub fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Compute cosine similarity between two embeddings
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}
