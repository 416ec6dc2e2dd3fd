//! Database layer for quotebot
//!
//! Provides SQLite-based storage with:
//! - Insurance plan records keyed by premium
//! - Plan embeddings stored as BLOBs
//! - Content hashing for de-duplication

mod plans;
mod schema;
mod stats;
pub mod vectors;

pub use plans::{hash_content, NewPlan};
pub use schema::Database;
pub use stats::DatabaseStats;
use std::path::PathBuf;

impl Database {
    /// Get the default database path
    pub fn default_path() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CACHE_DIR_NAME)
            .join("plans.sqlite")
    }
}
