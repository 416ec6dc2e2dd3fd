//! Database schema and initialization

use crate::error::Result;
use rusqlite::{params, Connection};
use std::path::Path;

/// Main database handle
pub struct Database {
    pub(crate) conn: Connection,
}

const SCHEMA_VERSION: i32 = 1;

const CREATE_TABLES: &str = r#"
-- Insurance plans, one row per quote document
CREATE TABLE IF NOT EXISTS plans (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    collection TEXT NOT NULL,
    premium REAL NOT NULL,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    metadata TEXT NOT NULL DEFAULT '{}',
    hash TEXT NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE(collection, hash)
);

-- Plan embeddings
CREATE TABLE IF NOT EXISTS plan_vectors (
    plan_id INTEGER NOT NULL REFERENCES plans(id) ON DELETE CASCADE,
    model TEXT NOT NULL,
    embedding BLOB NOT NULL,
    created_at TEXT NOT NULL,
    PRIMARY KEY (plan_id, model)
);

-- Model metadata for dimension validation
CREATE TABLE IF NOT EXISTS model_metadata (
    model TEXT PRIMARY KEY,
    dimensions INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    last_used_at TEXT NOT NULL
);

-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_plans_collection_premium ON plans(collection, premium);
CREATE INDEX IF NOT EXISTS idx_plan_vectors_plan ON plan_vectors(plan_id);
"#;

impl Database {
    /// Open database at path, creating if necessary
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    /// Open in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Initialize database schema
    pub fn initialize(&self) -> Result<()> {
        self.conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;

        self.conn.execute_batch(CREATE_TABLES)?;

        // Migrations run before the version is stamped
        self.migrate()?;

        self.conn.execute(
            "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
            params![SCHEMA_VERSION],
        )?;

        Ok(())
    }

    /// Get current schema version
    pub fn schema_version(&self) -> Result<Option<i32>> {
        let version = self
            .conn
            .query_row(
                "SELECT version FROM schema_version ORDER BY version DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .ok();
        Ok(version)
    }

    /// Run migrations to upgrade schema to current version
    pub fn migrate(&self) -> Result<()> {
        // Version 1 is the first layout; upgrades go here as `if current < N`
        Ok(())
    }

    /// Run `f` inside one `BEGIN IMMEDIATE` transaction.
    ///
    /// Commits when `f` returns `Ok`, rolls back otherwise. Not reentrant:
    /// `f` must not call anything that opens its own transaction.
    pub fn transaction<T>(&self, f: impl FnOnce(&Self) -> Result<T>) -> Result<T> {
        self.conn.execute("BEGIN IMMEDIATE", [])?;
        let result = f(self).and_then(|value| {
            self.conn.execute("COMMIT", [])?;
            Ok(value)
        });
        if result.is_err() {
            let _ = self.conn.execute("ROLLBACK", []);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_sets_version() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        assert_eq!(db.schema_version().unwrap(), Some(SCHEMA_VERSION));
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        db.initialize().unwrap();
        assert_eq!(db.schema_version().unwrap(), Some(SCHEMA_VERSION));
    }

    #[test]
    fn test_fresh_database_is_version_one() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.schema_version().unwrap(), None);
        db.initialize().unwrap();
        assert_eq!(db.schema_version().unwrap(), Some(1));

        let has_title: bool = db
            .conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM pragma_table_info('plans') WHERE name = 'title'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert!(has_title);
    }

    fn count(db: &Database) -> i64 {
        db.conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_transaction_commits_on_ok() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();

        db.transaction(|db| {
            db.conn
                .execute("INSERT INTO schema_version (version) VALUES (7)", [])?;
            Ok(())
        })
        .unwrap();
        assert_eq!(count(&db), 2);
    }

    #[test]
    fn test_transaction_rolls_back_on_err() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();

        let result: Result<()> = db.transaction(|db| {
            db.conn
                .execute("INSERT INTO schema_version (version) VALUES (7)", [])?;
            Err(crate::error::QuoteBotError::InvalidInput("stop".into()))
        });
        assert!(result.is_err());
        assert_eq!(count(&db), 1);

        // The connection is usable again after the rollback
        db.transaction(|_| Ok(())).unwrap();
    }
}
