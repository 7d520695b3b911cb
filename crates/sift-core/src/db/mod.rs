//! Database access layer with connection pooling and migrations
//!
//! This module is organized by domain:
//! - `sources` - Raw message and manual entry stores (externally produced)
//! - `transactions` - Transaction and categorized-transaction inserts
//! - `training` - Append-only human-corrected training examples
//! - `goals` - Savings goals (read-only, malformed rows skipped)
//! - `aggregates` - Category totals, recommendations, insights (full replace)

use chrono::{DateTime, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use tracing::info;

use crate::error::Result;

mod aggregates;
mod goals;
mod sources;
mod training;
mod transactions;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Parse a SQLite datetime string into a DateTime<Utc>
pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    // SQLite stores as "YYYY-MM-DD HH:MM:SS" format
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.and_utc())
        .unwrap_or_else(|_| Utc::now())
}

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    /// Path to the database file
    db_path: String,
}

impl Database {
    /// Create a new database connection pool and run migrations
    pub fn new(path: &str) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::builder().max_size(10).build(manager)?;

        let db = Self {
            pool,
            db_path: path.to_string(),
        };
        db.run_migrations()?;

        Ok(db)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Create a throwaway database (for testing)
    ///
    /// Note: Uses a temporary file rather than `:memory:` because every
    /// pooled connection would otherwise get its own empty database.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = format!(
            "{}/sift_test_{}_{}.db",
            std::env::temp_dir().display(),
            std::process::id(),
            id
        );

        // Remove any existing file
        let _ = std::fs::remove_file(&path);

        Self::new(&path)
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- Enable foreign keys
            PRAGMA foreign_keys = ON;

            -- WAL mode: better concurrency, readers don't block writers
            PRAGMA journal_mode = WAL;

            -- Synchronous NORMAL: good balance of safety and performance
            PRAGMA synchronous = NORMAL;

            -- Raw notification messages (produced by the external SMS bridge)
            CREATE TABLE IF NOT EXISTS raw_messages (
                id TEXT PRIMARY KEY,
                body TEXT NOT NULL,
                sender TEXT NOT NULL DEFAULT 'Unknown',
                received_at TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            -- Manual expense entries (produced by the companion app)
            CREATE TABLE IF NOT EXISTS manual_entries (
                id TEXT PRIMARY KEY,
                category TEXT NOT NULL,
                amount REAL NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            -- Normalized transactions, keyed by the source message id.
            -- Never updated after first insert.
            CREATE TABLE IF NOT EXISTS transactions (
                id TEXT PRIMARY KEY,
                date TEXT NOT NULL,
                sender TEXT NOT NULL,
                amount REAL NOT NULL,
                counterpart TEXT NOT NULL,
                direction TEXT NOT NULL,
                body TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            -- Transactions with their assigned category
            CREATE TABLE IF NOT EXISTS categorized_transactions (
                id TEXT PRIMARY KEY,
                date TEXT NOT NULL,
                sender TEXT NOT NULL,
                amount REAL NOT NULL,
                counterpart TEXT NOT NULL,
                direction TEXT NOT NULL,
                body TEXT NOT NULL,
                category TEXT NOT NULL,
                verified BOOLEAN NOT NULL DEFAULT 0,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_categorized_category
                ON categorized_transactions(category);
            CREATE INDEX IF NOT EXISTS idx_categorized_direction
                ON categorized_transactions(direction);

            -- Human-corrected labels; append-only, feeds retraining
            CREATE TABLE IF NOT EXISTS training_examples (
                id INTEGER PRIMARY KEY,
                body TEXT NOT NULL,
                category TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_training_created
                ON training_examples(created_at);

            -- Savings goals, managed externally
            CREATE TABLE IF NOT EXISTS goals (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                target_amount REAL NOT NULL,
                timeframe_months INTEGER NOT NULL
            );

            -- Aggregated spend per display category; fully replaced each run
            CREATE TABLE IF NOT EXISTS category_totals (
                category TEXT PRIMARY KEY,
                total REAL NOT NULL
            );

            -- Per-category current vs recommended spend; fully replaced
            CREATE TABLE IF NOT EXISTS recommendations (
                category TEXT PRIMARY KEY,
                current REAL NOT NULL,
                recommended REAL NOT NULL
            );

            -- Narrative budget insights; fully replaced, fixed slot ids
            CREATE TABLE IF NOT EXISTS insights (
                slot TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                body TEXT NOT NULL
            );
            "#,
        )?;

        info!("Database schema initialized");
        Ok(())
    }
}
