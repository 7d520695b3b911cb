//! Append-only training example store

use rusqlite::params;

use super::{parse_datetime, Database};
use crate::error::Result;
use crate::models::TrainingExample;

impl Database {
    /// Append a human-corrected label
    pub fn append_training_example(&self, body: &str, category: &str) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO training_examples (body, category) VALUES (?, ?)",
            params![body, category],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// List all training examples, oldest first
    pub fn list_training_examples(&self) -> Result<Vec<TrainingExample>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, body, category, created_at FROM training_examples ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            let created: String = row.get(3)?;
            Ok(TrainingExample {
                id: row.get(0)?,
                body: row.get(1)?,
                category: row.get(2)?,
                created_at: parse_datetime(&created),
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Count stored training examples
    pub fn count_training_examples(&self) -> Result<i64> {
        let conn = self.conn()?;
        Ok(conn.query_row("SELECT COUNT(*) FROM training_examples", [], |row| row.get(0))?)
    }
}
