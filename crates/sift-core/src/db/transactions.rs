//! Transaction operations
//!
//! Both tables use insert-if-absent semantics keyed on the source id: a
//! record exists for an id iff that id has been processed, and re-offering
//! the same id never overwrites the stored row.

use rusqlite::params;
use std::str::FromStr;

use super::Database;
use crate::error::Result;
use crate::models::{CategorizedTransaction, Direction, Transaction};

impl Database {
    /// Insert a transaction if no row with this id exists yet.
    ///
    /// Returns true if a new row was written, false if the id was already
    /// present (existing row untouched).
    pub fn insert_transaction(&self, tx: &Transaction) -> Result<bool> {
        let conn = self.conn()?;
        let changed = conn.execute(
            r#"
            INSERT OR IGNORE INTO transactions (id, date, sender, amount, counterpart, direction, body)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                tx.id,
                tx.date,
                tx.sender,
                tx.amount,
                tx.counterpart,
                tx.direction.as_str(),
                tx.body,
            ],
        )?;
        Ok(changed > 0)
    }

    /// Insert a categorized transaction if no row with this id exists yet
    pub fn insert_categorized(&self, tx: &CategorizedTransaction) -> Result<bool> {
        let conn = self.conn()?;
        let changed = conn.execute(
            r#"
            INSERT OR IGNORE INTO categorized_transactions
                (id, date, sender, amount, counterpart, direction, body, category, verified)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                tx.id,
                tx.date,
                tx.sender,
                tx.amount,
                tx.counterpart,
                tx.direction.as_str(),
                tx.body,
                tx.category,
                tx.verified,
            ],
        )?;
        Ok(changed > 0)
    }

    /// List all categorized transactions
    pub fn list_categorized(&self) -> Result<Vec<CategorizedTransaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, date, sender, amount, counterpart, direction, body, category, verified
            FROM categorized_transactions
            ORDER BY created_at, id
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            let direction: String = row.get(5)?;
            Ok(CategorizedTransaction {
                id: row.get(0)?,
                date: row.get(1)?,
                sender: row.get(2)?,
                amount: row.get(3)?,
                counterpart: row.get(4)?,
                direction: Direction::from_str(&direction).unwrap_or(Direction::Unknown),
                body: row.get(6)?,
                category: row.get(7)?,
                verified: row.get(8)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Fetch a single categorized transaction by id
    pub fn get_categorized(&self, id: &str) -> Result<Option<CategorizedTransaction>> {
        Ok(self.list_categorized()?.into_iter().find(|t| t.id == id))
    }

    /// Ids present in the transactions table (seeds the dedup tracker)
    pub fn list_transaction_ids(&self) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id FROM transactions")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Ids present in the categorized_transactions table
    pub fn list_categorized_ids(&self) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id FROM categorized_transactions")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Count stored transactions
    pub fn count_transactions(&self) -> Result<i64> {
        let conn = self.conn()?;
        Ok(conn.query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?)
    }

    /// Per-category sum of debit amounts from categorized transactions
    pub fn debit_totals_by_category(&self) -> Result<Vec<(String, f64)>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT category, SUM(amount)
            FROM categorized_transactions
            WHERE direction = 'debit'
            GROUP BY category
            ORDER BY category
            "#,
        )?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Number of distinct calendar days with at least one debit.
    ///
    /// Dates are stored as readable timestamps; the day is the first ten
    /// characters ("YYYY-MM-DD").
    pub fn distinct_debit_days(&self) -> Result<i64> {
        let conn = self.conn()?;
        Ok(conn.query_row(
            "SELECT COUNT(DISTINCT substr(date, 1, 10)) FROM categorized_transactions WHERE direction = 'debit'",
            [],
            |row| row.get(0),
        )?)
    }
}
