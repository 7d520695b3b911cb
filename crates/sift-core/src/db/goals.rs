//! Savings goal store
//!
//! Goals are managed externally; this layer only reads them. A malformed
//! row (non-numeric target, missing field) is skipped with a warning rather
//! than aborting the whole load.

use rusqlite::params;
use tracing::warn;

use super::Database;
use crate::error::Result;
use crate::models::Goal;

impl Database {
    /// Insert a goal (seeding/tests; normally written externally)
    pub fn insert_goal(&self, goal: &Goal) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR IGNORE INTO goals (id, name, target_amount, timeframe_months) VALUES (?, ?, ?, ?)",
            params![goal.id, goal.name, goal.target_amount, goal.timeframe_months],
        )?;
        Ok(())
    }

    /// List goals, skipping rows that fail to decode
    pub fn list_goals(&self) -> Result<Vec<Goal>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT id, name, target_amount, timeframe_months FROM goals ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Goal {
                id: row.get(0)?,
                name: row.get(1)?,
                target_amount: row.get(2)?,
                timeframe_months: row.get(3)?,
            })
        })?;

        let mut goals = Vec::new();
        for row in rows {
            match row {
                Ok(goal) => goals.push(goal),
                Err(e) => warn!("Skipping invalid goal entry: {}", e),
            }
        }
        Ok(goals)
    }
}
