//! Category totals, budget recommendations, and insight records
//!
//! All three tables are derived views: each writer deletes everything and
//! inserts the fresh result in one transaction, so a run is idempotent and
//! partial updates can never be observed.

use rusqlite::params;
use std::str::FromStr;

use super::Database;
use crate::error::{Error, Result};
use crate::models::{BudgetRecommendation, CategoryTotal, Insight, InsightSlot};

impl Database {
    /// Replace all category totals with the given set
    pub fn replace_category_totals(&self, totals: &[CategoryTotal]) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM category_totals", [])?;
        for t in totals {
            tx.execute(
                "INSERT INTO category_totals (category, total) VALUES (?, ?)",
                params![t.category, t.total],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// List category totals, sorted by category name
    pub fn list_category_totals(&self) -> Result<Vec<CategoryTotal>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT category, total FROM category_totals ORDER BY category")?;
        let rows = stmt.query_map([], |row| {
            Ok(CategoryTotal {
                category: row.get(0)?,
                total: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Replace all budget recommendations with the given set
    pub fn replace_recommendations(&self, recs: &[BudgetRecommendation]) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM recommendations", [])?;
        for r in recs {
            tx.execute(
                "INSERT INTO recommendations (category, current, recommended) VALUES (?, ?, ?)",
                params![r.category, r.current, r.recommended],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// List budget recommendations, sorted by category name
    pub fn list_recommendations(&self) -> Result<Vec<BudgetRecommendation>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT category, current, recommended FROM recommendations ORDER BY category")?;
        let rows = stmt.query_map([], |row| {
            Ok(BudgetRecommendation {
                category: row.get(0)?,
                current: row.get(1)?,
                recommended: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Replace all insight records with the given set
    pub fn replace_insights(&self, insights: &[Insight]) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM insights", [])?;
        for i in insights {
            tx.execute(
                "INSERT INTO insights (slot, title, body) VALUES (?, ?, ?)",
                params![i.slot.as_str(), i.title, i.body],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// List insights in slot order (summary, allocated, simulation,
    /// recommendations)
    pub fn list_insights(&self) -> Result<Vec<Insight>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT slot, title, body FROM insights")?;
        let rows = stmt.query_map([], |row| {
            let slot: String = row.get(0)?;
            Ok((slot, row.get::<_, String>(1)?, row.get::<_, String>(2)?))
        })?;

        let mut insights = Vec::new();
        for row in rows {
            let (slot, title, body) = row?;
            let slot = InsightSlot::from_str(&slot)
                .map_err(|e| Error::InvalidData(format!("insight slot: {}", e)))?;
            insights.push(Insight { slot, title, body });
        }
        insights.sort_by_key(|i| match i.slot {
            InsightSlot::Summary => 0,
            InsightSlot::Allocated => 1,
            InsightSlot::Simulation => 2,
            InsightSlot::Recommendations => 3,
        });
        Ok(insights)
    }
}
