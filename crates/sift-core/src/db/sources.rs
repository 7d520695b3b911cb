//! Raw message and manual entry stores
//!
//! Both tables are written by external producers; the pipeline treats them
//! as read-only input. The insert methods exist for seeding and tests.

use rusqlite::params;

use super::Database;
use crate::error::Result;
use crate::models::{ManualEntry, RawMessage};

impl Database {
    /// Insert a raw message (seeding/tests; normally written externally)
    pub fn insert_raw_message(&self, msg: &RawMessage) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR IGNORE INTO raw_messages (id, body, sender, received_at) VALUES (?, ?, ?, ?)",
            params![msg.id, msg.body, msg.sender, msg.received_at],
        )?;
        Ok(())
    }

    /// List all raw messages, oldest first
    pub fn list_raw_messages(&self) -> Result<Vec<RawMessage>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, body, sender, received_at FROM raw_messages ORDER BY created_at, id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(RawMessage {
                id: row.get(0)?,
                body: row.get(1)?,
                sender: row.get(2)?,
                received_at: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Count raw messages (used by the change detector)
    pub fn count_raw_messages(&self) -> Result<i64> {
        let conn = self.conn()?;
        Ok(conn.query_row("SELECT COUNT(*) FROM raw_messages", [], |row| row.get(0))?)
    }

    /// Insert a manual entry (seeding/tests; normally written externally)
    pub fn insert_manual_entry(&self, entry: &ManualEntry) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR IGNORE INTO manual_entries (id, category, amount) VALUES (?, ?, ?)",
            params![entry.id, entry.category, entry.amount],
        )?;
        Ok(())
    }

    /// List all manual entries
    pub fn list_manual_entries(&self) -> Result<Vec<ManualEntry>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT id, category, amount FROM manual_entries ORDER BY created_at, id")?;
        let rows = stmt.query_map([], |row| {
            Ok(ManualEntry {
                id: row.get(0)?,
                category: row.get(1)?,
                amount: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// List manual entry ids only
    pub fn list_manual_entry_ids(&self) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id FROM manual_entries ORDER BY created_at, id")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Count manual entries (used by the change detector)
    pub fn count_manual_entries(&self) -> Result<i64> {
        let conn = self.conn()?;
        Ok(conn.query_row("SELECT COUNT(*) FROM manual_entries", [], |row| row.get(0))?)
    }
}
