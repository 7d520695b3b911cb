//! Processed-id tracking
//!
//! The in-memory set is an optimization to avoid re-examining unchanged
//! ids on every poll; insert-if-absent at the database layer remains the
//! correctness backstop if the same id is ever re-offered.

use std::collections::HashSet;

use tracing::debug;

use crate::db::Database;
use crate::error::Result;

/// Tracks which source ids have already been processed.
///
/// Invariant after `initialize`: the set contains every id with a persisted
/// transaction, categorized transaction, or manual entry.
#[derive(Debug, Default)]
pub struct DedupTracker {
    processed: HashSet<String>,
}

impl DedupTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the set from all three persisted stores (one-time full scan)
    pub fn initialize(db: &Database) -> Result<Self> {
        let mut processed = HashSet::new();
        processed.extend(db.list_transaction_ids()?);
        processed.extend(db.list_categorized_ids()?);
        processed.extend(db.list_manual_entry_ids()?);
        debug!("Dedup tracker seeded with {} processed ids", processed.len());
        Ok(Self { processed })
    }

    /// Mark an id as processed; re-marking is a no-op
    pub fn mark(&mut self, id: &str) {
        self.processed.insert(id.to_string());
    }

    pub fn is_processed(&self, id: &str) -> bool {
        self.processed.contains(id)
    }

    /// Candidate ids not yet processed, in input order
    pub fn pending<'a>(&self, source_ids: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        source_ids
            .into_iter()
            .filter(|id| !self.processed.contains(*id))
            .map(|id| id.to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.processed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processed.is_empty()
    }
}
