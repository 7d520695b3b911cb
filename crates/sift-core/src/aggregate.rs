//! Category aggregation
//!
//! Recomputes the category -> total mapping from scratch on every run and
//! replaces the stored view wholesale. Full recompute keeps the operation
//! idempotent under irregular run cadence; the data volumes here never
//! justify incremental updates.

use std::collections::BTreeMap;

use tracing::info;

use crate::config::AggregationConfig;
use crate::db::Database;
use crate::error::Result;
use crate::models::CategoryTotal;

/// Recompute category totals from categorized transactions and manual
/// entries, write the replacement view, and return it.
///
/// Source categories go through the rename table; categories absent from
/// the table are excluded from the output.
pub fn recompute(db: &Database, config: &AggregationConfig) -> Result<Vec<CategoryTotal>> {
    // BTreeMap for stable output order
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();

    for tx in db.list_categorized()? {
        if let Some(display) = config.rename.get(&tx.category) {
            *totals.entry(display.clone()).or_insert(0.0) += tx.amount;
        }
    }

    for entry in db.list_manual_entries()? {
        if let Some(display) = config.rename.get(&entry.category) {
            *totals.entry(display.clone()).or_insert(0.0) += entry.amount;
        }
    }

    let totals: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category, total)| CategoryTotal {
            category,
            total: round2(total),
        })
        .collect();

    db.replace_category_totals(&totals)?;
    info!("Recomputed {} category totals", totals.len());
    Ok(totals)
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
