//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` / `resolve_db_path` / `load_config` - shared plumbing
//! - `cmd_init` - Initialize the database
//! - `cmd_process` - One-shot ingestion and aggregation pass
//! - `cmd_seed_demo` - Insert demo data

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use sift_core::models::{Goal, ManualEntry, RawMessage};
use sift_core::{
    aggregate, ArtifactStore, CategoryClassifier, Config, Database, DeclineResolver, DedupTracker,
    IngestionPipeline,
};

/// Resolve the database path: explicit --db wins, otherwise the platform
/// data directory (falling back to the working directory)
pub fn resolve_db_path(arg: Option<&Path>) -> PathBuf {
    match arg {
        Some(p) => p.to_path_buf(),
        None => dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sift")
            .join("sift.db"),
    }
}

/// Open the database, creating parent directories as needed
pub fn open_db(db_path: &Path) -> Result<Database> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    let path_str = db_path
        .to_str()
        .context("Database path is not valid UTF-8")?;
    Database::new(path_str).context("Failed to open database")
}

pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
    Config::load_or_default(config_path).context("Failed to load config")
}

/// Build a classifier from the persisted artifact, retraining if needed
pub fn load_classifier(db: &Database) -> Result<CategoryClassifier> {
    let mut classifier = CategoryClassifier::new(ArtifactStore::new(ArtifactStore::default_path()));
    classifier
        .initialize(db)
        .context("Failed to initialize classifier")?;
    Ok(classifier)
}

pub fn cmd_init(db_path: &Path) -> Result<()> {
    println!("Initializing database at {}...", db_path.display());

    let db = open_db(db_path)?;
    println!(
        "  {} raw messages, {} manual entries, {} transactions",
        db.count_raw_messages()?,
        db.count_manual_entries()?,
        db.count_transactions()?
    );
    println!("Database ready.");
    println!();
    println!("Next steps:");
    println!("  1. Seed demo data:    sift seed-demo");
    println!("  2. Start the loops:   sift run");

    Ok(())
}

pub fn cmd_process(db_path: &Path, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let db = open_db(db_path)?;
    let mut classifier = load_classifier(&db)?;
    let mut dedup = DedupTracker::initialize(&db)?;

    let resolver = DeclineResolver;
    let pipeline = IngestionPipeline::new(&db, &config.pipeline, &resolver);
    let outcome = pipeline.process_new_data(&mut classifier, &mut dedup)?;

    println!(
        "Processed {} new messages ({} stored) and {} manual entries",
        outcome.new_messages, outcome.stored, outcome.new_manual
    );

    if outcome.saw_new_data() {
        let totals = aggregate::recompute(&db, &config.aggregation)?;
        println!("Recomputed {} category totals:", totals.len());
        for t in &totals {
            println!("  {:<14} ₹{:.2}", t.category, t.total);
        }
    } else {
        println!("Nothing new to process.");
    }

    Ok(())
}

pub fn cmd_seed_demo(db_path: &Path) -> Result<()> {
    let db = open_db(db_path)?;
    let now = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();

    let messages = [
        (
            "demo-msg-1",
            "INR 450 debited for payment to Swiggy Instamart",
            "VM-HDFCBK",
        ),
        (
            "demo-msg-2",
            "Rs. 1,299 sent to Amazon Pay for your order",
            "AX-ICICIB",
        ),
        (
            "demo-msg-3",
            "INR 5000 credited to your account from salary transfer",
            "VM-HDFCBK",
        ),
        (
            "demo-msg-4",
            "Mega offer! 50% discount on recharge, hurry and click here",
            "TX-PROMO",
        ),
        (
            "demo-msg-5",
            "INR 320 debited for Uber trip to Airport",
            "AX-ICICIB",
        ),
    ];
    for (id, body, sender) in messages {
        db.insert_raw_message(&RawMessage {
            id: id.to_string(),
            body: body.to_string(),
            sender: sender.to_string(),
            received_at: now.clone(),
        })?;
    }

    db.insert_manual_entry(&ManualEntry {
        id: "demo-manual-1".to_string(),
        category: "Food & Dining".to_string(),
        amount: 180.0,
    })?;

    let goals = [
        ("demo-goal-1", "Vacation", 60000.0, 12),
        ("demo-goal-2", "Emergency Fund", 100000.0, 24),
    ];
    for (id, name, target, months) in goals {
        db.insert_goal(&Goal {
            id: id.to_string(),
            name: name.to_string(),
            target_amount: target,
            timeframe_months: months,
        })?;
    }

    println!(
        "Seeded {} messages, 1 manual entry, {} goals.",
        messages.len(),
        goals.len()
    );
    println!("Run 'sift process' then 'sift analyze' to see the pipeline in action.");

    Ok(())
}
