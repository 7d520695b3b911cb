//! The long-running orchestrator
//!
//! Two loops share the database:
//! - ingestion: polls for new raw messages / manual entries and, on
//!   change, runs the pipeline, recomputes category totals, and refreshes
//!   the budget analysis
//! - monthly: checks the calendar on a slow cadence and runs the budget
//!   analysis once per new month
//!
//! A shared lock serializes the mutation sections so the loops never
//! interleave writes to the aggregation and recommendation state. Loop
//! bodies catch and log their errors, then back off; a bad record or a
//! transient database failure must not kill the process.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use tokio::sync::Mutex;
use tokio::time::{interval, sleep};
use tracing::{error, info};

use sift_core::{
    aggregate, budget::BudgetEngine, CategoryResolver, ChangeDetector, Config, Database,
    DedupTracker, IngestionPipeline, MonthBoundary,
};

use super::core::{load_classifier, load_config, open_db};

/// Asks the operator on stdin whether an escalated transaction should keep
/// its fallback category. A blank line (or any read failure) declines.
pub struct StdinResolver;

impl CategoryResolver for StdinResolver {
    fn resolve(&self, body: &str, amount: f64) -> Option<String> {
        println!();
        println!(
            "Review: ₹{:.2} transaction classified as Miscellaneous",
            amount
        );
        println!("  {}", body);
        print!("Enter a category to override, or press Enter to keep: ");
        let _ = std::io::stdout().flush();

        let mut line = String::new();
        if std::io::stdin().read_line(&mut line).is_err() {
            return None;
        }
        let answer = line.trim();
        if answer.is_empty() {
            None
        } else {
            Some(answer.to_string())
        }
    }
}

pub async fn cmd_run(db_path: &Path, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let db = open_db(db_path)?;

    info!("Starting orchestrator (db: {})", db.path());

    // Serializes the write sections of the two loops
    let write_gate = Arc::new(Mutex::new(()));

    start_monthly_loop(db.clone(), config.clone(), write_gate.clone());
    ingestion_loop(db, config, write_gate).await
}

/// Spawn the monthly analysis loop as a background task
fn start_monthly_loop(db: Database, config: Config, write_gate: Arc<Mutex<()>>) {
    info!(
        "Monthly analysis: checking every {} seconds",
        config.schedule.monthly_check_interval_secs
    );

    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(
            config.schedule.monthly_check_interval_secs,
        ));
        let mut boundary = MonthBoundary::new();

        loop {
            ticker.tick().await;

            // Backoff happens with the gate released so the ingestion loop
            // keeps running while we wait
            if monthly_tick(&db, &config, &write_gate, &mut boundary).await {
                sleep(Duration::from_secs(config.schedule.error_backoff_secs)).await;
            }
        }
    });
}

/// One monthly-loop iteration: run the analysis under the write gate if a
/// new month has started. Returns true when the pass failed and the caller
/// should back off; the gate is released either way before returning.
pub(crate) async fn monthly_tick(
    db: &Database,
    config: &Config,
    write_gate: &Mutex<()>,
    boundary: &mut MonthBoundary,
) -> bool {
    if !boundary.should_run(Utc::now()) {
        return false;
    }

    let _guard = write_gate.lock().await;
    let engine = BudgetEngine::new(db, &config.budget);
    match engine.run_monthly_analysis() {
        Ok(summary) => {
            info!(
                "Monthly analysis done: ₹{:.2}/month across {} goals, {} categories",
                summary.total_savings,
                summary.allocations.len(),
                summary.categories
            );
            false
        }
        Err(e) => {
            error!("Monthly analysis failed: {}", e);
            true
        }
    }
}

/// The ingestion loop; runs in the foreground until interrupted
async fn ingestion_loop(db: Database, config: Config, write_gate: Arc<Mutex<()>>) -> Result<()> {
    let mut classifier = load_classifier(&db)?;
    let mut dedup = DedupTracker::initialize(&db)?;
    let mut detector = ChangeDetector::new(0, 0);

    let resolver = StdinResolver;
    info!(
        "Ingestion: polling every {} seconds ({} ids already processed)",
        config.schedule.poll_interval_secs,
        dedup.len()
    );

    let mut ticker = interval(Duration::from_secs(config.schedule.poll_interval_secs));

    loop {
        ticker.tick().await;

        let pass = {
            let _guard = write_gate.lock().await;
            ingestion_pass(
                &db,
                &config,
                &resolver,
                &mut classifier,
                &mut dedup,
                &mut detector,
            )
        };

        if let Err(e) = pass {
            error!("Ingestion pass failed: {}", e);
            sleep(Duration::from_secs(config.schedule.error_backoff_secs)).await;
        }
    }
}

/// One gated pass: check counts, run the pipeline if anything moved, then
/// refresh the derived views
fn ingestion_pass(
    db: &Database,
    config: &Config,
    resolver: &dyn CategoryResolver,
    classifier: &mut sift_core::CategoryClassifier,
    dedup: &mut DedupTracker,
    detector: &mut ChangeDetector,
) -> sift_core::Result<()> {
    let raw = db.count_raw_messages()?;
    let manual = db.count_manual_entries()?;
    if !detector.check(raw, manual) {
        return Ok(());
    }

    let pipeline = IngestionPipeline::new(db, &config.pipeline, resolver);
    let outcome = pipeline.process_new_data(classifier, dedup)?;
    if outcome.saw_new_data() {
        aggregate::recompute(db, &config.aggregation)?;
        let summary = BudgetEngine::new(db, &config.budget).run_monthly_analysis()?;
        info!(
            "Refreshed budget analysis: ₹{:.2}/month savings potential",
            summary.total_savings
        );
    }
    Ok(())
}
