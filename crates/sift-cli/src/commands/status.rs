//! Status and analysis commands

use std::path::Path;

use anyhow::Result;
use sift_core::{budget::BudgetEngine, ArtifactStore};

use super::core::{load_config, open_db};
use super::truncate;

pub fn cmd_status(db_path: &Path) -> Result<()> {
    let db = open_db(db_path)?;

    println!("Database: {}", db.path());
    println!("  Raw messages:      {}", db.count_raw_messages()?);
    println!("  Manual entries:    {}", db.count_manual_entries()?);
    println!("  Transactions:      {}", db.count_transactions()?);
    println!("  Training examples: {}", db.count_training_examples()?);
    println!("  Goals:             {}", db.list_goals()?.len());

    let store = ArtifactStore::new(ArtifactStore::default_path());
    println!();
    println!("Classifier artifact: {}", store.path().display());
    match store.load() {
        Ok(model) => {
            println!(
                "  Trained on {} categories, {} vocabulary terms",
                model.labels().len(),
                model.vocab_size()
            );
            println!("  Categories: {}", model.labels().join(", "));
        }
        Err(e) => {
            println!("  Not loadable ({}); next run will retrain", e);
        }
    }

    Ok(())
}

pub fn cmd_analyze(db_path: &Path, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let db = open_db(db_path)?;

    let engine = BudgetEngine::new(&db, &config.budget);
    let summary = engine.run_monthly_analysis()?;

    println!("Monthly analysis");
    println!("  Savings potential: ₹{:.2}/month", summary.total_savings);
    println!("  Categories with recommendations: {}", summary.categories);

    if !summary.allocations.is_empty() {
        println!();
        println!("Allocations:");
        for (goal, amount) in &summary.allocations {
            println!("  {:<20} ₹{:.2}/month", goal, amount);
        }
    }

    let recs = db.list_recommendations()?;
    if !recs.is_empty() {
        println!();
        println!("Recommended budgets:");
        for rec in &recs {
            println!(
                "  {:<20} current ₹{:.2} -> recommended ₹{:.2}",
                truncate(&rec.category, 20),
                rec.current,
                rec.recommended
            );
        }
    }

    println!();
    for insight in db.list_insights()? {
        println!("{}", insight.title);
        for line in insight.body.lines() {
            println!("  {}", line);
        }
        println!();
    }

    Ok(())
}
