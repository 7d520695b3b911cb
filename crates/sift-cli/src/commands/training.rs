//! Classifier commands (classify, train)

use std::path::Path;

use anyhow::{Context, Result};
use sift_core::classifier::corpus::load_csv_corpus;
use sift_core::extract;

use super::core::{load_classifier, open_db};

/// Run a single message body through extraction and classification
pub fn cmd_classify(db_path: &Path, text: &str) -> Result<()> {
    let db = open_db(db_path)?;
    let classifier = load_classifier(&db)?;

    let fact = extract::extract(text);
    let category = classifier.classify(text, fact.direction);

    println!("Amount:      {}", fact.amount);
    println!("Counterpart: {}", fact.counterpart);
    println!("Direction:   {}", fact.direction);
    println!("Category:    {}", category);

    Ok(())
}

/// Retrain from a labeled CSV corpus and persist the new artifact
pub fn cmd_train(db_path: &Path, corpus_path: &Path) -> Result<()> {
    let db = open_db(db_path)?;
    let mut classifier = load_classifier(&db)?;

    let corpus = load_csv_corpus(corpus_path)
        .with_context(|| format!("Failed to load corpus from {}", corpus_path.display()))?;
    println!("Loaded {} labeled examples", corpus.len());

    classifier.retrain(corpus).context("Training failed")?;

    let model = classifier
        .model()
        .context("Training produced no model")?;
    println!(
        "Trained on {} categories ({} vocabulary terms)",
        model.labels().len(),
        model.vocab_size()
    );
    println!("Categories: {}", model.labels().join(", "));

    Ok(())
}
