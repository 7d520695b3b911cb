//! Category classifier service
//!
//! Owns the fitted text model, the persisted artifact, and the policy layer
//! around predictions:
//! - unknown-direction text and an untrained model always get the fallback
//!   category, and classification errors degrade to it rather than propagate
//! - credits are never routed through the learned model; incoming money is
//!   a different domain than spend categorization, and keeping the override
//!   out of the model keeps training data clean

pub mod artifact;
pub mod corpus;
pub mod model;

use tracing::{info, warn};

pub use artifact::ArtifactStore;
pub use model::TextModel;

use crate::db::Database;
use crate::error::Result;
use crate::models::Direction;

/// Category assigned when classification cannot determine a confident label
pub const FALLBACK_CATEGORY: &str = "Miscellaneous";

/// Category assigned to all incoming-money transactions
pub const CREDIT_CATEGORY: &str = "Savings & Transfers";

/// Trainable text-to-category classifier.
///
/// Two states: Untrained (no fitted model, everything falls back) and
/// Trained. `initialize` always ends Trained unless retraining itself
/// fails.
pub struct CategoryClassifier {
    model: Option<TextModel>,
    store: ArtifactStore,
}

impl CategoryClassifier {
    pub fn new(store: ArtifactStore) -> Self {
        Self { model: None, store }
    }

    /// Whether a fitted model is loaded
    pub fn is_trained(&self) -> bool {
        self.model.is_some()
    }

    /// Fitted model, if any (for status display)
    pub fn model(&self) -> Option<&TextModel> {
        self.model.as_ref()
    }

    /// Load the persisted artifact, or train from the default corpus plus
    /// any stored human corrections when no valid artifact exists
    pub fn initialize(&mut self, db: &Database) -> Result<()> {
        match self.store.load() {
            Ok(model) => {
                info!(
                    "Loaded classifier artifact ({} labels, {} tokens)",
                    model.labels().len(),
                    model.vocab_size()
                );
                self.model = Some(model);
                Ok(())
            }
            Err(e) => {
                warn!("No usable classifier artifact ({}), training from default corpus", e);
                self.retrain(self.training_corpus(db)?)
            }
        }
    }

    /// Fit a new model over the given examples and persist it.
    ///
    /// On failure (empty or single-label corpus) the previous trained state
    /// is kept.
    pub fn retrain(&mut self, examples: Vec<(String, String)>) -> Result<()> {
        let model = TextModel::fit(&examples)?;
        self.store.save(&model)?;
        info!(
            "Retrained classifier on {} examples ({} labels)",
            examples.len(),
            model.labels().len()
        );
        self.model = Some(model);
        Ok(())
    }

    /// Record a human-corrected label and retrain on the full corpus
    pub fn learn(&mut self, db: &Database, body: &str, category: &str) -> Result<()> {
        db.append_training_example(body, category)?;
        self.retrain(self.training_corpus(db)?)
    }

    /// Default corpus plus all stored training examples
    fn training_corpus(&self, db: &Database) -> Result<Vec<(String, String)>> {
        let mut examples = corpus::default_corpus();
        for ex in db.list_training_examples()? {
            examples.push((ex.body, ex.category));
        }
        Ok(examples)
    }

    /// Classify a message body given its transaction direction.
    ///
    /// Never fails: policy overrides and the fallback category absorb every
    /// degenerate case.
    pub fn classify(&self, text: &str, direction: Direction) -> String {
        if direction == Direction::Unknown {
            return FALLBACK_CATEGORY.to_string();
        }
        // Untrained state falls back for every direction; the credit
        // override only applies once a model exists
        let Some(model) = &self.model else {
            return FALLBACK_CATEGORY.to_string();
        };
        if direction == Direction::Credit {
            return CREDIT_CATEGORY.to_string();
        }
        match model.predict(text) {
            Ok(label) => label.to_string(),
            Err(e) => {
                warn!("Classification failed ({}), using fallback", e);
                FALLBACK_CATEGORY.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trained_classifier(dir: &tempfile::TempDir) -> CategoryClassifier {
        let store = ArtifactStore::new(dir.path().join("classifier.json"));
        let mut classifier = CategoryClassifier::new(store);
        classifier.retrain(corpus::default_corpus()).unwrap();
        classifier
    }

    #[test]
    fn unknown_direction_always_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let classifier = trained_classifier(&dir);
        assert_eq!(
            classifier.classify("Rs. 450 at Swiggy restaurant", Direction::Unknown),
            FALLBACK_CATEGORY
        );
    }

    #[test]
    fn credit_override_skips_the_model() {
        let dir = tempfile::tempdir().unwrap();
        let classifier = trained_classifier(&dir);
        // The body screams "shopping" but the credit override wins
        assert_eq!(
            classifier.classify("INR 2500 credited, Amazon shopping refund", Direction::Credit),
            CREDIT_CATEGORY
        );
    }

    #[test]
    fn untrained_state_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("classifier.json"));
        let classifier = CategoryClassifier::new(store);
        assert!(!classifier.is_trained());
        assert_eq!(
            classifier.classify("Rs. 450 debited, sent to Swiggy", Direction::Debit),
            FALLBACK_CATEGORY
        );
    }

    #[test]
    fn untrained_credit_falls_back_too() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("classifier.json"));
        let classifier = CategoryClassifier::new(store);
        // Without a model even incoming money gets the fallback bucket;
        // the credit override is a trained-state policy
        assert_eq!(
            classifier.classify("INR 5000 credited to your account", Direction::Credit),
            FALLBACK_CATEGORY
        );
    }

    #[test]
    fn debit_goes_through_the_model() {
        let dir = tempfile::tempdir().unwrap();
        let classifier = trained_classifier(&dir);
        assert_eq!(
            classifier.classify("INR 2500 debited for shopping, sent to Amazon", Direction::Debit),
            "Shopping"
        );
        assert_eq!(
            classifier.classify("Rs. 450 debited, sent to Swiggy for food order", Direction::Debit),
            "Food & Dining"
        );
    }

    #[test]
    fn gibberish_degrades_to_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let classifier = trained_classifier(&dir);
        assert_eq!(
            classifier.classify("xyzzy plugh qwerty", Direction::Debit),
            FALLBACK_CATEGORY
        );
    }

    #[test]
    fn initialize_trains_when_no_artifact_exists() {
        let dir = tempfile::tempdir().unwrap();
        let db = crate::db::Database::in_memory().unwrap();
        let store = ArtifactStore::new(dir.path().join("classifier.json"));
        let mut classifier = CategoryClassifier::new(store.clone());

        classifier.initialize(&db).unwrap();
        assert!(classifier.is_trained());

        // Second initialize loads the artifact written by the first
        let mut second = CategoryClassifier::new(store);
        second.initialize(&db).unwrap();
        assert!(second.is_trained());
    }

    #[test]
    fn learn_appends_and_retrains() {
        let dir = tempfile::tempdir().unwrap();
        let db = crate::db::Database::in_memory().unwrap();
        let mut classifier = trained_classifier(&dir);

        classifier
            .learn(&db, "Rs. 3000 debited, sent to Apollo pharmacy medicines", "Healthcare")
            .unwrap();

        assert_eq!(db.count_training_examples().unwrap(), 1);
        let labels = classifier.model().unwrap().labels();
        assert!(labels.contains(&"Healthcare".to_string()));
        assert_eq!(
            classifier.classify("pharmacy medicines Apollo", Direction::Debit),
            "Healthcare"
        );
    }
}
