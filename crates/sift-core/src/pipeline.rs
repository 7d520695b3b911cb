//! Ingestion pipeline
//!
//! Drains pending raw messages and manual entries: keyword-gates each
//! message, extracts and classifies it, escalates high-value unclassified
//! transactions for human review, and persists the result with
//! insert-if-absent semantics. Every candidate is marked processed exactly
//! once, whether or not it produced a stored transaction.

use tracing::{debug, info, warn};

use crate::classifier::{CategoryClassifier, FALLBACK_CATEGORY};
use crate::config::PipelineConfig;
use crate::db::Database;
use crate::dedup::DedupTracker;
use crate::error::Result;
use crate::extract;
use crate::models::{CategorizedTransaction, RawMessage, Transaction};

/// Human-in-the-loop boundary for high-value unclassified transactions.
///
/// `resolve` returns a replacement category, or `None` to keep the
/// fallback. A timeout or non-response must be treated as a decline.
pub trait CategoryResolver {
    fn resolve(&self, body: &str, amount: f64) -> Option<String>;
}

/// Resolver that declines every override (headless operation)
pub struct DeclineResolver;

impl CategoryResolver for DeclineResolver {
    fn resolve(&self, _body: &str, _amount: f64) -> Option<String> {
        None
    }
}

/// What one ingestion pass saw and did
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessOutcome {
    /// Manual entries newly marked processed
    pub new_manual: usize,
    /// Raw messages newly marked processed
    pub new_messages: usize,
    /// Messages that passed the gate and were persisted as transactions
    pub stored: usize,
}

impl ProcessOutcome {
    /// Whether anything new was seen (aggregation should re-run)
    pub fn saw_new_data(&self) -> bool {
        self.new_manual > 0 || self.new_messages > 0
    }
}

/// The ingestion pipeline; stateless apart from its collaborators
pub struct IngestionPipeline<'a> {
    db: &'a Database,
    config: &'a PipelineConfig,
    resolver: &'a dyn CategoryResolver,
}

impl<'a> IngestionPipeline<'a> {
    pub fn new(
        db: &'a Database,
        config: &'a PipelineConfig,
        resolver: &'a dyn CategoryResolver,
    ) -> Self {
        Self {
            db,
            config,
            resolver,
        }
    }

    /// Process everything not yet marked in the dedup tracker
    pub fn process_new_data(
        &self,
        classifier: &mut CategoryClassifier,
        dedup: &mut DedupTracker,
    ) -> Result<ProcessOutcome> {
        let mut outcome = ProcessOutcome::default();

        // Manual entries carry their own category and amount; nothing to
        // extract or classify, they just become visible to aggregation
        let manual_ids = self.db.list_manual_entry_ids()?;
        let pending_manual = dedup.pending(manual_ids.iter().map(String::as_str));
        for id in &pending_manual {
            dedup.mark(id);
        }
        outcome.new_manual = pending_manual.len();
        if outcome.new_manual > 0 {
            info!("Processing {} new manual entries", outcome.new_manual);
        }

        let messages = self.db.list_raw_messages()?;
        let pending: Vec<&RawMessage> = messages
            .iter()
            .filter(|m| !dedup.is_processed(&m.id))
            .collect();
        if !pending.is_empty() {
            info!("Processing {} new messages", pending.len());
        }

        for msg in pending {
            if self.process_message(msg, classifier)? {
                outcome.stored += 1;
            }
            // Processed exactly once regardless of the gate or insert outcome
            dedup.mark(&msg.id);
            outcome.new_messages += 1;
        }

        Ok(outcome)
    }

    /// Run one message through gate -> extract -> classify -> persist.
    ///
    /// Returns true iff a transaction was stored.
    fn process_message(
        &self,
        msg: &RawMessage,
        classifier: &mut CategoryClassifier,
    ) -> Result<bool> {
        if !self.is_transactional(&msg.body) {
            debug!("Skipping non-transactional message {}", msg.id);
            return Ok(false);
        }

        let fact = extract::extract(&msg.body);
        let amount = fact.amount_value();
        let mut category = classifier.classify(&msg.body, fact.direction);

        // High-value transactions that fell through to the fallback bucket
        // are worth a human look; an accepted override also becomes a
        // training example
        if category == FALLBACK_CATEGORY && amount > self.config.review_threshold {
            info!(
                "High-value unclassified transaction {} ({:.2}), requesting review",
                msg.id, amount
            );
            if let Some(corrected) = self.resolver.resolve(&msg.body, amount) {
                category = corrected.clone();
                if let Err(e) = classifier.learn(self.db, &msg.body, &corrected) {
                    warn!("Failed to update training data: {}", e);
                }
            }
        }

        let tx = Transaction {
            id: msg.id.clone(),
            date: msg.received_at.clone(),
            sender: msg.sender.clone(),
            amount,
            counterpart: fact.counterpart.clone(),
            direction: fact.direction,
            body: msg.body.clone(),
        };
        self.db.insert_transaction(&tx)?;

        let verified = category != FALLBACK_CATEGORY;
        let categorized = CategorizedTransaction {
            id: tx.id,
            date: tx.date,
            sender: tx.sender,
            amount: tx.amount,
            counterpart: tx.counterpart,
            direction: tx.direction,
            body: tx.body,
            category: category.clone(),
            verified,
        };
        self.db.insert_categorized(&categorized)?;

        info!(
            "Processed {}: {} {} to {} ({})",
            msg.id, fact.direction, fact.amount, fact.counterpart, category
        );
        Ok(true)
    }

    /// Transaction-indicator keywords gate messages in; promotional
    /// keywords gate them out, and the promotional check wins
    fn is_transactional(&self, body: &str) -> bool {
        let lower = body.to_lowercase();
        let is_transaction = self
            .config
            .transaction_keywords
            .iter()
            .any(|kw| lower.contains(kw.as_str()));
        let is_promotional = self
            .config
            .promotional_keywords
            .iter()
            .any(|kw| lower.contains(kw.as_str()));
        is_transaction && !is_promotional
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{corpus, ArtifactStore, CREDIT_CATEGORY};
    use crate::config::Config;
    use crate::models::{Direction, ManualEntry};

    struct ScriptedResolver {
        category: Option<String>,
    }

    impl CategoryResolver for ScriptedResolver {
        fn resolve(&self, _body: &str, _amount: f64) -> Option<String> {
            self.category.clone()
        }
    }

    struct Fixture {
        db: Database,
        config: Config,
        classifier: CategoryClassifier,
        dedup: DedupTracker,
        _dir: tempfile::TempDir,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::in_memory().unwrap();
        let store = ArtifactStore::new(dir.path().join("classifier.json"));
        let mut classifier = CategoryClassifier::new(store);
        classifier.retrain(corpus::default_corpus()).unwrap();
        Fixture {
            db,
            config: Config::default(),
            classifier,
            dedup: DedupTracker::new(),
            _dir: dir,
        }
    }

    fn message(id: &str, body: &str) -> RawMessage {
        RawMessage {
            id: id.to_string(),
            body: body.to_string(),
            sender: "VM-HDFCBK".to_string(),
            received_at: "2024-03-14 09:30:00".to_string(),
        }
    }

    #[test]
    fn end_to_end_debit_is_stored_verified() {
        let mut f = fixture();
        f.db.insert_raw_message(&message(
            "sms-1",
            "INR 2500 debited for shopping, sent to Amazon",
        ))
        .unwrap();

        let pipeline = IngestionPipeline::new(&f.db, &f.config.pipeline, &DeclineResolver);
        let outcome = pipeline
            .process_new_data(&mut f.classifier, &mut f.dedup)
            .unwrap();

        assert_eq!(outcome.new_messages, 1);
        assert_eq!(outcome.stored, 1);

        let stored = f.db.get_categorized("sms-1").unwrap().unwrap();
        assert_eq!(stored.amount, 2500.0);
        assert_eq!(stored.counterpart, "Amazon");
        assert_eq!(stored.direction, Direction::Debit);
        assert_ne!(stored.category, FALLBACK_CATEGORY);
        assert!(stored.verified);
    }

    #[test]
    fn double_run_is_idempotent() {
        let mut f = fixture();
        f.db.insert_raw_message(&message("sms-1", "Rs. 450 debited, sent to Swiggy"))
            .unwrap();

        let pipeline = IngestionPipeline::new(&f.db, &f.config.pipeline, &DeclineResolver);
        pipeline
            .process_new_data(&mut f.classifier, &mut f.dedup)
            .unwrap();
        let before = f.db.get_categorized("sms-1").unwrap().unwrap();

        // Second pass over the unchanged input set: nothing new
        let outcome = pipeline
            .process_new_data(&mut f.classifier, &mut f.dedup)
            .unwrap();
        assert_eq!(outcome.new_messages, 0);
        assert_eq!(outcome.stored, 0);
        assert_eq!(f.db.count_transactions().unwrap(), 1);
        let after = f.db.get_categorized("sms-1").unwrap().unwrap();
        assert_eq!(after.amount, before.amount);
        assert_eq!(after.category, before.category);

        // Even a fresh tracker cannot double-insert past the db backstop
        let mut fresh = DedupTracker::new();
        pipeline
            .process_new_data(&mut f.classifier, &mut fresh)
            .unwrap();
        assert_eq!(f.db.count_transactions().unwrap(), 1);
    }

    #[test]
    fn promotional_keyword_discards_even_with_transaction_keyword() {
        let mut f = fixture();
        f.db.insert_raw_message(&message(
            "sms-1",
            "Rs. 500 debited? No! Special offer, click here for cashback",
        ))
        .unwrap();

        let pipeline = IngestionPipeline::new(&f.db, &f.config.pipeline, &DeclineResolver);
        let outcome = pipeline
            .process_new_data(&mut f.classifier, &mut f.dedup)
            .unwrap();

        // Marked processed, but no transaction stored
        assert_eq!(outcome.new_messages, 1);
        assert_eq!(outcome.stored, 0);
        assert!(f.dedup.is_processed("sms-1"));
        assert_eq!(f.db.count_transactions().unwrap(), 0);
    }

    #[test]
    fn non_transactional_message_is_marked_but_not_stored() {
        let mut f = fixture();
        f.db.insert_raw_message(&message("sms-1", "Your OTP is 482910"))
            .unwrap();

        let pipeline = IngestionPipeline::new(&f.db, &f.config.pipeline, &DeclineResolver);
        let outcome = pipeline
            .process_new_data(&mut f.classifier, &mut f.dedup)
            .unwrap();

        assert_eq!(outcome.stored, 0);
        assert!(f.dedup.is_processed("sms-1"));
    }

    #[test]
    fn manual_entries_are_marked_without_extraction() {
        let mut f = fixture();
        f.db.insert_manual_entry(&ManualEntry {
            id: "man-1".to_string(),
            category: "Food & Dining".to_string(),
            amount: 320.0,
        })
        .unwrap();

        let pipeline = IngestionPipeline::new(&f.db, &f.config.pipeline, &DeclineResolver);
        let outcome = pipeline
            .process_new_data(&mut f.classifier, &mut f.dedup)
            .unwrap();

        assert_eq!(outcome.new_manual, 1);
        assert!(outcome.saw_new_data());
        assert!(f.dedup.is_processed("man-1"));
        // Manual entries never become transactions
        assert_eq!(f.db.count_transactions().unwrap(), 0);
    }

    #[test]
    fn high_value_fallback_escalates_and_learns() {
        let mut f = fixture();
        // Passes the gate via "payment successful" but carries no direction
        // marker, so classification deterministically falls back
        f.db.insert_raw_message(&message(
            "sms-1",
            "INR 9000 payment successful ref qx71zz419",
        ))
        .unwrap();

        let resolver = ScriptedResolver {
            category: Some("Healthcare".to_string()),
        };
        let pipeline = IngestionPipeline::new(&f.db, &f.config.pipeline, &resolver);
        pipeline
            .process_new_data(&mut f.classifier, &mut f.dedup)
            .unwrap();

        let stored = f.db.get_categorized("sms-1").unwrap().unwrap();
        assert_eq!(stored.category, "Healthcare");
        assert!(stored.verified);
        // The override became a training example
        assert_eq!(f.db.count_training_examples().unwrap(), 1);
    }

    #[test]
    fn declined_escalation_keeps_fallback_unverified() {
        let mut f = fixture();
        f.db.insert_raw_message(&message(
            "sms-1",
            "INR 9000 payment successful ref qx71zz419",
        ))
        .unwrap();

        let pipeline = IngestionPipeline::new(&f.db, &f.config.pipeline, &DeclineResolver);
        pipeline
            .process_new_data(&mut f.classifier, &mut f.dedup)
            .unwrap();

        let stored = f.db.get_categorized("sms-1").unwrap().unwrap();
        assert_eq!(stored.category, FALLBACK_CATEGORY);
        assert!(!stored.verified);
        assert_eq!(f.db.count_training_examples().unwrap(), 0);
    }

    #[test]
    fn low_value_fallback_is_not_escalated() {
        let mut f = fixture();
        f.db.insert_raw_message(&message("sms-1", "INR 100 payment successful ref qx71zz419"))
            .unwrap();

        // A resolver that would panic if consulted
        struct PanicResolver;
        impl CategoryResolver for PanicResolver {
            fn resolve(&self, _body: &str, _amount: f64) -> Option<String> {
                panic!("low-value transaction must not escalate");
            }
        }

        let pipeline = IngestionPipeline::new(&f.db, &f.config.pipeline, &PanicResolver);
        pipeline
            .process_new_data(&mut f.classifier, &mut f.dedup)
            .unwrap();

        let stored = f.db.get_categorized("sms-1").unwrap().unwrap();
        assert_eq!(stored.category, FALLBACK_CATEGORY);
    }

    #[test]
    fn credit_is_stored_under_the_transfer_bucket() {
        let mut f = fixture();
        f.db.insert_raw_message(&message(
            "sms-1",
            "INR 10000 credited to your account salary",
        ))
        .unwrap();

        let pipeline = IngestionPipeline::new(&f.db, &f.config.pipeline, &DeclineResolver);
        pipeline
            .process_new_data(&mut f.classifier, &mut f.dedup)
            .unwrap();

        let stored = f.db.get_categorized("sms-1").unwrap().unwrap();
        assert_eq!(stored.category, CREDIT_CATEGORY);
        assert_eq!(stored.direction, Direction::Credit);
    }
}
