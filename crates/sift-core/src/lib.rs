//! Sift Core Library
//!
//! Shared functionality for the Sift expense pipeline:
//! - Database access and migrations
//! - Extraction of structured facts from notification text
//! - Trainable category classifier with a versioned persisted artifact
//! - Processed-id tracking for exactly-once effective ingestion
//! - Category aggregation and budget/goal-allocation analysis
//! - Clock-free schedule triggers for the orchestrator loops

pub mod aggregate;
pub mod budget;
pub mod classifier;
pub mod config;
pub mod db;
pub mod dedup;
pub mod error;
pub mod extract;
pub mod models;
pub mod pipeline;
pub mod trigger;

pub use classifier::{ArtifactStore, CategoryClassifier, CREDIT_CATEGORY, FALLBACK_CATEGORY};
pub use config::{AggregationConfig, BudgetConfig, Config, PipelineConfig, ScheduleConfig};
pub use db::Database;
pub use dedup::DedupTracker;
pub use error::{Error, Result};
pub use pipeline::{CategoryResolver, DeclineResolver, IngestionPipeline, ProcessOutcome};
pub use trigger::{ChangeDetector, MonthBoundary};

pub use budget::{BudgetEngine, BudgetSummary};
