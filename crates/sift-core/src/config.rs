//! Configuration for the pipeline, aggregation, and budget constants
//!
//! The review threshold, category reduction factors, keyword lists, and
//! rename table are business constants with no derivation; they live in
//! config rather than code so they can be tuned without a rebuild.
//!
//! ## Configuration Resolution
//!
//! 1. Explicit file passed on the command line (`--config sift.toml`)
//! 2. Embedded defaults (compiled into the binary)
//!
//! Partial override files are fine: any missing key falls back to the
//! embedded default for that key.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/sift.toml");

/// Top-level configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub pipeline: PipelineConfig,
    pub aggregation: AggregationConfig,
    pub budget: BudgetConfig,
    pub schedule: ScheduleConfig,
}

impl Default for Config {
    fn default() -> Self {
        // The embedded file is the single source of truth for defaults.
        // It is parsed through `embedded::Config`, a mirror without
        // `#[serde(default)]`: deserializing the public structs constructs
        // their `Default` values, which would recurse back into this parse.
        let raw: embedded::Config =
            toml::from_str(DEFAULT_CONFIG).expect("embedded default config must parse");
        raw.into()
    }
}

/// Mirror of the config structs without `#[serde(default)]`, used only to
/// parse the complete embedded default file without invoking any `Default`
/// impl (which would recurse into that same parse)
mod embedded {
    use std::collections::HashMap;

    use serde::Deserialize;

    #[derive(Deserialize)]
    pub(super) struct Config {
        pipeline: Pipeline,
        aggregation: Aggregation,
        budget: Budget,
        schedule: Schedule,
    }

    #[derive(Deserialize)]
    struct Pipeline {
        transaction_keywords: Vec<String>,
        promotional_keywords: Vec<String>,
        review_threshold: f64,
    }

    #[derive(Deserialize)]
    struct Aggregation {
        rename: HashMap<String, String>,
    }

    #[derive(Deserialize)]
    struct Budget {
        excluded_categories: Vec<String>,
        transfer_category: String,
        reduction_factors: HashMap<String, f64>,
    }

    #[derive(Deserialize)]
    struct Schedule {
        poll_interval_secs: u64,
        monthly_check_interval_secs: u64,
        error_backoff_secs: u64,
    }

    impl From<Config> for super::Config {
        fn from(raw: Config) -> Self {
            Self {
                pipeline: super::PipelineConfig {
                    transaction_keywords: raw.pipeline.transaction_keywords,
                    promotional_keywords: raw.pipeline.promotional_keywords,
                    review_threshold: raw.pipeline.review_threshold,
                },
                aggregation: super::AggregationConfig {
                    rename: raw.aggregation.rename,
                },
                budget: super::BudgetConfig {
                    excluded_categories: raw.budget.excluded_categories,
                    transfer_category: raw.budget.transfer_category,
                    reduction_factors: raw.budget.reduction_factors,
                },
                schedule: super::ScheduleConfig {
                    poll_interval_secs: raw.schedule.poll_interval_secs,
                    monthly_check_interval_secs: raw.schedule.monthly_check_interval_secs,
                    error_backoff_secs: raw.schedule.error_backoff_secs,
                },
            }
        }
    }
}

impl Config {
    /// Load config from a TOML file, falling back to embedded defaults for
    /// any missing section or key
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load from an optional path; `None` means embedded defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}

/// Ingestion pipeline constants
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// A message is transactional only if it contains one of these
    pub transaction_keywords: Vec<String>,
    /// A match here discards the message even if a transaction keyword hit
    pub promotional_keywords: Vec<String>,
    /// Unclassified transactions above this amount go to human review
    pub review_threshold: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Config::default().pipeline
    }
}

/// Aggregation rename table
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Source category -> display category; absent categories are excluded
    pub rename: HashMap<String, String>,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Config::default().aggregation
    }
}

/// Budget engine constants
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BudgetConfig {
    /// Never reduced, never counted toward savings potential
    pub excluded_categories: Vec<String>,
    /// Incoming-money bucket, excluded from budgeting math
    pub transfer_category: String,
    /// Recommended ceiling = historical spend * factor (unlisted = 1.0)
    pub reduction_factors: HashMap<String, f64>,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Config::default().budget
    }
}

impl BudgetConfig {
    pub fn is_excluded(&self, category: &str) -> bool {
        self.excluded_categories.iter().any(|c| c == category)
    }

    pub fn factor_for(&self, category: &str) -> f64 {
        self.reduction_factors.get(category).copied().unwrap_or(1.0)
    }
}

/// Polling cadence for the orchestrator loops
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub poll_interval_secs: u64,
    pub monthly_check_interval_secs: u64,
    pub error_backoff_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Config::default().schedule
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_defaults_parse() {
        let config = Config::default();
        assert_eq!(config.pipeline.review_threshold, 2000.0);
        assert_eq!(config.schedule.poll_interval_secs, 5);
        assert!(config
            .pipeline
            .transaction_keywords
            .contains(&"debited".to_string()));
    }

    #[test]
    fn rename_table_maps_verbose_labels() {
        let config = Config::default();
        assert_eq!(
            config.aggregation.rename.get("Food & Dining"),
            Some(&"Food".to_string())
        );
        assert!(!config.aggregation.rename.contains_key("Healthcare"));
    }

    #[test]
    fn unlisted_category_is_unconstrained() {
        let budget = BudgetConfig::default();
        assert_eq!(budget.factor_for("Shopping"), 0.8);
        assert_eq!(budget.factor_for("Something Else"), 1.0);
        assert!(budget.is_excluded("Healthcare"));
        assert!(!budget.is_excluded("Shopping"));
    }

    #[test]
    fn partial_override_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sift.toml");
        std::fs::write(&path, "[pipeline]\nreview_threshold = 5000.0\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.pipeline.review_threshold, 5000.0);
        // Untouched sections fall back to embedded defaults
        assert_eq!(config.schedule.poll_interval_secs, 5);
        assert!(!config.budget.excluded_categories.is_empty());
    }
}
