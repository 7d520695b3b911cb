//! Domain models for Sift

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An inbound notification message as produced by the external source.
///
/// Read-only to the pipeline; rows are written by the SMS bridge (or by
/// `seed-demo` / tests).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMessage {
    pub id: String,
    pub body: String,
    /// Sender address, e.g. "VM-HDFCBK"
    pub sender: String,
    /// Readable timestamp as delivered by the source, e.g. "2024-03-14 09:30:00"
    pub received_at: String,
}

/// A user-entered expense, produced externally with its category already set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualEntry {
    pub id: String,
    pub category: String,
    pub amount: f64,
}

/// Whether money moved in or out of the account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Credit,
    Debit,
    Unknown,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
            Self::Unknown => "unknown",
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "credit" => Ok(Self::Credit),
            "debit" => Ok(Self::Debit),
            "unknown" => Ok(Self::Unknown),
            _ => Err(format!("Unknown direction: {}", s)),
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Transient parse result of a single message body.
///
/// Not persisted directly; folded into a `Transaction` by the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedFact {
    /// Decimal string with thousands separators stripped; "0" if no match
    pub amount: String,
    /// Recipient name; "N/A" if no match
    pub counterpart: String,
    pub direction: Direction,
}

impl ExtractedFact {
    /// Numeric value of the amount string (0.0 if it fails to parse)
    pub fn amount_value(&self) -> f64 {
        self.amount.parse().unwrap_or(0.0)
    }
}

/// Canonical normalized transaction, keyed by the source message id.
///
/// Created once per unique id and never updated (insert-if-absent).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub date: String,
    pub sender: String,
    pub amount: f64,
    pub counterpart: String,
    pub direction: Direction,
    pub body: String,
}

/// Transaction plus its assigned spending category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorizedTransaction {
    pub id: String,
    pub date: String,
    pub sender: String,
    pub amount: f64,
    pub counterpart: String,
    pub direction: Direction,
    pub body: String,
    pub category: String,
    /// False iff the category fell back to the default bucket
    pub verified: bool,
}

/// A human-corrected label, appended when a review overrides a
/// low-confidence classification; feeds retraining
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingExample {
    pub id: i64,
    pub body: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

/// A savings target, externally managed and read-only to the budget engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub name: String,
    pub target_amount: f64,
    pub timeframe_months: i64,
}

impl Goal {
    /// Required monthly contribution to hit the target within the timeframe
    pub fn monthly_target(&self) -> f64 {
        if self.timeframe_months > 0 {
            self.target_amount / self.timeframe_months as f64
        } else {
            0.0
        }
    }
}

/// Aggregated spend for one (renamed) category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

/// Per-category current vs recommended spend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetRecommendation {
    pub category: String,
    pub current: f64,
    pub recommended: f64,
}

/// Fixed slots for the narrative insight records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightSlot {
    Summary,
    Allocated,
    Simulation,
    Recommendations,
}

impl InsightSlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::Allocated => "allocated",
            Self::Simulation => "simulation",
            Self::Recommendations => "recommendations",
        }
    }
}

impl std::str::FromStr for InsightSlot {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "summary" => Ok(Self::Summary),
            "allocated" => Ok(Self::Allocated),
            "simulation" => Ok(Self::Simulation),
            "recommendations" => Ok(Self::Recommendations),
            _ => Err(format!("Unknown insight slot: {}", s)),
        }
    }
}

impl std::fmt::Display for InsightSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Human-readable narrative entry, fully recomputed each monthly run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    pub slot: InsightSlot,
    pub title: String,
    pub body: String,
}
