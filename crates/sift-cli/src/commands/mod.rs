//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (open_db, path/config resolution) plus
//!   init, process and seed-demo
//! - `run` - The long-running orchestrator loops
//! - `status` - Status display and the one-shot monthly analysis
//! - `training` - Classifier commands (classify, train)

pub mod core;
pub mod run;
pub mod status;
pub mod training;

// Re-export command functions for main.rs
pub use core::*;
pub use run::*;
pub use status::*;
pub use training::*;

/// Truncate a string to a maximum length in characters, adding "..." if
/// truncated. Counts chars, not bytes, so multi-byte input never splits.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
