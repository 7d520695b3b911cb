//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI
//! arguments. The actual command implementations are in the `commands`
//! module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Sift - turn transaction notifications into a budget plan
#[derive(Parser)]
#[command(name = "sift")]
#[command(about = "SMS expense pipeline and budget planner", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path (defaults to the platform data directory)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// TOML config file overriding the built-in defaults
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Run the orchestrator (ingestion + monthly analysis loops)
    Run,

    /// Run a single ingestion and aggregation pass
    Process,

    /// Run a single monthly budget analysis
    Analyze,

    /// Classify a message body (debugging aid)
    Classify {
        /// Message text to classify
        text: String,
    },

    /// Retrain the classifier from a labeled CSV corpus
    Train {
        /// CSV file with Body and Category columns
        #[arg(long)]
        corpus: PathBuf,
    },

    /// Show record counts and classifier state
    Status,

    /// Insert demo messages, entries and goals for a quick tour
    SeedDemo,
}
