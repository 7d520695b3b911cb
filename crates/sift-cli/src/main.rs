//! Sift CLI - SMS expense pipeline and budget planner
//!
//! Usage:
//!   sift init                 Initialize database
//!   sift seed-demo            Insert demo messages and goals
//!   sift run                  Start the orchestrator loops
//!   sift analyze              Run a monthly budget analysis

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;
use commands::resolve_db_path;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let db_path = resolve_db_path(cli.db.as_deref());
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Init => commands::cmd_init(&db_path),
        Commands::Run => commands::cmd_run(&db_path, config_path).await,
        Commands::Process => commands::cmd_process(&db_path, config_path),
        Commands::Analyze => commands::cmd_analyze(&db_path, config_path),
        Commands::Classify { text } => commands::cmd_classify(&db_path, &text),
        Commands::Train { corpus } => commands::cmd_train(&db_path, &corpus),
        Commands::Status => commands::cmd_status(&db_path),
        Commands::SeedDemo => commands::cmd_seed_demo(&db_path),
    }
}
