//! Savollar CLI
//!
//! RAG-powered question answering over an Uzbek Islamic Q&A corpus.

use anyhow::Result;
use clap::Parser;
use savollar_core::Database;

mod app;
mod commands;
mod output;

use app::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(default_level.into()),
        )
        .init();

    // Open database (use SAVOLLAR_DB env var if set, otherwise use default)
    let db_path = std::env::var("SAVOLLAR_DB")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| Database::default_path());
    let db = Database::open(&db_path)?;
    db.initialize()?;

    match cli.command {
        Commands::Ask(args) => commands::ask::run(args, db, cli.format).await,
        Commands::Chat(args) => commands::chat::run(args, db).await,
        Commands::Search(args) => commands::search::run(args, &db, cli.format).await,
        Commands::Import(args) => commands::import::run(args, &db).await,
        Commands::Embed(args) => commands::embed::run(args, &db_path).await,
        Commands::Popular(args) => commands::popular::run(args, &db, cli.format).await,
        Commands::Status => commands::status::run(&db, cli.format).await,
    }
}
