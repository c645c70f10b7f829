//! Corpus and embedding coverage

use crate::app::OutputFormat;
use crate::output;
use anyhow::Result;
use savollar_core::Database;

pub async fn run(db: &Database, format: OutputFormat) -> Result<()> {
    let stats = db.corpus_stats()?;
    let chat_logs = db.chat_log_count()?;
    output::print_stats(&stats, chat_logs, format)?;
    Ok(())
}
