//! One-shot question

use crate::app::{AskArgs, OutputFormat};
use crate::output;
use anyhow::{anyhow, Result};
use savollar_core::Database;
use std::time::Duration;

pub async fn run(args: AskArgs, db: Database, format: OutputFormat) -> Result<()> {
    let question = args.question.join(" ");
    if question.trim().is_empty() {
        return Err(anyhow!("empty question"));
    }

    let (orchestrator, db) = super::build_orchestrator(db)?;

    let trace = match args.timeout {
        Some(secs) => tokio::time::timeout(
            Duration::from_secs(secs),
            orchestrator.chat_with_trace(&question, &[]),
        )
        .await
        .map_err(|_| anyhow!("request timed out after {}s", secs))??,
        None => orchestrator.chat_with_trace(&question, &[]).await?,
    };

    super::log_exchange(&db, args.session.as_deref(), &question, &trace);
    output::print_answer(&trace.result, format)?;
    Ok(())
}
