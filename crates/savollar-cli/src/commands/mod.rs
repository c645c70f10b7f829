//! CLI command implementations

pub mod ask;
pub mod chat;
pub mod embed;
pub mod import;
pub mod popular;
pub mod search;
pub mod status;

use anyhow::Result;
use savollar_core::{ChatOrchestrator, Config, Database, HttpLlmClient};
use std::sync::{Arc, Mutex};

/// Wire the pipeline: one shared LLM client (generation + embeddings) and
/// the database behind a mutex serving both indexes.
pub(crate) fn build_orchestrator(
    db: Database,
) -> Result<(ChatOrchestrator, Arc<Mutex<Database>>)> {
    let config = Config::load()?;
    let client = Arc::new(HttpLlmClient::new(config.llm_service.clone())?);
    let db = Arc::new(Mutex::new(db));

    let orchestrator = ChatOrchestrator::new(
        client.clone(),
        client,
        db.clone(),
        db.clone(),
        config.retrieval,
    );
    Ok((orchestrator, db))
}

/// Log one exchange to chat_logs; failures are reported, never fatal.
pub(crate) fn log_exchange(
    db: &Arc<Mutex<Database>>,
    session: Option<&str>,
    question: &str,
    trace: &savollar_core::ChatTrace,
) {
    let entry = savollar_core::db::ChatLogEntry {
        session_id: session.map(String::from),
        question: question.to_string(),
        answer: trace.result.answer_text.clone(),
        mode: trace.result.mode.as_str().to_string(),
        sources: serde_json::to_string(&trace.result.sources).unwrap_or_else(|_| "[]".to_string()),
        keywords: serde_json::to_string(&trace.extracted_keywords)
            .unwrap_or_else(|_| "[]".to_string()),
        latency_ms: trace.latency_ms,
    };

    match db.lock() {
        Ok(db) => {
            if let Err(e) = db.log_chat(&entry) {
                tracing::warn!(error = %e, "failed to log chat exchange");
            }
        }
        Err(_) => tracing::warn!("database lock poisoned, chat exchange not logged"),
    }
}
