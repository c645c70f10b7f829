//! Chat history logging
//!
//! Persistence side-effect written by callers after a pipeline run; the
//! pipeline itself never touches these tables.

use super::Database;
use crate::error::Result;
use chrono::Utc;
use rusqlite::params;

/// One logged chat exchange
#[derive(Debug, Clone, serde::Serialize)]
pub struct ChatLogEntry {
    pub session_id: Option<String>,
    pub question: String,
    pub answer: String,
    pub mode: String,
    /// JSON-encoded sources list
    pub sources: String,
    /// JSON-encoded extracted keywords
    pub keywords: String,
    pub latency_ms: u64,
}

impl Database {
    /// Append a chat exchange to the log
    pub fn log_chat(&self, entry: &ChatLogEntry) -> Result<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO chat_logs
                (session_id, question, answer, mode, sources, keywords,
                 latency_ms, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                entry.session_id,
                entry.question,
                entry.answer,
                entry.mode,
                entry.sources,
                entry.keywords,
                entry.latency_ms as i64,
                now
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Number of logged exchanges
    pub fn chat_log_count(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM chat_logs", [], |row| row.get(0))?;
        Ok(count)
    }
}
