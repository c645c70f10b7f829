//! Database layer for savollar
//!
//! Provides SQLite-based storage with:
//! - The Q&A corpus and its keyword search (exact/substring, scored)
//! - Embedding storage with brute-force cosine search
//! - Chat history logging

mod chat_logs;
mod questions;
mod schema;
pub mod vectors;

pub use chat_logs::ChatLogEntry;
pub use questions::{CorpusStats, QuestionInsert, QuestionRecord};
pub use schema::Database;
pub use vectors::{bytes_to_embedding, cosine_similarity, embedding_to_bytes};

use crate::error::{Result, SavollarError};
use crate::search::{Candidate, KeywordIndex, VectorIndex};
use std::path::PathBuf;
use std::sync::Mutex;

impl Database {
    /// Get the default database path
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::DATA_DIR_NAME)
            .join("corpus.sqlite")
    }
}

// The SQLite connection is Send but not Sync, so `Database` itself cannot
// satisfy the `Send + Sync` bound on the index traits; shared pipeline
// collaborators go through a Mutex delegating to the inherent queries.
// Locks are held only for the duration of one query, never across an
// await point.

impl KeywordIndex for Mutex<Database> {
    fn keyword_search(&self, keywords: &[String], limit: usize) -> Result<Vec<Candidate>> {
        let db = self
            .lock()
            .map_err(|_| SavollarError::Retrieval("database lock poisoned".to_string()))?;
        db.keyword_search(keywords, limit)
    }
}

impl VectorIndex for Mutex<Database> {
    fn vector_search(&self, vector: &[f32], limit: usize) -> Result<Vec<Candidate>> {
        let db = self
            .lock()
            .map_err(|_| SavollarError::Retrieval("database lock poisoned".to_string()))?;
        db.vector_search(vector, limit)
    }
}
