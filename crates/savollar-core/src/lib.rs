//! Savollar Core Library
//!
//! Core functionality for savollar, a retrieval-augmented question answering
//! assistant over a corpus of Uzbek Islamic Q&A documents.
//!
//! # Features
//! - Keyword-first search with score-based vector augmentation
//! - Brute-force cosine similarity over SQLite-stored embeddings
//! - LLM-powered message classification and keyword extraction
//! - Grounded answer composition with generative-knowledge fallback
//! - Offline embedding backfill with partitioned parallel workers

pub mod chat;
pub mod config;
pub mod db;
pub mod error;
pub mod index;
pub mod llm;
pub mod search;
pub mod translit;

pub use chat::{AnswerMode, AnswerResult, ChatOrchestrator, ChatTrace, Message, Role, Source};
pub use config::{Config, LlmServiceConfig, RetrievalConfig};
pub use db::Database;
pub use error::{Error, Result, SavollarError};
pub use index::{run_backfill, BackfillOptions, BackfillReport};
pub use llm::{ApiMetricsSnapshot, Embedder, GenerativeModel, HttpLlmClient};
pub use search::{Candidate, KeywordIndex, RankedCandidate, RetrievalMerger, VectorIndex};

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "savollar";

/// Default data directory name
pub const DATA_DIR_NAME: &str = "savollar";
