//! Chat orchestration
//!
//! Single entry point sequencing classification, retrieval, and answer
//! composition. The pipeline is stateless and request-scoped; collaborators
//! are injected and owned by the caller.

mod compose;
mod intent;

pub use compose::AnswerComposer;
pub use intent::{QueryIntent, QueryUnderstanding};

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::config::RetrievalConfig;
use crate::error::{Result, SavollarError};
use crate::llm::{Embedder, GenerativeModel};
use crate::search::{KeywordIndex, RetrievalMerger, VectorIndex};

/// Message author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One conversation turn. Immutable once created; an ordered sequence,
/// oldest first, forms the conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// How the final answer was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerMode {
    /// Grounded in corpus documents
    Database,
    /// Model knowledge, no grounding; always carries a disclaimer
    GenerativeKnowledge,
    /// Greeting / small talk
    Conversational,
}

impl AnswerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Database => "database",
            Self::GenerativeKnowledge => "generative_knowledge",
            Self::Conversational => "conversational",
        }
    }
}

/// A cited corpus document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    pub id: i64,
    pub title: String,
    pub relevance: f64,
}

/// Terminal artifact of the pipeline.
///
/// Invariants: `sources` is non-empty iff `mode == Database`; `disclaimer`
/// is present iff `mode == GenerativeKnowledge`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResult {
    pub answer_text: String,
    pub sources: Vec<Source>,
    pub mode: AnswerMode,
    pub disclaimer: Option<String>,
}

/// Pipeline run with the extra fields an external logger records
#[derive(Debug, Clone)]
pub struct ChatTrace {
    pub result: AnswerResult,
    pub extracted_keywords: Vec<String>,
    pub latency_ms: u64,
}

/// Sequences classification, retrieval, and composition for one message
pub struct ChatOrchestrator {
    understanding: QueryUnderstanding,
    retriever: RetrievalMerger,
    composer: AnswerComposer,
}

impl ChatOrchestrator {
    pub fn new(
        model: Arc<dyn GenerativeModel>,
        embedder: Arc<dyn Embedder>,
        keyword_index: Arc<dyn KeywordIndex>,
        vector_index: Arc<dyn VectorIndex>,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            understanding: QueryUnderstanding::new(model.clone()),
            retriever: RetrievalMerger::new(keyword_index, vector_index, embedder, config.clone()),
            composer: AnswerComposer::new(model, &config),
        }
    }

    /// Process one chat message and return the final answer
    pub async fn chat(&self, message: &str, history: &[Message]) -> Result<AnswerResult> {
        Ok(self.chat_with_trace(message, history).await?.result)
    }

    /// Like [`chat`](Self::chat) but also returns the extracted keywords and
    /// latency for the persistence hook.
    pub async fn chat_with_trace(&self, message: &str, history: &[Message]) -> Result<ChatTrace> {
        let start = Instant::now();
        let message = message.trim();
        if message.is_empty() {
            return Err(SavollarError::InvalidInput("empty message".to_string()));
        }

        let needs_retrieval = self.understanding.classify(message).await?;
        let has_history = !history.is_empty();

        if !needs_retrieval && !has_history {
            // Pure greeting / small talk
            let result = self.composer.conversational(message).await?;
            return Ok(trace(result, Vec::new(), start));
        }

        if !needs_retrieval && has_history {
            // Follow-up ("shorten that", "rahmat") still needs the model
            // with history context but bypasses retrieval entirely.
            let result = self.composer.fallback(message, history).await?;
            return Ok(trace(result, Vec::new(), start));
        }

        let intent = self.understanding.extract_keywords(message).await?;
        let keywords = intent.all_keywords();

        let candidates = self.retriever.retrieve(&intent).await?;
        tracing::debug!(count = candidates.len(), "retrieval complete");

        let result = if candidates.is_empty() {
            self.composer.fallback(message, history).await?
        } else {
            self.composer.grounded(message, &candidates, history).await?
        };

        Ok(trace(result, keywords, start))
    }

    /// Bound a whole request with a timeout. On expiry the pipeline aborts
    /// and surfaces a timeout error; partial results are never returned.
    pub async fn chat_with_timeout(
        &self,
        message: &str,
        history: &[Message],
        timeout: Duration,
    ) -> Result<AnswerResult> {
        match tokio::time::timeout(timeout, self.chat(message, history)).await {
            Ok(result) => result,
            Err(_) => Err(SavollarError::Timeout(timeout.as_millis() as u64)),
        }
    }
}

fn trace(result: AnswerResult, extracted_keywords: Vec<String>, start: Instant) -> ChatTrace {
    ChatTrace {
        result,
        extracted_keywords,
        latency_ms: start.elapsed().as_millis() as u64,
    }
}
