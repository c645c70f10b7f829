//! LLM trait definitions

use crate::chat::Message;
use crate::error::Result;
use async_trait::async_trait;

/// Embedding generation trait
///
/// Document and query embeddings are distinct task flavors: documents are
/// embedded once at indexing time, queries at search time.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate embedding for a corpus document
    async fn embed_document(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding for a search query
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Get model name
    fn model_name(&self) -> &str;
}

/// Text generation trait
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Generate text for a prompt.
    ///
    /// `system` constrains the model; `history` is the prior conversation,
    /// oldest first; `temperature` 0 is used where determinism matters
    /// (classification, extraction), higher values for conversational tone.
    async fn generate(
        &self,
        prompt: &str,
        system: Option<&str>,
        history: &[Message],
        temperature: f32,
    ) -> Result<String>;

    /// Get model name
    fn model_name(&self) -> &str;
}
