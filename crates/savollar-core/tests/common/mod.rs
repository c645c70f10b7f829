//! Stub collaborators shared by the pipeline integration tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use savollar_core::chat::Message;
use savollar_core::error::Result;
use savollar_core::llm::{Embedder, GenerativeModel};
use savollar_core::search::{Candidate, KeywordIndex, VectorIndex};

/// Deterministic generative stub routing on prompt shape, counting calls
pub struct StubModel {
    /// Reply to the classification prompt ("SAVOL" or "SUHBAT")
    pub classify_reply: String,
    /// Reply to the keyword extraction prompt (JSON or garbage)
    pub extraction_reply: String,
    /// Reply to grounded composition
    pub grounded_reply: String,
    /// Reply to the knowledge fallback
    pub fallback_reply: String,
    /// Reply to conversational prompts
    pub conversational_reply: String,
    pub grounded_calls: AtomicUsize,
    pub fallback_calls: AtomicUsize,
}

impl StubModel {
    pub fn new(classify_reply: &str, extraction_reply: &str) -> Self {
        Self {
            classify_reply: classify_reply.to_string(),
            extraction_reply: extraction_reply.to_string(),
            grounded_reply: "Namoz besh mahal o'qiladi.".to_string(),
            fallback_reply: "Umumiy javob.".to_string(),
            conversational_reply: "Va alaykum assalom!".to_string(),
            grounded_calls: AtomicUsize::new(0),
            fallback_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_grounded_reply(mut self, reply: &str) -> Self {
        self.grounded_reply = reply.to_string();
        self
    }
}

#[async_trait]
impl GenerativeModel for StubModel {
    async fn generate(
        &self,
        prompt: &str,
        system: Option<&str>,
        _history: &[Message],
        _temperature: f32,
    ) -> Result<String> {
        if let Some(system) = system {
            if system.contains("manbalar asosida") {
                self.grounded_calls.fetch_add(1, Ordering::SeqCst);
                return Ok(self.grounded_reply.clone());
            }
            self.fallback_calls.fetch_add(1, Ordering::SeqCst);
            return Ok(self.fallback_reply.clone());
        }
        if prompt.contains("SAVOL yoki SUHBAT") {
            return Ok(self.classify_reply.clone());
        }
        if prompt.contains("primary_keywords") {
            return Ok(self.extraction_reply.clone());
        }
        Ok(self.conversational_reply.clone())
    }

    fn model_name(&self) -> &str {
        "stub-model"
    }
}

/// Embedder returning a fixed vector, counting calls
pub struct StubEmbedder {
    pub calls: AtomicUsize,
}

impl StubEmbedder {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Embedder for StubEmbedder {
    async fn embed_document(&self, _text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![1.0, 0.0, 0.0])
    }

    async fn embed_query(&self, _text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![1.0, 0.0, 0.0])
    }

    fn dimensions(&self) -> usize {
        3
    }

    fn model_name(&self) -> &str {
        "stub-embedder"
    }
}

/// Keyword index serving a fixed candidate list, counting calls
pub struct StubKeywordIndex {
    pub candidates: Vec<Candidate>,
    pub calls: AtomicUsize,
}

impl StubKeywordIndex {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self {
            candidates,
            calls: AtomicUsize::new(0),
        }
    }
}

impl KeywordIndex for StubKeywordIndex {
    fn keyword_search(&self, _keywords: &[String], limit: usize) -> Result<Vec<Candidate>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.candidates.iter().take(limit).cloned().collect())
    }
}

/// Vector index serving a fixed candidate list, counting calls
pub struct StubVectorIndex {
    pub candidates: Vec<Candidate>,
    pub calls: AtomicUsize,
}

impl StubVectorIndex {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self {
            candidates,
            calls: AtomicUsize::new(0),
        }
    }
}

impl VectorIndex for StubVectorIndex {
    fn vector_search(&self, _vector: &[f32], limit: usize) -> Result<Vec<Candidate>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.candidates.iter().take(limit).cloned().collect())
    }
}

pub fn keyword_candidate(id: i64, score: f64) -> Candidate {
    Candidate {
        id,
        title: format!("Savol {}", id),
        question_text: None,
        answer: format!("Javob {}", id),
        category: None,
        url: format!("https://savollar.islom.uz/s/{}", id),
        keyword_score: Some(score),
        vector_score: None,
    }
}

pub fn vector_candidate(id: i64, score: f64) -> Candidate {
    Candidate {
        id,
        title: format!("Savol {}", id),
        question_text: None,
        answer: format!("Javob {}", id),
        category: None,
        url: format!("https://savollar.islom.uz/s/{}", id),
        keyword_score: None,
        vector_score: Some(score),
    }
}

/// Extraction reply matching what the production prompt requests
pub fn extraction_json() -> String {
    r#"{"primary_keywords": ["намоз", "вақт"], "related_keywords": ["бомдод"], "rewritten_query": "намоз вақтлари"}"#
        .to_string()
}

pub type Stubs = (
    Arc<StubModel>,
    Arc<StubEmbedder>,
    Arc<StubKeywordIndex>,
    Arc<StubVectorIndex>,
);

pub fn stubs(
    model: StubModel,
    keyword_candidates: Vec<Candidate>,
    vector_candidates: Vec<Candidate>,
) -> Stubs {
    (
        Arc::new(model),
        Arc::new(StubEmbedder::new()),
        Arc::new(StubKeywordIndex::new(keyword_candidates)),
        Arc::new(StubVectorIndex::new(vector_candidates)),
    )
}
