//! Retrieval module
//!
//! Provides:
//! - Keyword search over the corpus (exact/substring, accumulating hit scores)
//! - Vector similarity search over stored embeddings
//! - Score-based merging of the two candidate streams

mod merge;

pub use merge::RetrievalMerger;

use crate::error::Result;

/// A corpus document surfaced during retrieval.
///
/// Exactly one of `keyword_score` / `vector_score` is populated at creation.
/// `keyword_score` is unbounded (accumulates +2 per title hit, +1 per body
/// hit across keywords); `vector_score` is a cosine similarity in [0,1].
#[derive(Debug, Clone)]
pub struct Candidate {
    pub id: i64,
    pub title: String,
    pub question_text: Option<String>,
    pub answer: String,
    pub category: Option<String>,
    pub url: String,
    pub keyword_score: Option<f64>,
    pub vector_score: Option<f64>,
}

impl Candidate {
    /// Which index produced this candidate
    pub fn origin(&self) -> SearchSource {
        if self.keyword_score.is_some() {
            SearchSource::Keyword
        } else {
            SearchSource::Vector
        }
    }
}

/// Candidate plus its merged ranking score.
///
/// The composite score is a heuristic normalization used only for final
/// ordering and truncation, not a probability.
#[derive(Debug, Clone)]
pub struct RankedCandidate {
    pub candidate: Candidate,
    pub composite_score: f64,
}

impl RankedCandidate {
    pub fn new(candidate: Candidate, vector_weight: f64) -> Self {
        let composite_score = candidate.keyword_score.unwrap_or(0.0)
            + candidate.vector_score.unwrap_or(0.0) * vector_weight;
        Self {
            candidate,
            composite_score,
        }
    }
}

/// Source of a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchSource {
    Keyword,
    Vector,
}

/// Exact/substring text search over the corpus
pub trait KeywordIndex: Send + Sync {
    /// Search for documents matching any of the keywords.
    ///
    /// Results carry `keyword_score` and are ordered by score desc, then
    /// view count desc, then id desc.
    fn keyword_search(&self, keywords: &[String], limit: usize) -> Result<Vec<Candidate>>;
}

/// Nearest-neighbor search over document embeddings
pub trait VectorIndex: Send + Sync {
    /// Search for documents nearest to the query vector.
    ///
    /// Results carry `vector_score` (cosine similarity clamped to [0,1])
    /// and are ordered by similarity desc.
    fn vector_search(&self, vector: &[f32], limit: usize) -> Result<Vec<Candidate>>;
}
