//! Keyword-first retrieval with vector augmentation
//!
//! Exact-term matching is cheap and highly precise for the corpus's domain
//! terminology, so keyword search always runs first; the embedding search is
//! a recall backstop triggered only when keyword coverage is thin.

use std::collections::HashSet;
use std::sync::Arc;

use crate::chat::QueryIntent;
use crate::config::RetrievalConfig;
use crate::error::Result;
use crate::llm::Embedder;
use crate::translit;

use super::{Candidate, KeywordIndex, RankedCandidate, VectorIndex};

/// Runs keyword search, conditionally augments with vector search, and
/// produces a unified ranked candidate list.
pub struct RetrievalMerger {
    keyword_index: Arc<dyn KeywordIndex>,
    vector_index: Arc<dyn VectorIndex>,
    embedder: Arc<dyn Embedder>,
    config: RetrievalConfig,
}

impl RetrievalMerger {
    pub fn new(
        keyword_index: Arc<dyn KeywordIndex>,
        vector_index: Arc<dyn VectorIndex>,
        embedder: Arc<dyn Embedder>,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            keyword_index,
            vector_index,
            embedder,
            config,
        }
    }

    /// Retrieve at most `top_k` ranked candidates for the intent.
    ///
    /// An empty list is a valid, expected outcome (no sources), not an error.
    pub async fn retrieve(&self, intent: &QueryIntent) -> Result<Vec<RankedCandidate>> {
        let keywords = search_keywords(intent);

        let mut candidates = if keywords.is_empty() {
            Vec::new()
        } else {
            self.keyword_index
                .keyword_search(&keywords, self.config.keyword_limit)?
        };

        tracing::debug!(count = candidates.len(), "keyword search complete");

        if candidates.len() < self.config.min_keyword_results {
            tracing::debug!(
                query = %intent.canonical_query,
                "keyword coverage thin, augmenting with vector search"
            );
            let vector = self.embedder.embed_query(&intent.canonical_query).await?;
            let vector_results = self
                .vector_index
                .vector_search(&vector, self.config.vector_limit)?;

            let seen: HashSet<i64> = candidates.iter().map(|c| c.id).collect();
            for candidate in vector_results {
                if seen.contains(&candidate.id) {
                    continue;
                }
                let score = candidate.vector_score.unwrap_or(0.0);
                if score >= self.config.vector_score_floor {
                    candidates.push(candidate);
                }
            }
        }

        Ok(merge_and_rank(
            candidates,
            self.config.vector_weight,
            self.config.top_k,
        ))
    }
}

/// Keyword list for the index lookup. The corpus is indexed in Cyrillic;
/// Latin-looking keywords (extraction fallback hands us the raw message)
/// get a transliterated variant appended so they still match.
fn search_keywords(intent: &QueryIntent) -> Vec<String> {
    let mut keywords: Vec<String> = intent
        .primary_keywords
        .iter()
        .chain(intent.related_keywords.iter())
        .cloned()
        .collect();

    let transliterated: Vec<String> = keywords
        .iter()
        .filter(|k| translit::is_latin(k))
        .map(|k| translit::latin_to_cyrillic(k))
        .collect();
    keywords.extend(transliterated);

    // Order-preserving dedup; a repeated keyword would double-count its
    // title/body hits in the index scoring.
    let mut seen = HashSet::new();
    keywords.retain(|k| seen.insert(k.clone()));
    keywords
}

/// Compute composite scores, sort descending, truncate to `top_k`.
///
/// Ties break by id descending so the final ordering is total and
/// reproducible.
pub fn merge_and_rank(
    candidates: Vec<Candidate>,
    vector_weight: f64,
    top_k: usize,
) -> Vec<RankedCandidate> {
    let mut ranked: Vec<RankedCandidate> = candidates
        .into_iter()
        .map(|c| RankedCandidate::new(c, vector_weight))
        .collect();

    ranked.sort_by(|a, b| {
        b.composite_score
            .partial_cmp(&a.composite_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(b.candidate.id.cmp(&a.candidate.id))
    });
    ranked.truncate(top_k);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn keyword_candidate(id: i64, score: f64) -> Candidate {
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

    fn vector_candidate(id: i64, score: f64) -> Candidate {
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

    #[test]
    fn test_latin_keywords_gain_cyrillic_variants() {
        let intent = QueryIntent {
            needs_retrieval: true,
            primary_keywords: vec!["namoz".to_string(), "вақт".to_string()],
            related_keywords: vec![],
            canonical_query: "намоз вақтлари".to_string(),
        };
        let keywords = search_keywords(&intent);
        assert_eq!(keywords, vec!["namoz", "вақт", "намоз"]);
    }

    #[test]
    fn test_keywords_deduplicate_across_sets_and_variants() {
        let intent = QueryIntent {
            needs_retrieval: true,
            primary_keywords: vec!["намоз".to_string(), "namoz".to_string()],
            related_keywords: vec!["намоз".to_string()],
            canonical_query: "намоз вақтлари".to_string(),
        };
        // primary/related overlap and the transliterated variant of "namoz"
        // collapse; each term is passed to the index exactly once
        let keywords = search_keywords(&intent);
        assert_eq!(keywords, vec!["намоз", "namoz"]);
    }

    #[test]
    fn test_composite_score_mixes_both_signals() {
        let ranked = merge_and_rank(
            vec![keyword_candidate(1, 2.0), vector_candidate(2, 0.9)],
            3.0,
            5,
        );
        // 0.9 * 3 = 2.7 beats keyword 2.0
        assert_eq!(ranked[0].candidate.id, 2);
        assert!((ranked[0].composite_score - 2.7).abs() < 1e-9);
        assert_eq!(ranked[1].candidate.id, 1);
    }

    #[test]
    fn test_truncates_to_top_k() {
        let candidates: Vec<Candidate> =
            (1..=8).map(|i| keyword_candidate(i, i as f64)).collect();
        let ranked = merge_and_rank(candidates, 3.0, 5);
        assert_eq!(ranked.len(), 5);
        assert_eq!(ranked[0].candidate.id, 8);
    }

    #[test]
    fn test_ties_break_by_id_desc() {
        let ranked = merge_and_rank(
            vec![keyword_candidate(3, 4.0), keyword_candidate(7, 4.0)],
            3.0,
            5,
        );
        assert_eq!(ranked[0].candidate.id, 7);
        assert_eq!(ranked[1].candidate.id, 3);
    }

    proptest! {
        #[test]
        fn prop_ranked_output_sorted_and_bounded(
            scores in prop::collection::vec((1i64..1000, 0.0f64..10.0), 0..30)
        ) {
            let candidates: Vec<Candidate> = scores
                .iter()
                .map(|(id, s)| keyword_candidate(*id, *s))
                .collect();
            let ranked = merge_and_rank(candidates, 3.0, 5);
            prop_assert!(ranked.len() <= 5);
            for pair in ranked.windows(2) {
                prop_assert!(pair[0].composite_score >= pair[1].composite_score);
            }
        }
    }
}
