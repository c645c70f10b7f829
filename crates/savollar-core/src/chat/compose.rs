//! Answer composition
//!
//! Exactly one response-shape decision per invocation: conversational,
//! grounded in corpus candidates, or generative-knowledge fallback.

use std::sync::Arc;

use crate::config::RetrievalConfig;
use crate::error::Result;
use crate::llm::{prompts, GenerativeModel};
use crate::search::RankedCandidate;

use super::{AnswerMode, AnswerResult, Message, Source};

/// Temperature for conversational and fallback replies
const CONVERSATIONAL_TEMPERATURE: f32 = 0.7;

/// Temperature for grounded composition
const GROUNDED_TEMPERATURE: f32 = 0.3;

/// Produces the final answer text for the selected response mode
pub struct AnswerComposer {
    model: Arc<dyn GenerativeModel>,
    relevance_divisor: f64,
}

impl AnswerComposer {
    pub fn new(model: Arc<dyn GenerativeModel>, config: &RetrievalConfig) -> Self {
        Self {
            model,
            relevance_divisor: config.relevance_divisor,
        }
    }

    /// Pure conversational reply (greeting or small talk, no history)
    pub async fn conversational(&self, message: &str) -> Result<AnswerResult> {
        let answer = self
            .model
            .generate(
                &prompts::conversational_prompt(message),
                None,
                &[],
                CONVERSATIONAL_TEMPERATURE,
            )
            .await?;
        Ok(AnswerResult {
            answer_text: answer.trim().to_string(),
            sources: Vec::new(),
            mode: AnswerMode::Conversational,
            disclaimer: None,
        })
    }

    /// Knowledge fallback: no corpus grounding, always carries the disclaimer
    pub async fn fallback(&self, message: &str, history: &[Message]) -> Result<AnswerResult> {
        let answer = self
            .model
            .generate(
                message,
                Some(prompts::fallback_system_prompt()),
                history,
                CONVERSATIONAL_TEMPERATURE,
            )
            .await?;
        Ok(AnswerResult {
            answer_text: answer.trim().to_string(),
            sources: Vec::new(),
            mode: AnswerMode::GenerativeKnowledge,
            disclaimer: Some(prompts::KNOWLEDGE_DISCLAIMER.to_string()),
        })
    }

    /// Grounded composition over ranked candidates.
    ///
    /// The generated text is scanned for the fixed "not found" phrases; a
    /// hit means the model contradicted its own context constraint, so the
    /// grounded answer is discarded and the knowledge fallback runs instead.
    pub async fn grounded(
        &self,
        message: &str,
        candidates: &[RankedCandidate],
        history: &[Message],
    ) -> Result<AnswerResult> {
        let answer = self
            .model
            .generate(
                &prompts::grounded_user_prompt(message, candidates),
                Some(prompts::grounded_system_prompt()),
                history,
                GROUNDED_TEMPERATURE,
            )
            .await?;

        if prompts::contains_not_found(&answer) {
            tracing::debug!("grounded answer reported no information, rerouting to fallback");
            return self.fallback(message, history).await;
        }

        Ok(AnswerResult {
            answer_text: answer.trim().to_string(),
            sources: self.sources_from(candidates),
            mode: AnswerMode::Database,
            disclaimer: None,
        })
    }

    /// Build the source list shown to the caller, preserving candidate order.
    ///
    /// Display relevance is the vector similarity when present, otherwise
    /// the keyword score rescaled toward [0,1]. Cosmetic, not a probability.
    fn sources_from(&self, candidates: &[RankedCandidate]) -> Vec<Source> {
        candidates
            .iter()
            .map(|ranked| {
                let relevance = match ranked.candidate.vector_score {
                    Some(score) => score,
                    None => ranked.candidate.keyword_score.unwrap_or(0.0) / self.relevance_divisor,
                };
                Source {
                    id: ranked.candidate.id,
                    title: ranked.candidate.title.clone(),
                    relevance: round2(relevance),
                }
            })
            .collect()
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
