//! Query understanding: classification and keyword extraction

use std::sync::Arc;

use serde::Deserialize;

use crate::error::Result;
use crate::llm::{prompts, GenerativeModel};

/// Derived once per incoming message; not persisted.
#[derive(Debug, Clone)]
pub struct QueryIntent {
    pub needs_retrieval: bool,
    pub primary_keywords: Vec<String>,
    pub related_keywords: Vec<String>,
    pub canonical_query: String,
}

impl QueryIntent {
    /// Union of primary and related keywords, in order
    pub fn all_keywords(&self) -> Vec<String> {
        self.primary_keywords
            .iter()
            .chain(self.related_keywords.iter())
            .cloned()
            .collect()
    }
}

/// Structured extraction output
#[derive(Debug, Deserialize)]
struct ExtractedKeywords {
    #[serde(default)]
    primary_keywords: Vec<String>,
    #[serde(default)]
    related_keywords: Vec<String>,
    #[serde(default)]
    rewritten_query: String,
}

/// Classifies messages and extracts normalized keyword sets
pub struct QueryUnderstanding {
    model: Arc<dyn GenerativeModel>,
}

impl QueryUnderstanding {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    /// Classify whether the message needs retrieval.
    ///
    /// The classifier emits free text; presence of the question token means
    /// retrieval, anything else is conversational. Unexpected model text is
    /// never an error. Transport failures still propagate.
    pub async fn classify(&self, message: &str) -> Result<bool> {
        let response = self
            .model
            .generate(&prompts::classification_prompt(message), None, &[], 0.0)
            .await?;
        let is_question = response.to_uppercase().contains(prompts::QUESTION_TOKEN);
        tracing::debug!(is_question, "message classified");
        Ok(is_question)
    }

    /// Extract keyword sets and a canonicalized query.
    ///
    /// Fails soft: any parse problem degrades to the original message as the
    /// single keyword. Extraction failure lowers retrieval quality, it never
    /// aborts the pipeline.
    pub async fn extract_keywords(&self, message: &str) -> Result<QueryIntent> {
        let response = self
            .model
            .generate(&prompts::keyword_extraction_prompt(message), None, &[], 0.0)
            .await?;

        let parsed = parse_extraction(&response);
        let intent = match parsed {
            Some(extracted) if !extracted.primary_keywords.is_empty() => QueryIntent {
                needs_retrieval: true,
                primary_keywords: extracted.primary_keywords,
                related_keywords: extracted.related_keywords,
                canonical_query: if extracted.rewritten_query.trim().is_empty() {
                    message.to_string()
                } else {
                    extracted.rewritten_query
                },
            },
            _ => {
                tracing::debug!("keyword extraction parse failed, falling back to raw message");
                QueryIntent {
                    needs_retrieval: true,
                    primary_keywords: vec![message.to_string()],
                    related_keywords: Vec::new(),
                    canonical_query: message.to_string(),
                }
            }
        };

        tracing::debug!(
            primary = ?intent.primary_keywords,
            related = ?intent.related_keywords,
            query = %intent.canonical_query,
            "keywords extracted"
        );
        Ok(intent)
    }
}

/// Pull a JSON object out of free-text model output (models often wrap JSON
/// in markdown fences or prose).
fn parse_extraction(response: &str) -> Option<ExtractedKeywords> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&response[start..=end]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_extraction_plain_json() {
        let parsed = parse_extraction(
            r#"{"primary_keywords": ["намоз"], "related_keywords": ["вақт"], "rewritten_query": "намоз вақтлари"}"#,
        )
        .unwrap();
        assert_eq!(parsed.primary_keywords, vec!["намоз"]);
        assert_eq!(parsed.related_keywords, vec!["вақт"]);
        assert_eq!(parsed.rewritten_query, "намоз вақтлари");
    }

    #[test]
    fn test_parse_extraction_fenced_json() {
        let parsed = parse_extraction(
            "Mana natija:\n```json\n{\"primary_keywords\": [\"рўза\"], \"rewritten_query\": \"рўза\"}\n```",
        )
        .unwrap();
        assert_eq!(parsed.primary_keywords, vec!["рўза"]);
        assert!(parsed.related_keywords.is_empty());
    }

    #[test]
    fn test_parse_extraction_garbage_is_none() {
        assert!(parse_extraction("hech narsa topilmadi").is_none());
        assert!(parse_extraction("} {").is_none());
    }
}
