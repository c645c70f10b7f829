//! Configuration management

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// LLM service configuration
    #[serde(default)]
    pub llm_service: LlmServiceConfig,

    /// Retrieval tuning knobs
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

/// LLM service configuration for external inference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmServiceConfig {
    /// Base URL of the LLM service for chat/completions
    pub url: String,

    /// Model name for chat completions
    #[serde(default = "default_chat_model")]
    pub model: String,

    /// Base URL for embeddings service (can be different from LLM URL)
    #[serde(default)]
    pub embedding_url: Option<String>,

    /// Model name for embeddings
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Embedding dimensions
    #[serde(default = "default_embedding_dimensions")]
    pub embedding_dimensions: usize,

    /// API key (optional, for authenticated services)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl LlmServiceConfig {
    /// Get the embeddings URL (falls back to main URL if not specified)
    pub fn embeddings_url(&self) -> &str {
        self.embedding_url.as_deref().unwrap_or(&self.url)
    }
}

impl Default for LlmServiceConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("SAVOLLAR_LLM_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            model: default_chat_model(),
            embedding_url: std::env::var("SAVOLLAR_EMBEDDING_URL").ok(),
            embedding_model: default_embedding_model(),
            embedding_dimensions: std::env::var("SAVOLLAR_EMBEDDING_DIMS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_embedding_dimensions),
            api_key: std::env::var("SAVOLLAR_LLM_API_KEY").ok(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_chat_model() -> String {
    std::env::var("SAVOLLAR_LLM_MODEL").unwrap_or_else(|_| "gemini-2.0-flash".to_string())
}

fn default_embedding_model() -> String {
    std::env::var("SAVOLLAR_EMBEDDING_MODEL")
        .unwrap_or_else(|_| "text-embedding-004".to_string())
}

fn default_embedding_dimensions() -> usize {
    768
}

fn default_timeout() -> u64 {
    30
}

/// Retrieval tuning constants.
///
/// The score-mixing values (`vector_weight`, `relevance_divisor`) were tuned
/// empirically against the reference corpus; they are kept configurable
/// rather than hardcoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Max candidates fetched from keyword search
    #[serde(default = "default_keyword_limit")]
    pub keyword_limit: usize,

    /// Max candidates fetched from vector search
    #[serde(default = "default_vector_limit")]
    pub vector_limit: usize,

    /// Keyword result count below which vector augmentation kicks in
    #[serde(default = "default_min_keyword_results")]
    pub min_keyword_results: usize,

    /// Minimum cosine similarity for a vector-sourced candidate (inclusive)
    #[serde(default = "default_vector_score_floor")]
    pub vector_score_floor: f64,

    /// Final result list length
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Multiplier making vector similarity comparable to keyword hit counts
    #[serde(default = "default_vector_weight")]
    pub vector_weight: f64,

    /// Divisor rescaling keyword scores toward a [0,1]-like display value
    #[serde(default = "default_relevance_divisor")]
    pub relevance_divisor: f64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            keyword_limit: default_keyword_limit(),
            vector_limit: default_vector_limit(),
            min_keyword_results: default_min_keyword_results(),
            vector_score_floor: default_vector_score_floor(),
            top_k: default_top_k(),
            vector_weight: default_vector_weight(),
            relevance_divisor: default_relevance_divisor(),
        }
    }
}

fn default_keyword_limit() -> usize {
    10
}

fn default_vector_limit() -> usize {
    10
}

fn default_min_keyword_results() -> usize {
    3
}

fn default_vector_score_floor() -> f64 {
    0.55
}

fn default_top_k() -> usize {
    5
}

fn default_vector_weight() -> f64 {
    3.0
}

fn default_relevance_divisor() -> f64 {
    6.0
}

impl Config {
    /// Load config from default path
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let config: Config = serde_yaml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to default path
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retrieval_defaults() {
        let cfg = RetrievalConfig::default();
        assert_eq!(cfg.min_keyword_results, 3);
        assert_eq!(cfg.top_k, 5);
        assert!((cfg.vector_score_floor - 0.55).abs() < f64::EPSILON);
        assert!((cfg.vector_weight - 3.0).abs() < f64::EPSILON);
        assert!((cfg.relevance_divisor - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_config_roundtrip() {
        let cfg = Config::default();
        let yaml = serde_yaml::to_string(&cfg).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.retrieval.top_k, cfg.retrieval.top_k);
        assert_eq!(parsed.llm_service.embedding_dimensions, cfg.llm_service.embedding_dimensions);
    }
}
