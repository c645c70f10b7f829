//! HTTP client for external LLM services (OpenAI-compatible gateways)

use crate::chat::{Message, Role};
use crate::config::LlmServiceConfig;
use crate::error::{Result, SavollarError};
use crate::llm::{Embedder, GenerativeModel};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// API metrics for monitoring
#[derive(Debug, Default)]
pub struct ApiMetrics {
    pub total_requests: AtomicU64,
    pub total_errors: AtomicU64,
    pub cache_hits: AtomicU64,
    pub cache_misses: AtomicU64,
    pub total_latency_ms: AtomicU64,
}

/// Snapshot of API metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiMetricsSnapshot {
    pub total_requests: u64,
    pub total_errors: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub avg_latency_ms: f64,
}

/// Chat message in the wire format
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    content: String,
}

impl WireMessage {
    fn system(content: &str) -> Self {
        Self {
            role: "system".to_string(),
            content: content.to_string(),
        }
    }

    fn from_history(message: &Message) -> Self {
        Self {
            role: match message.role {
                Role::User => "user".to_string(),
                Role::Assistant => "assistant".to_string(),
            },
            content: message.content.clone(),
        }
    }

    fn user(content: &str) -> Self {
        Self {
            role: "user".to_string(),
            content: content.to_string(),
        }
    }
}

/// Client for an OpenAI-compatible chat + embeddings service.
///
/// Shared across concurrent requests; the underlying reqwest client pools
/// connections.
pub struct HttpLlmClient {
    http_client: reqwest::Client,
    config: LlmServiceConfig,
    cache: Arc<super::cache::LlmCache>,
    metrics: Arc<ApiMetrics>,
}

impl HttpLlmClient {
    /// Create new client from configuration
    pub fn new(config: LlmServiceConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(SavollarError::Http)?;

        Ok(Self {
            http_client,
            config,
            cache: Arc::new(super::cache::LlmCache::new()),
            metrics: Arc::new(ApiMetrics::default()),
        })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(LlmServiceConfig::default())
    }

    /// Get current API metrics
    pub fn metrics(&self) -> ApiMetricsSnapshot {
        let total = self.metrics.total_requests.load(Ordering::Relaxed);
        ApiMetricsSnapshot {
            total_requests: total,
            total_errors: self.metrics.total_errors.load(Ordering::Relaxed),
            cache_hits: self.metrics.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.metrics.cache_misses.load(Ordering::Relaxed),
            avg_latency_ms: if total > 0 {
                self.metrics.total_latency_ms.load(Ordering::Relaxed) as f64 / total as f64
            } else {
                0.0
            },
        }
    }

    async fn embed_with_task(&self, text: &str, task: &str) -> Result<Vec<f32>> {
        self.metrics.total_requests.fetch_add(1, Ordering::Relaxed);
        let start = Instant::now();

        let cache_key =
            super::cache::embedding_cache_key(&self.config.embedding_model, task, text);
        if let Some(cached) = self.cache.get(&cache_key) {
            if let Ok(embedding) = serde_json::from_str::<Vec<f32>>(&cached) {
                self.metrics.cache_hits.fetch_add(1, Ordering::Relaxed);
                return Ok(embedding);
            }
        }
        self.metrics.cache_misses.fetch_add(1, Ordering::Relaxed);

        #[derive(Serialize)]
        struct EmbedRequest<'a> {
            model: &'a str,
            input: Vec<&'a str>,
            #[serde(skip_serializing_if = "Option::is_none")]
            input_type: Option<&'a str>,
        }

        #[derive(Deserialize)]
        struct EmbedResponse {
            data: Vec<EmbedData>,
        }

        #[derive(Deserialize)]
        struct EmbedData {
            embedding: Vec<f32>,
        }

        let request = EmbedRequest {
            model: &self.config.embedding_model,
            input: vec![text],
            input_type: Some(task),
        };

        let url = format!("{}/v1/embeddings", self.config.embeddings_url());
        let mut req = self.http_client.post(&url).json(&request);
        if let Some(ref api_key) = self.config.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }

        // Embedding failures are retrieval failures: the query embedding
        // exists only to serve vector search.
        let response = req.send().await.map_err(|e| {
            self.metrics.total_errors.fetch_add(1, Ordering::Relaxed);
            SavollarError::Retrieval(format!("embedding request failed: {}", e))
        })?;

        if !response.status().is_success() {
            self.metrics.total_errors.fetch_add(1, Ordering::Relaxed);
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SavollarError::Retrieval(format!(
                "embedding service error (HTTP {}): {}",
                status, body
            )));
        }

        let embed_response: EmbedResponse = response.json().await.map_err(|e| {
            self.metrics.total_errors.fetch_add(1, Ordering::Relaxed);
            SavollarError::Retrieval(format!("malformed embedding response: {}", e))
        })?;

        let embedding = embed_response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| {
                self.metrics.total_errors.fetch_add(1, Ordering::Relaxed);
                SavollarError::Retrieval("no embedding returned".to_string())
            })?;

        if let Ok(json) = serde_json::to_string(&embedding) {
            self.cache.set(cache_key, json);
        }

        self.metrics
            .total_latency_ms
            .fetch_add(start.elapsed().as_millis() as u64, Ordering::Relaxed);

        Ok(embedding)
    }
}

#[async_trait]
impl GenerativeModel for HttpLlmClient {
    async fn generate(
        &self,
        prompt: &str,
        system: Option<&str>,
        history: &[Message],
        temperature: f32,
    ) -> Result<String> {
        self.metrics.total_requests.fetch_add(1, Ordering::Relaxed);
        let start = Instant::now();

        let mut messages = Vec::with_capacity(history.len() + 2);
        if let Some(system) = system {
            messages.push(WireMessage::system(system));
        }
        messages.extend(history.iter().map(WireMessage::from_history));
        messages.push(WireMessage::user(prompt));

        // Only deterministic calls (classification, extraction) are cached;
        // higher temperatures are intentionally non-deterministic.
        let cacheable = temperature == 0.0;
        let payload = serde_json::to_string(&messages).unwrap_or_default();
        let cache_key = super::cache::generation_cache_key(&self.config.model, &payload);

        if cacheable {
            if let Some(cached) = self.cache.get(&cache_key) {
                tracing::debug!("generation cache hit");
                self.metrics.cache_hits.fetch_add(1, Ordering::Relaxed);
                return Ok(cached);
            }
            self.metrics.cache_misses.fetch_add(1, Ordering::Relaxed);
        }

        #[derive(Serialize)]
        struct ChatRequest<'a> {
            model: &'a str,
            messages: Vec<WireMessage>,
            temperature: f32,
            max_tokens: u32,
        }

        #[derive(Deserialize)]
        struct ChatResponse {
            choices: Vec<ChatChoice>,
        }

        #[derive(Deserialize)]
        struct ChatChoice {
            message: WireMessage,
        }

        let request = ChatRequest {
            model: &self.config.model,
            messages,
            temperature,
            max_tokens: 1024,
        };

        let url = format!("{}/v1/chat/completions", self.config.url);
        let mut req = self.http_client.post(&url).json(&request);
        if let Some(ref api_key) = self.config.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = req.send().await.map_err(|e| {
            self.metrics.total_errors.fetch_add(1, Ordering::Relaxed);
            SavollarError::Generation(format!("chat request failed: {}", e))
        })?;

        if !response.status().is_success() {
            self.metrics.total_errors.fetch_add(1, Ordering::Relaxed);
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SavollarError::Generation(format!(
                "LLM service error (HTTP {}): {}",
                status, body
            )));
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            self.metrics.total_errors.fetch_add(1, Ordering::Relaxed);
            SavollarError::Generation(format!("malformed chat response: {}", e))
        })?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| {
                self.metrics.total_errors.fetch_add(1, Ordering::Relaxed);
                SavollarError::Generation("no response from LLM".to_string())
            })?;

        if cacheable {
            self.cache.set(cache_key, content.clone());
        }

        self.metrics
            .total_latency_ms
            .fetch_add(start.elapsed().as_millis() as u64, Ordering::Relaxed);

        Ok(content)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl Embedder for HttpLlmClient {
    async fn embed_document(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_with_task(text, "retrieval_document").await
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_with_task(text, "retrieval_query").await
    }

    fn dimensions(&self) -> usize {
        self.config.embedding_dimensions
    }

    fn model_name(&self) -> &str {
        &self.config.embedding_model
    }
}
