//! LLM integration
//!
//! Provides traits and implementations for:
//! - Embedding generation via external services
//! - Text generation (classification, extraction, answer composition)
//! - Prompt templates and free-text detection heuristics

mod cache;
mod client;
pub mod prompts;
mod traits;

pub use client::{ApiMetricsSnapshot, HttpLlmClient};
pub use traits::{Embedder, GenerativeModel};
