//! Offline embedding backfill
//!
//! Populates embeddings for corpus rows that lack one. Workers run in
//! parallel, each bound to its own embedding client (so separate upstream
//! credentials multiplex rate limits) and its own database connection.
//! Rows are claimed by `id % workers == worker_index`, so no two workers
//! ever touch the same row and a stopped run resumes cleanly with
//! `start_from`. Workers communicate only final counters.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::db::Database;
use crate::error::{Result, SavollarError};
use crate::llm::Embedder;

/// Max characters of combined question text sent to the embedder
const MAX_EMBED_CHARS: usize = 10_000;

/// Consecutive errors after which a worker gives up
const MAX_WORKER_ERRORS: u64 = 100;

/// Backfill tuning
#[derive(Debug, Clone)]
pub struct BackfillOptions {
    /// Per-worker requests per minute
    pub rpm: u32,
    /// Total embeddings to produce this session before stopping (0 = no cap)
    pub session_limit: u64,
    /// Resume from this question id
    pub start_from: Option<i64>,
}

impl Default for BackfillOptions {
    fn default() -> Self {
        Self {
            rpm: 5,
            session_limit: 7000,
            start_from: None,
        }
    }
}

/// Final counters for a backfill session
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct BackfillReport {
    pub processed: u64,
    pub errors: u64,
    pub remaining: u64,
}

/// Run the backfill with one worker per embedder.
///
/// Each embedder should carry its own credential; the worker count equals
/// `embedders.len()`.
pub async fn run_backfill(
    db_path: &Path,
    embedders: Vec<Arc<dyn Embedder>>,
    options: BackfillOptions,
) -> Result<BackfillReport> {
    if embedders.is_empty() {
        return Err(SavollarError::InvalidInput(
            "backfill needs at least one embedder".to_string(),
        ));
    }

    let workers = embedders.len() as u64;
    let processed = Arc::new(AtomicU64::new(0));
    let errors = Arc::new(AtomicU64::new(0));
    // Session cap is claimed across workers, one slot per row.
    let claimed = Arc::new(AtomicU64::new(0));

    let mut handles = Vec::with_capacity(embedders.len());
    for (index, embedder) in embedders.into_iter().enumerate() {
        let db_path: PathBuf = db_path.to_path_buf();
        let options = options.clone();
        let processed = processed.clone();
        let errors = errors.clone();
        let claimed = claimed.clone();

        handles.push(tokio::spawn(async move {
            run_worker(
                &db_path,
                embedder,
                workers,
                index as u64,
                &options,
                &processed,
                &errors,
                &claimed,
            )
            .await
        }));
    }

    let results = futures::future::try_join_all(handles)
        .await
        .map_err(|e| SavollarError::Other(anyhow::anyhow!("backfill worker panicked: {e}")))?;
    for result in results {
        result?;
    }

    let db = Database::open(db_path)?;
    let remaining = db.unembedded_question_ids(None, None)?.len() as u64;

    let report = BackfillReport {
        processed: processed.load(Ordering::Relaxed),
        errors: errors.load(Ordering::Relaxed),
        remaining,
    };
    tracing::info!(
        processed = report.processed,
        errors = report.errors,
        remaining = report.remaining,
        "backfill session complete"
    );
    Ok(report)
}

#[allow(clippy::too_many_arguments)]
async fn run_worker(
    db_path: &Path,
    embedder: Arc<dyn Embedder>,
    workers: u64,
    index: u64,
    options: &BackfillOptions,
    processed: &AtomicU64,
    errors: &AtomicU64,
    claimed: &AtomicU64,
) -> Result<()> {
    let db = Database::open(db_path)?;
    let ids = db.unembedded_question_ids(options.start_from, Some((workers, index)))?;
    let delay = Duration::from_secs_f64(60.0 / options.rpm.max(1) as f64);

    tracing::info!(
        worker = index,
        rows = ids.len(),
        delay_secs = delay.as_secs_f64(),
        "backfill worker started"
    );

    let mut worker_errors = 0u64;
    for id in ids {
        if options.session_limit > 0 {
            let slot = claimed.fetch_add(1, Ordering::Relaxed);
            if slot >= options.session_limit {
                tracing::info!(worker = index, "session limit reached, stopping");
                break;
            }
        }

        // Database borrows must not be held across the embedding await:
        // the connection is not Sync, and the worker future must stay Send.
        // Read the row, release the borrow, await, then write.
        let loaded = load_embedding_text(&db, id);
        let step = match loaded {
            Ok(text) => match embedder.embed_document(&text).await {
                Ok(embedding) => db.insert_embedding(id, embedder.model_name(), &embedding),
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        };

        match step {
            Ok(()) => {
                let done = processed.fetch_add(1, Ordering::Relaxed) + 1;
                if done % 50 == 0 {
                    tracing::info!(processed = done, "backfill progress");
                }
            }
            Err(e) => {
                errors.fetch_add(1, Ordering::Relaxed);
                worker_errors += 1;
                tracing::warn!(worker = index, id, error = %e, "embedding failed");
                if worker_errors >= MAX_WORKER_ERRORS {
                    tracing::error!(worker = index, "too many errors, worker stopping");
                    break;
                }
            }
        }

        tokio::time::sleep(delay).await;
    }

    Ok(())
}

fn load_embedding_text(db: &Database, id: i64) -> Result<String> {
    let question = db
        .get_question(id)?
        .ok_or(SavollarError::QuestionNotFound(id))?;
    Ok(embedding_text(
        &question.title,
        question.question_text.as_deref(),
        &question.answer,
    ))
}

/// Combined document text for embedding, truncated to the model's comfort
fn embedding_text(title: &str, question_text: Option<&str>, answer: &str) -> String {
    let mut parts = vec![title];
    if let Some(question) = question_text {
        parts.push(question);
    }
    parts.push(answer);
    let text = parts.join("\n");

    if text.chars().count() > MAX_EMBED_CHARS {
        text.chars().take(MAX_EMBED_CHARS).collect()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::QuestionInsert;
    use async_trait::async_trait;
    use tempfile::TempDir;

    struct FixedEmbedder;

    #[async_trait]
    impl Embedder for FixedEmbedder {
        async fn embed_document(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0, 0.0, 0.0])
        }

        async fn embed_query(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0, 0.0, 0.0])
        }

        fn dimensions(&self) -> usize {
            3
        }

        fn model_name(&self) -> &str {
            "fixed"
        }
    }

    #[test]
    fn test_embedding_text_truncates_by_chars() {
        let long_answer = "ж".repeat(MAX_EMBED_CHARS * 2);
        let text = embedding_text("sarlavha", None, &long_answer);
        assert_eq!(text.chars().count(), MAX_EMBED_CHARS);
    }

    #[test]
    fn test_embedding_text_includes_all_parts() {
        let text = embedding_text("sarlavha", Some("savol matni"), "javob");
        assert_eq!(text, "sarlavha\nsavol matni\njavob");
    }

    #[tokio::test]
    async fn test_backfill_embeds_all_rows_across_workers() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("corpus.sqlite");
        {
            let db = Database::open(&db_path).unwrap();
            db.initialize().unwrap();
            for i in 0..5 {
                db.upsert_question(&QuestionInsert {
                    url: format!("https://x/{}", i),
                    title: format!("Savol {}", i),
                    question_text: None,
                    answer: "javob".to_string(),
                    answer_author: None,
                    category: None,
                    published_date: None,
                    view_count: 0,
                })
                .unwrap();
            }
        }

        let embedders: Vec<Arc<dyn Embedder>> =
            vec![Arc::new(FixedEmbedder), Arc::new(FixedEmbedder)];
        let report = run_backfill(
            &db_path,
            embedders,
            BackfillOptions {
                rpm: 6000,
                session_limit: 0,
                start_from: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(report.processed, 5);
        assert_eq!(report.errors, 0);
        assert_eq!(report.remaining, 0);
    }

    #[tokio::test]
    async fn test_backfill_respects_session_limit() {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("corpus.sqlite");
        {
            let db = Database::open(&db_path).unwrap();
            db.initialize().unwrap();
            for i in 0..6 {
                db.upsert_question(&QuestionInsert {
                    url: format!("https://x/{}", i),
                    title: format!("Savol {}", i),
                    question_text: None,
                    answer: "javob".to_string(),
                    answer_author: None,
                    category: None,
                    published_date: None,
                    view_count: 0,
                })
                .unwrap();
            }
        }

        let embedders: Vec<Arc<dyn Embedder>> = vec![Arc::new(FixedEmbedder)];
        let report = run_backfill(
            &db_path,
            embedders,
            BackfillOptions {
                rpm: 6000,
                session_limit: 2,
                start_from: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(report.processed, 2);
        assert_eq!(report.remaining, 4);
    }
}
