//! Embedding storage and similarity search
//!
//! Stores embeddings as f32 little-endian BLOBs and computes cosine
//! similarity in Rust.

use super::Database;
use crate::error::Result;
use crate::search::Candidate;
use chrono::Utc;
use rusqlite::params;

impl Database {
    /// Store (or replace) the embedding for a question
    pub fn insert_embedding(&self, question_id: i64, model: &str, embedding: &[f32]) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let bytes = embedding_to_bytes(embedding);
        self.conn.execute(
            "INSERT OR REPLACE INTO question_embeddings
                (question_id, model, embedding, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![question_id, model, bytes, now],
        )?;
        Ok(())
    }

    /// Question ids lacking an embedding, ascending, optionally resuming
    /// from a given id. `partition` restricts to ids where
    /// `id % workers == worker_index` so parallel backfill workers never
    /// claim the same row.
    pub fn unembedded_question_ids(
        &self,
        start_from: Option<i64>,
        partition: Option<(u64, u64)>,
    ) -> Result<Vec<i64>> {
        let floor = start_from.unwrap_or(0);
        let mut stmt = self.conn.prepare(
            "SELECT q.id FROM questions q
             LEFT JOIN question_embeddings e ON e.question_id = q.id
             WHERE e.question_id IS NULL AND q.id >= ?1
             ORDER BY q.id",
        )?;
        let ids = stmt
            .query_map(params![floor], |row| row.get::<_, i64>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(match partition {
            Some((workers, index)) => ids
                .into_iter()
                .filter(|id| (*id as u64) % workers == index)
                .collect(),
            None => ids,
        })
    }
}

impl Database {
    /// Brute-force cosine search over stored embeddings.
    ///
    /// Inherent for the same reason as `keyword_search`: the
    /// [`VectorIndex`](crate::search::VectorIndex) impl lives on
    /// `Mutex<Database>` and delegates here.
    pub fn vector_search(&self, vector: &[f32], limit: usize) -> Result<Vec<Candidate>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT q.id, q.url, q.title, q.question_text, q.answer,
                        q.category, e.embedding
                 FROM question_embeddings e
                 JOIN questions q ON q.id = e.question_id",
            )
            .map_err(|e| crate::Error::Retrieval(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, Option<String>>(5)?,
                    row.get::<_, Vec<u8>>(6)?,
                ))
            })
            .map_err(|e| crate::Error::Retrieval(e.to_string()))?;

        let mut scored: Vec<Candidate> = Vec::new();
        for row in rows {
            let (id, url, title, question_text, answer, category, bytes) =
                row.map_err(|e| crate::Error::Retrieval(e.to_string()))?;

            if title.trim().is_empty() || answer.trim().is_empty() {
                tracing::warn!(id, "skipping malformed candidate (empty title or answer)");
                continue;
            }

            let embedding = bytes_to_embedding(&bytes);
            let similarity = cosine_similarity(vector, &embedding).clamp(0.0, 1.0);
            scored.push(Candidate {
                id,
                title,
                question_text,
                answer,
                category,
                url,
                keyword_score: None,
                vector_score: Some(similarity as f64),
            });
        }

        scored.sort_by(|a, b| {
            b.vector_score
                .partial_cmp(&a.vector_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(b.id.cmp(&a.id))
        });
        scored.truncate(limit);
        Ok(scored)
    }
}

/// Encode embedding as little-endian f32 bytes
pub fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * 4);
    for value in embedding {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Decode little-endian f32 bytes back to an embedding
pub fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Cosine similarity between two vectors (0.0 for mismatched or zero vectors)
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}
