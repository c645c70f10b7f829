//! Corpus question operations and keyword search

use super::Database;
use crate::error::Result;
use crate::search::Candidate;
use chrono::Utc;
use rusqlite::{params, params_from_iter};

/// Points added to a candidate's keyword score per keyword found in the title
const TITLE_HIT_SCORE: f64 = 2.0;

/// Points added per keyword found in the question or answer body
const BODY_HIT_SCORE: f64 = 1.0;

/// Question document to insert
#[derive(Debug, Clone, serde::Deserialize)]
pub struct QuestionInsert {
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub question_text: Option<String>,
    pub answer: String,
    #[serde(default)]
    pub answer_author: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub published_date: Option<String>,
    #[serde(default)]
    pub view_count: i64,
}

/// Full question record
#[derive(Debug, Clone, serde::Serialize)]
pub struct QuestionRecord {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub question_text: Option<String>,
    pub answer: String,
    pub answer_author: Option<String>,
    pub category: Option<String>,
    pub published_date: Option<String>,
    pub view_count: i64,
}

/// Corpus coverage counts
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct CorpusStats {
    pub total_questions: i64,
    pub with_embedding: i64,
    pub without_embedding: i64,
}

impl Database {
    /// Insert or update a question by url. Returns the row id.
    pub fn upsert_question(&self, q: &QuestionInsert) -> Result<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO questions
                (url, title, question_text, answer, answer_author, category,
                 published_date, view_count, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(url) DO UPDATE SET
                title = excluded.title,
                question_text = excluded.question_text,
                answer = excluded.answer,
                answer_author = excluded.answer_author,
                category = excluded.category,
                published_date = excluded.published_date,
                view_count = excluded.view_count",
            params![
                q.url,
                q.title,
                q.question_text,
                q.answer,
                q.answer_author,
                q.category,
                q.published_date,
                q.view_count,
                now
            ],
        )?;
        let id = self.conn.query_row(
            "SELECT id FROM questions WHERE url = ?1",
            params![q.url],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Get a question by id
    pub fn get_question(&self, id: i64) -> Result<Option<QuestionRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, url, title, question_text, answer, answer_author,
                    category, published_date, view_count
             FROM questions WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map(params![id], row_to_record)?;
        match rows.next() {
            Some(record) => Ok(Some(record?)),
            None => Ok(None),
        }
    }

    /// Most viewed questions
    pub fn popular_questions(&self, limit: usize) -> Result<Vec<QuestionRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, url, title, question_text, answer, answer_author,
                    category, published_date, view_count
             FROM questions
             WHERE view_count > 0
             ORDER BY view_count DESC, id DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], row_to_record)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Corpus and embedding coverage counts
    pub fn corpus_stats(&self) -> Result<CorpusStats> {
        let total: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM questions", [], |row| row.get(0))?;
        let with_embedding: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM questions q
             JOIN question_embeddings e ON e.question_id = q.id",
            [],
            |row| row.get(0),
        )?;
        Ok(CorpusStats {
            total_questions: total,
            with_embedding,
            without_embedding: total - with_embedding,
        })
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<QuestionRecord> {
    Ok(QuestionRecord {
        id: row.get(0)?,
        url: row.get(1)?,
        title: row.get(2)?,
        question_text: row.get(3)?,
        answer: row.get(4)?,
        answer_author: row.get(5)?,
        category: row.get(6)?,
        published_date: row.get(7)?,
        view_count: row.get(8)?,
    })
}

impl Database {
    /// Keyword search over the corpus.
    ///
    /// Inherent rather than a [`KeywordIndex`](crate::search::KeywordIndex)
    /// impl: the connection is not `Sync`, so the trait is implemented on
    /// `Mutex<Database>` and delegates here.
    pub fn keyword_search(&self, keywords: &[String], limit: usize) -> Result<Vec<Candidate>> {
        let keywords: Vec<String> = keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        if keywords.is_empty() {
            return Ok(Vec::new());
        }

        // Prefilter in SQL with OR'd substring matches, then accumulate the
        // per-keyword title/body scores in Rust where they stay explicit.
        let clause = keywords
            .iter()
            .enumerate()
            .map(|(i, _)| {
                let p = i + 1;
                format!(
                    "lower_uni(title) LIKE ?{p} OR lower_uni(question_text) LIKE ?{p} \
                     OR lower_uni(answer) LIKE ?{p}"
                )
            })
            .collect::<Vec<_>>()
            .join(" OR ");
        let sql = format!(
            "SELECT id, url, title, question_text, answer, category, view_count
             FROM questions WHERE {clause}"
        );
        let patterns: Vec<String> = keywords.iter().map(|k| format!("%{}%", k)).collect();

        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| crate::Error::Retrieval(e.to_string()))?;
        let rows = stmt
            .query_map(params_from_iter(patterns.iter()), |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, Option<String>>(5)?,
                    row.get::<_, i64>(6)?,
                ))
            })
            .map_err(|e| crate::Error::Retrieval(e.to_string()))?;

        let mut scored: Vec<(Candidate, i64)> = Vec::new();
        for row in rows {
            let (id, url, title, question_text, answer, category, view_count) =
                row.map_err(|e| crate::Error::Retrieval(e.to_string()))?;

            if title.trim().is_empty() || answer.trim().is_empty() {
                tracing::warn!(id, "skipping malformed candidate (empty title or answer)");
                continue;
            }

            let title_l = title.to_lowercase();
            let question_l = question_text.as_deref().unwrap_or("").to_lowercase();
            let answer_l = answer.to_lowercase();

            let mut score = 0.0;
            for kw in &keywords {
                if title_l.contains(kw.as_str()) {
                    score += TITLE_HIT_SCORE;
                }
                if question_l.contains(kw.as_str()) || answer_l.contains(kw.as_str()) {
                    score += BODY_HIT_SCORE;
                }
            }
            if score == 0.0 {
                continue;
            }

            scored.push((
                Candidate {
                    id,
                    title,
                    question_text,
                    answer,
                    category,
                    url,
                    keyword_score: Some(score),
                    vector_score: None,
                },
                view_count,
            ));
        }

        // Deterministic order: score desc, popularity desc, id desc
        scored.sort_by(|a, b| {
            b.0.keyword_score
                .partial_cmp(&a.0.keyword_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(b.1.cmp(&a.1))
                .then(b.0.id.cmp(&a.0.id))
        });
        scored.truncate(limit);

        Ok(scored.into_iter().map(|(c, _)| c).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        db
    }

    fn insert(db: &Database, url: &str, title: &str, answer: &str, views: i64) -> i64 {
        db.upsert_question(&QuestionInsert {
            url: url.to_string(),
            title: title.to_string(),
            question_text: None,
            answer: answer.to_string(),
            answer_author: None,
            category: None,
            published_date: None,
            view_count: views,
        })
        .unwrap()
    }

    #[test]
    fn test_upsert_is_stable_by_url() {
        let db = test_db();
        let a = insert(&db, "https://x/1", "Namoz vaqtlari", "Javob", 5);
        let b = insert(&db, "https://x/1", "Namoz vaqtlari (yangilangan)", "Javob", 6);
        assert_eq!(a, b);
        let rec = db.get_question(a).unwrap().unwrap();
        assert_eq!(rec.view_count, 6);
    }

    #[test]
    fn test_keyword_scoring_title_beats_body() {
        let db = test_db();
        insert(&db, "https://x/1", "Ro'za haqida", "umumiy javob", 0);
        insert(&db, "https://x/2", "Boshqa savol", "ro'za haqida javob", 0);

        let results = db
            .keyword_search(&["ro'za".to_string()], 10)
            .unwrap();
        assert_eq!(results.len(), 2);
        // title hit (+2) outranks body hit (+1)
        assert_eq!(results[0].url, "https://x/1");
        assert_eq!(results[0].keyword_score, Some(2.0));
        assert_eq!(results[1].keyword_score, Some(1.0));
    }

    #[test]
    fn test_keyword_scores_accumulate_across_keywords() {
        let db = test_db();
        insert(
            &db,
            "https://x/1",
            "Namoz va ro'za",
            "namoz hamda ro'za hukmlari",
            0,
        );
        let results = db
            .keyword_search(&["namoz".to_string(), "ro'za".to_string()], 10)
            .unwrap();
        // both keywords hit title (+2 each) and body (+1 each)
        assert_eq!(results[0].keyword_score, Some(6.0));
    }

    #[test]
    fn test_popularity_then_id_tiebreak() {
        let db = test_db();
        insert(&db, "https://x/1", "Zakot miqdori", "javob", 10);
        insert(&db, "https://x/2", "Zakot nisobi", "javob", 50);
        insert(&db, "https://x/3", "Zakot shartlari", "javob", 50);

        let results = db.keyword_search(&["zakot".to_string()], 10).unwrap();
        let urls: Vec<&str> = results.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(urls, vec!["https://x/3", "https://x/2", "https://x/1"]);
    }

    #[test]
    fn test_blank_answer_rows_are_skipped() {
        let db = test_db();
        insert(&db, "https://x/1", "Namoz vaqtlari", "javob matni", 0);
        insert(&db, "https://x/2", "Namoz haqida", "   ", 0);

        let results = db.keyword_search(&["namoz".to_string()], 10).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].url, "https://x/1");
    }

    #[test]
    fn test_cyrillic_case_folding() {
        let db = test_db();
        insert(&db, "https://x/1", "Намоз вақтлари", "Жавоб матни", 0);
        let results = db.keyword_search(&["намоз".to_string()], 10).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].keyword_score, Some(2.0));
    }

    #[test]
    fn test_empty_keywords_return_nothing() {
        let db = test_db();
        insert(&db, "https://x/1", "Namoz", "javob", 0);
        let results = db.keyword_search(&["  ".to_string()], 10).unwrap();
        assert!(results.is_empty());
    }
}
