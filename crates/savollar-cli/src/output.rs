//! Result rendering

use crate::app::OutputFormat;
use anyhow::Result;
use savollar_core::db::{CorpusStats, QuestionRecord};
use savollar_core::{AnswerResult, Candidate};

/// Print the final answer with its sources and disclaimer
pub fn print_answer(result: &AnswerResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(result)?);
        }
        OutputFormat::Cli => {
            println!("{}", result.answer_text);
            if !result.sources.is_empty() {
                println!("\nManbalar:");
                for source in &result.sources {
                    println!("  [{}] {} ({:.2})", source.id, source.title, source.relevance);
                }
            }
            if let Some(ref disclaimer) = result.disclaimer {
                println!("\n{}", disclaimer);
            }
        }
    }
    Ok(())
}

/// Print keyword search candidates
pub fn print_candidates(candidates: &[Candidate], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let rows: Vec<serde_json::Value> = candidates
                .iter()
                .map(|c| {
                    serde_json::json!({
                        "id": c.id,
                        "title": c.title,
                        "category": c.category,
                        "url": c.url,
                        "keyword_score": c.keyword_score,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Cli => {
            if candidates.is_empty() {
                println!("Hech narsa topilmadi.");
                return Ok(());
            }
            for candidate in candidates {
                println!(
                    "{:>6.1}  [{}] {}",
                    candidate.keyword_score.unwrap_or(0.0),
                    candidate.id,
                    candidate.title
                );
                println!("        {}", candidate.url);
            }
        }
    }
    Ok(())
}

/// Print a question list (popular, etc.)
pub fn print_questions(questions: &[QuestionRecord], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(questions)?);
        }
        OutputFormat::Cli => {
            for q in questions {
                println!("{:>8}  [{}] {}", q.view_count, q.id, q.title);
            }
        }
    }
    Ok(())
}

/// Print corpus coverage
pub fn print_stats(stats: &CorpusStats, chat_logs: i64, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "total_questions": stats.total_questions,
                "with_embedding": stats.with_embedding,
                "without_embedding": stats.without_embedding,
                "chat_logs": chat_logs,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Cli => {
            let coverage = if stats.total_questions > 0 {
                100.0 * stats.with_embedding as f64 / stats.total_questions as f64
            } else {
                0.0
            };
            println!("Questions:          {}", stats.total_questions);
            println!(
                "With embeddings:    {} ({:.1}%)",
                stats.with_embedding, coverage
            );
            println!("Without embeddings: {}", stats.without_embedding);
            println!("Chat log entries:   {}", chat_logs);
        }
    }
    Ok(())
}
