//! Corpus import from JSONL

use crate::app::ImportArgs;
use anyhow::{Context, Result};
use savollar_core::db::QuestionInsert;
use savollar_core::Database;
use std::io::BufRead;

pub async fn run(args: ImportArgs, db: &Database) -> Result<()> {
    let file = std::fs::File::open(&args.file)
        .with_context(|| format!("cannot open {}", args.file.display()))?;
    let reader = std::io::BufReader::new(file);

    let mut imported = 0u64;
    let mut skipped = 0u64;
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<QuestionInsert>(&line) {
            Ok(question) => {
                db.upsert_question(&question)?;
                imported += 1;
            }
            Err(e) => {
                tracing::warn!(line = line_no + 1, error = %e, "skipping malformed line");
                skipped += 1;
            }
        }
    }

    println!("Imported {} documents ({} skipped)", imported, skipped);
    Ok(())
}
