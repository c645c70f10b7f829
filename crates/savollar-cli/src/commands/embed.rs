//! Embedding backfill

use crate::app::EmbedArgs;
use anyhow::{anyhow, Result};
use savollar_core::{run_backfill, BackfillOptions, Config, Embedder, HttpLlmClient};
use std::path::Path;
use std::sync::Arc;

pub async fn run(args: EmbedArgs, db_path: &Path) -> Result<()> {
    if args.workers == 0 {
        return Err(anyhow!("workers must be at least 1"));
    }

    let config = Config::load()?;
    let embedders = build_embedders(&config, args.workers)?;

    let report = run_backfill(
        db_path,
        embedders,
        BackfillOptions {
            rpm: args.rpm,
            session_limit: args.limit,
            start_from: args.start_from,
        },
    )
    .await?;

    println!("Processed: {}", report.processed);
    println!("Errors:    {}", report.errors);
    println!("Remaining: {}", report.remaining);
    if report.remaining > 0 {
        println!("Resume with: savollar embed --start-from <last id + 1>");
    }
    Ok(())
}

/// One embedder per worker. Multiple workers multiplex upstream rate limits,
/// so each needs its own credential from SAVOLLAR_LLM_API_KEYS.
fn build_embedders(config: &Config, workers: usize) -> Result<Vec<Arc<dyn Embedder>>> {
    if workers == 1 {
        let client = HttpLlmClient::new(config.llm_service.clone())?;
        return Ok(vec![Arc::new(client)]);
    }

    let keys: Vec<String> = std::env::var("SAVOLLAR_LLM_API_KEYS")
        .map_err(|_| anyhow!("SAVOLLAR_LLM_API_KEYS is required when workers > 1"))?
        .split(',')
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect();
    if keys.len() < workers {
        return Err(anyhow!(
            "{} workers requested but only {} API keys provided",
            workers,
            keys.len()
        ));
    }

    let mut embedders: Vec<Arc<dyn Embedder>> = Vec::with_capacity(workers);
    for key in keys.into_iter().take(workers) {
        let mut service = config.llm_service.clone();
        service.api_key = Some(key);
        embedders.push(Arc::new(HttpLlmClient::new(service)?));
    }
    Ok(embedders)
}
