//! Direct keyword search over the corpus

use crate::app::{OutputFormat, SearchArgs};
use crate::output;
use anyhow::{anyhow, Result};
use savollar_core::Database;

pub async fn run(args: SearchArgs, db: &Database, format: OutputFormat) -> Result<()> {
    if args.keywords.is_empty() {
        return Err(anyhow!("no keywords given"));
    }

    let candidates = db.keyword_search(&args.keywords, args.limit)?;
    output::print_candidates(&candidates, format)?;
    Ok(())
}
