//! Most viewed questions

use crate::app::{OutputFormat, PopularArgs};
use crate::output;
use anyhow::Result;
use savollar_core::Database;

pub async fn run(args: PopularArgs, db: &Database, format: OutputFormat) -> Result<()> {
    let questions = db.popular_questions(args.limit)?;
    output::print_questions(&questions, format)?;
    Ok(())
}
