//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "savollar")]
#[command(
    author,
    version,
    about = "Question answering over an Uzbek Islamic Q&A corpus"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "cli")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask a single question
    Ask(AskArgs),

    /// Interactive chat session
    Chat(ChatArgs),

    /// Keyword search over the corpus
    Search(SearchArgs),

    /// Import corpus documents from a JSONL file
    Import(ImportArgs),

    /// Backfill embeddings for corpus rows lacking one
    Embed(EmbedArgs),

    /// Most viewed questions
    Popular(PopularArgs),

    /// Corpus and embedding coverage
    Status,
}

#[derive(Args)]
pub struct AskArgs {
    /// The question
    pub question: Vec<String>,

    /// Session id recorded in the chat log
    #[arg(long)]
    pub session: Option<String>,

    /// Bound the whole request (seconds)
    #[arg(long)]
    pub timeout: Option<u64>,
}

#[derive(Args)]
pub struct ChatArgs {
    /// Session id recorded in the chat log
    #[arg(long)]
    pub session: Option<String>,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Keywords to search for
    pub keywords: Vec<String>,

    /// Max results
    #[arg(short, long, default_value = "10")]
    pub limit: usize,
}

#[derive(Args)]
pub struct ImportArgs {
    /// JSONL file, one question document per line
    pub file: PathBuf,
}

#[derive(Args)]
pub struct EmbedArgs {
    /// Parallel workers; each needs its own API key in
    /// SAVOLLAR_LLM_API_KEYS (comma-separated) when > 1
    #[arg(long, default_value = "1")]
    pub workers: usize,

    /// Per-worker requests per minute
    #[arg(long, default_value = "5")]
    pub rpm: u32,

    /// Stop after this many embeddings (0 = no cap)
    #[arg(long, default_value = "7000")]
    pub limit: u64,

    /// Resume from this question id
    #[arg(long)]
    pub start_from: Option<i64>,
}

#[derive(Args)]
pub struct PopularArgs {
    /// Max results
    #[arg(short, long, default_value = "10")]
    pub limit: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Cli,
    Json,
}
