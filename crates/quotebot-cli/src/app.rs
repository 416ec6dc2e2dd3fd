//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "quotebot")]
#[command(
    author,
    version,
    about = "Compare insurance quotes in a multi-turn conversation"
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

    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Use the rule-based classifier and extractive answers instead of an LLM service
    #[arg(long, global = true, env = "QUOTEBOT_OFFLINE")]
    pub offline: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive comparison chat
    Chat,

    /// Ask one question in a fresh conversation
    Ask(AskArgs),

    /// Load plans from a JSON file
    Ingest(IngestArgs),

    /// Show plan store status
    Status,

    /// List stored plans
    Plans,

    /// Start the HTTP chat server
    Serve(ServeArgs),
}

#[derive(Args)]
pub struct AskArgs {
    /// Question, e.g. "compare 18000, 22500, 28000"
    #[arg(required = true, num_args = 1..)]
    pub question: Vec<String>,
}

#[derive(Args)]
pub struct IngestArgs {
    /// JSON array of {content, metadata: {premium, ...}} entries
    pub file: PathBuf,

    /// Delete existing plans in the collection first
    #[arg(long)]
    pub recreate: bool,

    /// Compute plan embeddings with the configured embedding service
    #[arg(long)]
    pub embed: bool,
}

#[derive(Args)]
pub struct ServeArgs {
    #[arg(long)]
    pub host: Option<String>,

    #[arg(long)]
    pub port: Option<u16>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Cli,
    Json,
}
