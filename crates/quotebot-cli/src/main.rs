//! Quotebot CLI
//!
//! Compare insurance quotes by premium and ask follow-up questions.

use anyhow::Result;
use clap::Parser;
use quotebot_core::error::exit_codes;
use quotebot_core::{Config, Database, QuoteBotError};

mod app;
mod commands;

use app::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        let code = e
            .downcast_ref::<QuoteBotError>()
            .map(QuoteBotError::exit_code)
            .unwrap_or(exit_codes::GENERAL_ERROR);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match cli.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    // QUOTEBOT_DB overrides the configured path
    let db_path = config.store.resolve_db_path();
    let db = Database::open(&db_path)?;
    db.initialize()?;

    match cli.command {
        Commands::Chat => commands::chat::run(db, &config, cli.offline, cli.format).await,
        Commands::Ask(args) => commands::ask::run(args, db, &config, cli.offline, cli.format).await,
        Commands::Ingest(args) => {
            commands::ingest::run(args, &db, &config, cli.offline, cli.format).await
        }
        Commands::Status => commands::status::run(&db, &db_path, &config, cli.format).await,
        Commands::Plans => commands::plans::run(&db, &config, cli.format).await,
        Commands::Serve(args) => commands::serve::run(args, db, &config, cli.offline).await,
    }
}
