//! Plan ingestion command

use crate::app::{IngestArgs, OutputFormat};
use anyhow::Result;
use quotebot_core::{
    ingest_plans, load_plan_file, Config, Database, Embedder, HttpEmbedder, IngestMode,
};

pub async fn run(
    args: IngestArgs,
    db: &Database,
    config: &Config,
    offline: bool,
    format: OutputFormat,
) -> Result<()> {
    let plans = load_plan_file(&args.file)?;
    let mode = if args.recreate {
        IngestMode::Recreate
    } else {
        IngestMode::Skip
    };

    let embedder = if args.embed && !offline {
        Some(HttpEmbedder::from_config(config.llm_service.clone())?)
    } else {
        if args.embed {
            tracing::warn!("--embed ignored in offline mode");
        }
        None
    };

    let report = ingest_plans(
        db,
        &config.store.collection,
        &plans,
        embedder.as_ref().map(|e| e as &dyn Embedder),
        mode,
    )
    .await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Cli => {
            if report.skipped {
                println!(
                    "Collection '{}' already has {} plans; use --recreate to rebuild it",
                    report.collection, report.existing
                );
            } else {
                if report.removed > 0 {
                    println!("Removed {} existing plans", report.removed);
                }
                println!(
                    "Ingested {} plans into '{}' ({} duplicates, {} embedded)",
                    report.inserted, report.collection, report.duplicates, report.embedded
                );
            }
        }
    }
    Ok(())
}
