//! One-shot question command

use super::{build_service, log_llm_metrics};
use crate::app::{AskArgs, OutputFormat};
use anyhow::Result;
use quotebot_core::{Config, Database};

pub async fn run(
    args: AskArgs,
    db: Database,
    config: &Config,
    offline: bool,
    format: OutputFormat,
) -> Result<()> {
    let (service, llm) = build_service(db, config, offline)?;
    let question = args.question.join(" ");

    let response = service.send(None, &question).await?;
    log_llm_metrics(llm.as_deref());

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&response)?),
        OutputFormat::Cli => println!("{}", response.reply.message),
    }
    Ok(())
}
