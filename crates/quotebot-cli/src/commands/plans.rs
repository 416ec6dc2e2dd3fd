//! List stored plans

use crate::app::OutputFormat;
use anyhow::Result;
use quotebot_core::amounts::format_amount;
use quotebot_core::{Config, Database};

pub async fn run(db: &Database, config: &Config, format: OutputFormat) -> Result<()> {
    let plans = db.list_plans(&config.store.collection)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&plans)?);
        }
        OutputFormat::Cli => {
            if plans.is_empty() {
                println!("No plans in '{}'", config.store.collection);
                return Ok(());
            }
            for plan in &plans {
                println!("{:>10}  {}", format_amount(plan.premium), plan.title);
            }
            println!("\n{} plans", plans.len());
        }
    }
    Ok(())
}
