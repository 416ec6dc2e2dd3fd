//! Status command

use crate::app::OutputFormat;
use anyhow::Result;
use quotebot_core::amounts::format_amount;
use quotebot_core::{Config, Database};
use std::path::Path;

pub async fn run(
    db: &Database,
    db_path: &Path,
    config: &Config,
    format: OutputFormat,
) -> Result<()> {
    let stats = db.get_stats(&config.store.collection)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        OutputFormat::Cli => {
            println!("Database:        {}", db_path.display());
            println!("Collection:      {}", stats.collection);
            println!("Plans:           {}", stats.plan_count);
            println!("Premiums:        {}", stats.distinct_premiums);
            if let (Some(min), Some(max)) = (stats.min_premium, stats.max_premium) {
                println!("  Range:         {} - {}", format_amount(min), format_amount(max));
            }
            println!("Embedded:        {}", stats.embedded_count);
            match stats.schema_version {
                Some(v) => println!("Schema version:  {}", v),
                None => println!("Schema version:  unknown"),
            }
        }
    }
    Ok(())
}
