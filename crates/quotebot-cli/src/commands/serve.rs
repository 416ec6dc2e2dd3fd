//! HTTP server command

use super::build_service;
use crate::app::ServeArgs;
use anyhow::Result;
use quotebot_core::{Config, Database};
use quotebot_server::AppState;

pub async fn run(args: ServeArgs, db: Database, config: &Config, offline: bool) -> Result<()> {
    let mut server = config.server.clone();
    if let Some(host) = args.host {
        server.host = host;
    }
    if let Some(port) = args.port {
        server.port = port;
    }

    let (service, llm) = build_service(db, config, offline)?;
    let state = match llm {
        Some(llm) => AppState::new(service).with_llm(llm),
        None => AppState::new(service),
    };
    println!("Serving chat on http://{}", server.bind_addr());
    quotebot_server::serve(&server, state).await?;
    Ok(())
}
