//! Interactive chat command

use super::{build_service, log_llm_metrics};
use crate::app::OutputFormat;
use anyhow::Result;
use quotebot_core::{ChatResponse, ChatService, Config, Database, QuoteBotError};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";
pub const FAREWELL: &str = "Thank you for using Insurance Comparison Chatbot!";

const RULE: &str =
    "================================================================================";
const THIN_RULE: &str =
    "--------------------------------------------------------------------------------";

/// (title, comparison, follow-up) shown in the banner
const EXAMPLE_CONVERSATIONS: &[(&str, &str, &str)] = &[
    (
        "Basic comparison",
        "compare 18000, 22500, 28000",
        "which one has no deductible?",
    ),
    (
        "Family-focused",
        "compare plans 18000 and 22500 for family of 4",
        "which is better for young couple?",
    ),
    (
        "Cost-focused",
        "20000 vs 25000 vs 30000",
        "is the extra cost worth it?",
    ),
];

const VALID_FORMATS: &[&str] = &[
    "compare 18000, 22500, 28000",
    "18000 vs 22500 vs 28000",
    "compare plans 18000 and 22500",
    "show me 18k, 22.5k, 28k",
];

/// The REPL's conversation. Follows the session id the service hands back,
/// so an expired session is replaced once instead of on every line.
pub struct ReplSession<'a> {
    service: &'a ChatService,
    session_id: Option<String>,
}

impl<'a> ReplSession<'a> {
    pub fn new(service: &'a ChatService) -> Self {
        Self {
            service,
            session_id: None,
        }
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub async fn send(&mut self, input: &str) -> quotebot_core::Result<ChatResponse> {
        let response = self.service.send(self.session_id.as_deref(), input).await?;
        if self.session_id.as_deref() != Some(response.session_id.as_str()) {
            tracing::debug!(session = %response.session_id, "REPL session started");
            self.session_id = Some(response.session_id.clone());
        }
        Ok(response)
    }

    pub async fn reset(&mut self) -> quotebot_core::Result<()> {
        if let Some(ref id) = self.session_id {
            self.service.reset(id).await?;
        }
        Ok(())
    }
}

pub async fn run(db: Database, config: &Config, offline: bool, format: OutputFormat) -> Result<()> {
    let (service, llm) = build_service(db, config, offline)?;
    let mut session = ReplSession::new(&service);

    if format == OutputFormat::Cli {
        print_banner();
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        if format == OutputFormat::Cli {
            print!("You: ");
            std::io::stdout().flush()?;
        }

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            if format == OutputFormat::Cli {
                println!("\n{}", FAREWELL);
                println!("{}\n", RULE);
            }
            break;
        }
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("reset") {
            session.reset().await?;
            if format == OutputFormat::Cli {
                println!("Conversation cleared.\n");
            }
            continue;
        }

        respond(&mut session, input, format).await?;
    }

    log_llm_metrics(llm.as_deref());
    Ok(())
}

async fn respond(session: &mut ReplSession<'_>, input: &str, format: OutputFormat) -> Result<()> {
    let message = match session.send(input).await {
        Ok(response) => {
            if format == OutputFormat::Json {
                println!("{}", serde_json::to_string(&response)?);
                return Ok(());
            }
            response.reply.message
        }
        Err(QuoteBotError::InvalidInput(msg)) => msg,
        Err(e) => {
            tracing::error!(error = %e, "Chat turn failed");
            GENERIC_FAILURE.to_string()
        }
    };

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::json!({ "success": false, "error": message }));
        }
        OutputFormat::Cli => {
            println!("\n{}", RULE);
            println!("Bot: {}", message);
            println!("{}\n", RULE);
        }
    }
    Ok(())
}

fn print_banner() {
    println!("\n{}", RULE);
    println!("INSURANCE COMPARISON CHATBOT");
    println!("{}", RULE);
    println!("\nHow to use:");
    println!("  1. Provide 2-3 premium amounts to compare");
    println!("  2. Ask follow-up questions about the results");
    println!("  3. Type 'reset' to start over, 'exit' to quit");
    println!("\n{}", THIN_RULE);
    println!("EXAMPLE CONVERSATIONS:");
    println!("{}", THIN_RULE);
    for (i, (title, comparison, follow_up)) in EXAMPLE_CONVERSATIONS.iter().enumerate() {
        println!("\nExample {}: {}", i + 1, title);
        println!("   You: {}", comparison);
        println!("   You: {}", follow_up);
    }
    println!("\n{}", THIN_RULE);
    println!("VALID FORMATS:");
    println!("{}", THIN_RULE);
    for format in VALID_FORMATS {
        println!("  '{}'", format);
    }
    println!("\n{}", RULE);
    println!("Ready! Ask your first question below:");
    println!("{}\n", RULE);
}
