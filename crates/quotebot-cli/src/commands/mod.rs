//! CLI command implementations

pub mod ask;
pub mod chat;
pub mod ingest;
pub mod plans;
pub mod serve;
pub mod status;

use anyhow::Result;
use quotebot_core::llm::HistoryBudget;
use quotebot_core::{
    AnswerGenerator, ChatService, Config, Database, DialogueController,
    ExtractiveAnswerGenerator, HttpAnswerGenerator, HttpEmbedder, HttpIntentClassifier,
    IntentClassifier, LLMClient, PlanRetriever, RuleBasedClassifier, SqlitePlanStore, VLLMClient,
};
use std::sync::{Arc, Mutex};

/// Wire the dialogue collaborators and wrap them in a chat service.
///
/// Offline mode uses the rule-based classifier and extractive answers and
/// never contacts the LLM service. Online mode also hands back the LLM
/// client so callers can report its request counters.
pub fn build_service(
    db: Database,
    config: &Config,
    offline: bool,
) -> Result<(ChatService, Option<Arc<VLLMClient>>)> {
    let collection = config.store.collection.clone();
    let embedded = db.count_plan_embeddings(&collection)?;
    let db = Arc::new(Mutex::new(db));
    let store = SqlitePlanStore::shared(db, collection);

    let (classifier, generator, store, llm): (
        Arc<dyn IntentClassifier>,
        Arc<dyn AnswerGenerator>,
        SqlitePlanStore,
        Option<Arc<VLLMClient>>,
    ) = if offline {
        tracing::debug!("Using offline collaborators");
        (
            Arc::new(RuleBasedClassifier::new()),
            Arc::new(ExtractiveAnswerGenerator::new()),
            store,
            None,
        )
    } else {
        let llm = Arc::new(VLLMClient::new(config.llm_service.clone())?);
        let client: Arc<dyn LLMClient> = llm.clone();
        let store = if embedded > 0 {
            store.with_embedder(Arc::new(HttpEmbedder::new(
                client.clone(),
                config.llm_service.embedding_model.clone(),
            )))
        } else {
            store
        };
        tracing::debug!(url = %config.llm_service.url, embedded, "Using LLM collaborators");
        (
            Arc::new(HttpIntentClassifier::new(
                client.clone(),
                config.chat.classifier,
            )),
            Arc::new(HttpAnswerGenerator::new(
                client,
                config.chat.generator,
                HistoryBudget::from_chat_config(&config.chat),
            )),
            store,
            Some(llm),
        )
    };

    let controller = DialogueController::new(
        classifier,
        PlanRetriever::new(Arc::new(store)),
        generator,
    );
    Ok((ChatService::new(controller, &config.chat), llm))
}

/// Log the LLM client's request counters at the end of a command
pub fn log_llm_metrics(llm: Option<&VLLMClient>) {
    if let Some(client) = llm {
        let metrics = client.metrics();
        tracing::debug!(
            requests = metrics.total_requests,
            errors = metrics.total_errors,
            avg_latency_ms = metrics.avg_latency_ms,
            "LLM usage"
        );
    }
}
