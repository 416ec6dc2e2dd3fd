//! Router tests driving the chat endpoints with scripted collaborators.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use quotebot_core::search::PlanMetadata;
use quotebot_core::{
    AnswerGenerator, ChatConfig, ChatService, DialogueController, LLMServiceConfig, PlanFilter,
    PlanRecord, PlanRetriever, PlanStore, QuoteBotError, Result, RuleBasedClassifier, ScoredPlan,
    Turn, VLLMClient,
};
use quotebot_server::error::GENERIC_FAILURE;
use quotebot_server::{create_router, AppState};

// =============================================================================
// Helpers
// =============================================================================

struct Catalogue;

#[async_trait]
impl PlanStore for Catalogue {
    async fn similarity_search(
        &self,
        _query: &str,
        _k: usize,
        filter: &PlanFilter,
    ) -> Result<Vec<ScoredPlan>> {
        if ![18000.0, 22500.0, 28000.0].contains(&filter.premium) {
            return Ok(vec![]);
        }
        Ok(vec![ScoredPlan {
            record: PlanRecord {
                id: filter.premium as i64,
                premium: filter.premium,
                title: format!("Plan {}", filter.premium),
                content: format!("Plan at {}", filter.premium),
                metadata: PlanMetadata::new(),
            },
            score: 1.0,
        }])
    }
}

/// Answers with the plan count, or fails with an internal-looking error
struct Generator {
    down: Arc<AtomicBool>,
}

#[async_trait]
impl AnswerGenerator for Generator {
    async fn generate(&self, _u: &str, records: &[PlanRecord], history: &[Turn]) -> Result<String> {
        if self.down.load(Ordering::SeqCst) {
            return Err(QuoteBotError::ExternalError(
                "upstream 502 from inference host 10.0.0.7".into(),
            ));
        }
        Ok(format!("compared {} plans after {} turns", records.len(), history.len()))
    }
}

fn make_state(down: Arc<AtomicBool>) -> AppState {
    let controller = DialogueController::new(
        Arc::new(RuleBasedClassifier::new()),
        PlanRetriever::new(Arc::new(Catalogue)),
        Arc::new(Generator { down }),
    );
    AppState::new(ChatService::new(controller, &ChatConfig::default()))
}

fn make_app(down: Arc<AtomicBool>) -> axum::Router {
    create_router(make_state(down))
}

fn healthy_app() -> axum::Router {
    make_app(Arc::new(AtomicBool::new(false)))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_health() {
    let resp = healthy_app()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["status"], "healthy");
    assert!(body.get("llm").is_none());
}

#[tokio::test]
async fn test_health_reports_llm_metrics() {
    let llm = Arc::new(VLLMClient::new(LLMServiceConfig::default()).unwrap());
    let state = make_state(Arc::new(AtomicBool::new(false))).with_llm(llm);

    let resp = create_router(state)
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["llm"]["total_requests"], 0);
    assert_eq!(body["llm"]["total_errors"], 0);
}

#[tokio::test]
async fn test_chat_answers_and_returns_session() {
    let resp = healthy_app()
        .oneshot(post_json(
            "/chat",
            json!({"message": "compare 18000, 22500, 28000"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["answered"], true);
    assert_eq!(body["response"], "compared 3 plans after 0 turns");
    assert!(body["session_id"].as_str().is_some());
}

#[tokio::test]
async fn test_follow_up_in_same_session() {
    let app = healthy_app();

    let first = body_json(
        app.clone()
            .oneshot(post_json("/chat", json!({"message": "compare 18000, 22500"})))
            .await
            .unwrap(),
    )
    .await;
    let session_id = first["session_id"].as_str().unwrap().to_string();

    let second = body_json(
        app.oneshot(post_json(
            "/chat",
            json!({"message": "which has no deductible?", "session_id": session_id}),
        ))
        .await
        .unwrap(),
    )
    .await;

    assert_eq!(second["session_id"], session_id.as_str());
    assert_eq!(second["response"], "compared 2 plans after 1 turns");
}

#[tokio::test]
async fn test_rejection_is_a_successful_response() {
    let resp = healthy_app()
        .oneshot(post_json("/chat", json!({"message": "what is the weather?"})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["answered"], false);
    assert!(body["response"]
        .as_str()
        .unwrap()
        .starts_with("Please provide 2-3 premium amounts to compare."));
}

#[tokio::test]
async fn test_missing_message_is_bad_request() {
    let resp = healthy_app()
        .oneshot(post_json("/chat", json!({})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "message is required");
}

#[tokio::test]
async fn test_blank_message_is_bad_request() {
    let resp = healthy_app()
        .oneshot(post_json("/chat", json!({"message": "   "})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let req = Request::post("/chat")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let resp = healthy_app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_collaborator_failure_is_generic_and_keeps_session() {
    let down = Arc::new(AtomicBool::new(false));
    let app = make_app(down.clone());

    let first = body_json(
        app.clone()
            .oneshot(post_json("/chat", json!({"message": "compare 18000, 22500"})))
            .await
            .unwrap(),
    )
    .await;
    let session_id = first["session_id"].as_str().unwrap().to_string();

    down.store(true, Ordering::SeqCst);
    let resp = app
        .clone()
        .oneshot(post_json(
            "/chat",
            json!({"message": "which is cheaper?", "session_id": session_id}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(resp).await;
    assert_eq!(body["error"], GENERIC_FAILURE);
    assert!(!body.to_string().contains("10.0.0.7"));

    down.store(false, Ordering::SeqCst);
    let retry = body_json(
        app.oneshot(post_json(
            "/chat",
            json!({"message": "which is cheaper?", "session_id": session_id}),
        ))
        .await
        .unwrap(),
    )
    .await;
    // Only the first comparison is in history
    assert_eq!(retry["response"], "compared 2 plans after 1 turns");
}

#[tokio::test]
async fn test_reset_clears_history() {
    let app = healthy_app();

    let first = body_json(
        app.clone()
            .oneshot(post_json("/chat", json!({"message": "compare 18000, 22500"})))
            .await
            .unwrap(),
    )
    .await;
    let session_id = first["session_id"].as_str().unwrap().to_string();

    let reset = app
        .clone()
        .oneshot(post_json("/reset", json!({"session_id": session_id})))
        .await
        .unwrap();
    assert_eq!(reset.status(), StatusCode::OK);
    assert_eq!(body_json(reset).await["success"], true);

    let after = body_json(
        app.oneshot(post_json(
            "/chat",
            json!({"message": "which is cheaper?", "session_id": session_id}),
        ))
        .await
        .unwrap(),
    )
    .await;
    assert_eq!(
        after["response"],
        "Please ask a comparison question first with 2-3 premiums."
    );
}

#[tokio::test]
async fn test_reset_without_body() {
    let resp = healthy_app()
        .oneshot(Request::post("/reset").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
