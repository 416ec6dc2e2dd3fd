//! Route handlers

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use quotebot_core::MetricsSnapshot;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: Option<String>,
    pub session_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResetRequest {
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
    pub active_sessions: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm: Option<MetricsSnapshot>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponseBody {
    pub success: bool,
    pub response: String,
    pub session_id: String,
    /// `true` when the exchange was recorded as a turn
    pub answered: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResetResponse {
    pub success: bool,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        active_sessions: state.chat.sessions().len(),
        llm: state.llm.as_ref().map(|client| client.metrics()),
    })
}

pub async fn chat(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ChatResponseBody>, ApiError> {
    let request: ChatRequest = serde_json::from_slice(&body)
        .map_err(|_| ApiError::BadRequest("message is required".to_string()))?;
    let message = request
        .message
        .ok_or_else(|| ApiError::BadRequest("message is required".to_string()))?;

    let response = state
        .chat
        .send(request.session_id.as_deref(), &message)
        .await?;

    Ok(Json(ChatResponseBody {
        success: true,
        answered: response.reply.is_answered(),
        response: response.reply.message,
        session_id: response.session_id,
    }))
}

pub async fn reset(State(state): State<AppState>, body: Bytes) -> Result<Json<ResetResponse>, ApiError> {
    let request: ResetRequest = if body.is_empty() {
        ResetRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|_| ApiError::BadRequest("invalid reset request".to_string()))?
    };

    if let Some(ref session_id) = request.session_id {
        state.chat.reset(session_id).await?;
    }
    Ok(Json(ResetResponse { success: true }))
}
