//! API error responses
//!
//! Every failure is answered as `{"success": false, "error": "..."}`.
//! Collaborator failures are logged and replaced by a generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use quotebot_core::QuoteBotError;
use serde::{Deserialize, Serialize};

/// Message shown for any internal failure
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request - missing or invalid message
    BadRequest(String),
    /// 500 Internal Server Error - detail stays in the logs
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_FAILURE.to_string()),
        };

        (
            status,
            Json(ErrorBody {
                success: false,
                error,
            }),
        )
            .into_response()
    }
}

impl From<QuoteBotError> for ApiError {
    fn from(err: QuoteBotError) -> Self {
        match err {
            QuoteBotError::InvalidInput(msg) => ApiError::BadRequest(msg),
            other => {
                if other.is_collaborator_failure() {
                    tracing::error!(error = %other, "Collaborator failure while handling chat");
                } else {
                    tracing::error!(error = %other, "Unexpected error while handling chat");
                }
                ApiError::Internal
            }
        }
    }
}
