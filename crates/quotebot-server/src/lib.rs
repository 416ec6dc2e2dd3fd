//! Quotebot HTTP server
//!
//! Exposes the chat service over HTTP:
//! - `GET /health`
//! - `POST /chat` with `{message, session_id?}`
//! - `POST /reset` with `{session_id?}`

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;

use quotebot_core::{Result, ServerConfig};

/// Bind to the configured address and serve until the process stops
pub async fn serve(config: &ServerConfig, state: AppState) -> Result<()> {
    let addr = config.bind_addr();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(addr = %addr, error = %e, "Failed to bind");
            return Err(e.into());
        }
    };

    tracing::info!(addr = %addr, "Chat server listening");
    axum::serve(listener, create_router(state)).await?;
    Ok(())
}
