//! # HTTP Server for Template Layout
//!
//! JSON API for front-ends that generate templates and need them laid out.
//!
//! ## Usage
//!
//! ```bash
//! deepprint serve --listen 0.0.0.0:8080
//! ```
//!
//! | Route | Method | Body | Response |
//! |-------|--------|------|----------|
//! | `/api/health` | GET | | `{"status": "ok"}` |
//! | `/api/mock` | POST | template | synthesized data context |
//! | `/api/layout` | POST | `{template, data?, scale?, dpi?}` | `{tree, data, synthesized}` |

mod handlers;
mod state;

pub use state::{AppState, DEFAULT_LISTEN_ADDR, ServerConfig};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::error::DeepPrintError;

/// Build the API router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(handlers::layout::health))
        .route("/api/mock", post(handlers::layout::mock))
        .route("/api/layout", post(handlers::layout::layout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
///
/// ## Example
///
/// ```no_run
/// use deepprint::server::{serve, ServerConfig};
///
/// # async fn example() -> Result<(), deepprint::error::DeepPrintError> {
/// let config = ServerConfig {
///     listen_addr: "0.0.0.0:8080".to_string(),
///     ..Default::default()
/// };
///
/// serve(config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: ServerConfig) -> Result<(), DeepPrintError> {
    let app = router(Arc::new(AppState::new(config.clone())));

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|e| {
            DeepPrintError::Server(format!("Failed to bind to {}: {}", config.listen_addr, e))
        })?;

    tracing::info!(listen_addr = %config.listen_addr, "deepprint HTTP server listening");

    axum::serve(listener, app)
        .await
        .map_err(|e| DeepPrintError::Server(format!("Server error: {}", e)))?;

    Ok(())
}
