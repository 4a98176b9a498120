//! HTTP route handlers for the bridge.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! POST /slack/events           - Slack webhook (commands, interactivity, events)
//! ```

use axum::{Router, routing::get};

use crate::state::AppState;

pub mod slack;

/// Build all bridge routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .merge(slack::router())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check Slack or the relay.
async fn health() -> &'static str {
    "ok"
}
