//! Slack Mail Bridge library.
//!
//! Receives Slack slash commands and shortcuts over a signed webhook, collects
//! or extracts the user's message, emails it to the support inbox, and tells
//! the user how it went.
//!
//! The binary in `main.rs` wires this up with real Slack and SMTP clients; the
//! integration tests use the same router with in-memory fakes.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod inbound;
pub mod router;
pub mod routes;
pub mod services;
pub mod slack;
pub mod state;

use axum::Router;

pub use config::BridgeConfig;
pub use state::AppState;

/// Build the application router over `state`.
///
/// Tracing and Sentry layers are added by the binary.
#[must_use]
pub fn build_router(state: AppState) -> Router {
    routes::routes().with_state(state)
}
