//! Slack webhook handler.
//!
//! Verifies, routes and acknowledges every Slack callback. Interaction work
//! runs on a tracked task after the acknowledgement has been returned, so Slack
//! always gets its answer inside the three-second window and shutdown still
//! finishes what was acknowledged.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::json;
use tracing::{debug, info, instrument};

use crate::error::AppError;
use crate::inbound::InboundRequest;
use crate::router::{Route, route};
use crate::state::AppState;

/// Create Slack webhook routes.
pub fn router() -> Router<AppState> {
    Router::new().route("/slack/events", post(handle_event))
}

/// Handle a Slack webhook call.
///
/// Unverified requests get `401`, other content types `415`, undecodable
/// bodies `400`. Everything else is answered with `200`.
#[instrument(skip(state, headers, body), fields(bytes = body.len()))]
async fn handle_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let request = InboundRequest::new(headers, body);
    let verification = state.verifier().verify(&request);

    match route(&verification, &request, &state.config().slack.command)? {
        Route::Challenge(challenge) => {
            info!("Answering URL verification challenge");
            Ok(Json(json!({ "challenge": challenge })).into_response())
        }
        Route::Dispatch(dispatch) => {
            let kind = dispatch.kind();
            info!(kind, "Interaction acknowledged");

            state.spawn_interaction(dispatch);

            Ok(StatusCode::OK.into_response())
        }
        Route::Ignored(what) => {
            debug!(what = %what, "Acknowledged without action");
            Ok(StatusCode::OK.into_response())
        }
    }
}
