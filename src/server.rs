//! HTTP surface: the webhook endpoint and a root health probe.
//!
//! Status mapping: 200 for anything handled (including acknowledged
//! no-ops), 400 for bodies we cannot route (malformed shape, routing
//! miss), 500 when the downstream task API fails. Nothing is retried —
//! the telephony provider retries on non-2xx, and that is the only
//! retry mechanism in the system.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use tracing::{error, warn};

use crate::error::{Error, EventError};
use crate::event::WebhookEnvelope;
use crate::relay::{Relay, RelayOutcome};

#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<Relay>,
}

/// Build the application router.
pub fn router(relay: Arc<Relay>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/webhook", post(webhook))
        .with_state(AppState { relay })
}

async fn root() -> &'static str {
    "Server is running!"
}

/// The single inbound endpoint the telephony provider posts to.
///
/// The body is deserialized by hand rather than through the `Json`
/// extractor: webhook senders are sloppy about content-type headers, and
/// every parse problem should be a plain 400.
async fn webhook(State(state): State<AppState>, body: Bytes) -> (StatusCode, String) {
    let envelope: WebhookEnvelope = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(e) => {
            let err = EventError::MalformedBody(e.to_string());
            warn!(error = %err, "rejecting webhook body");
            return (StatusCode::BAD_REQUEST, err.to_string());
        }
    };
    let event_type = envelope.event_type.clone();

    match state.relay.process(envelope).await {
        Ok(RelayOutcome::TaskCreated { team, .. }) => {
            (StatusCode::OK, format!("Task created for {team}"))
        }
        Ok(RelayOutcome::Ignored { .. }) => (StatusCode::OK, "Event acknowledged".to_string()),
        Err(Error::Event(e)) => {
            warn!(%event_type, error = %e, "rejecting invalid event");
            (StatusCode::BAD_REQUEST, e.to_string())
        }
        Err(Error::NoTeam { number }) => {
            warn!(%event_type, %number, "no team for dialed number");
            (
                StatusCode::BAD_REQUEST,
                format!("No team registered for {number}"),
            )
        }
        Err(e) => {
            error!(%event_type, error = %e, "task creation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Task creation failed".to_string(),
            )
        }
    }
}
