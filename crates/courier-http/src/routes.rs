//! HTTP route handlers for the broker.
//!
//! Three operations cross this boundary: submitters POST `/run-command`
//! and block until their result arrives (or 408), agents GET `/commands`
//! to pick up work and POST `/results` to hand results back. Agents
//! identify their session with the `x-session-key` header; the
//! configured privileged key addresses the default/anonymous session.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Json, Response},
};
use courier_core::{
    await_result, CommandArg, CommandId, CommandResult, CommandSpec, SessionSelector, WaitOutcome,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use super::SharedState;

/// Header carrying the session key on agent-facing routes.
pub const SESSION_KEY_HEADER: &str = "x-session-key";

/// Request body for POST /run-command.
#[derive(Deserialize)]
pub struct SubmitRequest {
    /// The command text to run.
    pub command: String,

    /// Optional destination the agent should act on.
    pub server_name: Option<String>,

    /// Execution-width hint, defaults to 1.
    pub threads: Option<u32>,

    /// Ordered scalar arguments.
    #[serde(default)]
    pub args: Vec<CommandArg>,

    /// Session key; absent or empty targets the default session.
    pub session_key: Option<String>,
}

/// Request body for POST /results. Field names match what agents send.
#[derive(Deserialize)]
pub struct ResultRequest {
    pub id: CommandId,
    pub result: String,
    #[serde(rename = "isHtml", default)]
    pub is_html: bool,
}

fn session_key(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(SESSION_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
}

fn missing_key_response() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "detail": format!("Missing {} header", SESSION_KEY_HEADER) })),
    )
        .into_response()
}

/// Handler for GET /
pub async fn home() -> Json<serde_json::Value> {
    Json(json!({ "message": "Courier command relay is running" }))
}

/// Handler for POST /run-command
///
/// Submits the command and blocks until a matching result is posted or
/// the wait timeout elapses. Markup results are returned as raw HTML,
/// everything else as a JSON success envelope.
pub async fn run_command(
    State(state): State<Arc<SharedState>>,
    Json(request): Json<SubmitRequest>,
) -> Response {
    let selector = match request.session_key.as_deref() {
        // An absent (or blank) key is an anonymous submitter.
        None | Some("") => SessionSelector::Default,
        Some(key) => state.selector_for_key(key),
    };

    let spec = CommandSpec {
        body: request.command,
        target: request.server_name,
        threads: request.threads.unwrap_or(1),
        args: request.args,
    };

    let id = match state.broker.submit(&selector, spec) {
        Ok(id) => id,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "detail": e.to_string() })),
            )
                .into_response();
        }
    };

    match await_result(&state.broker, &selector, &id, state.wait_timeout).await {
        WaitOutcome::Fulfilled(CommandResult {
            payload,
            is_markup: true,
        }) => Html(payload).into_response(),
        WaitOutcome::Fulfilled(CommandResult { payload, .. }) => {
            Json(json!({ "status": "success", "result": payload })).into_response()
        }
        WaitOutcome::TimedOut => {
            log::debug!("run-command: {} timed out", id);
            (
                StatusCode::REQUEST_TIMEOUT,
                Json(json!({ "detail": "Command execution took too long" })),
            )
                .into_response()
        }
    }
}

/// Handler for GET /commands
///
/// Pops the oldest queued command for the caller's session, or
/// `{"command": null}` when the queue is empty.
pub async fn next_command(
    State(state): State<Arc<SharedState>>,
    headers: HeaderMap,
) -> Response {
    let Some(key) = session_key(&headers) else {
        return missing_key_response();
    };
    let selector = state.selector_for_key(key);

    match state.broker.fetch(&selector) {
        Some(command) => Json(command).into_response(),
        None => Json(json!({ "command": null })).into_response(),
    }
}

/// Handler for POST /results
///
/// Stores the result under the caller's session, waking any submitter
/// blocked on that command id.
pub async fn post_result(
    State(state): State<Arc<SharedState>>,
    headers: HeaderMap,
    Json(request): Json<ResultRequest>,
) -> Response {
    let Some(key) = session_key(&headers) else {
        return missing_key_response();
    };
    let selector = state.selector_for_key(key);

    state.broker.post(
        &selector,
        request.id,
        CommandResult {
            payload: request.result,
            is_markup: request.is_html,
        },
    );

    Json(json!({ "status": "success", "message": "Result received" })).into_response()
}

// ============================================================================
// TESTS
// ============================================================================
