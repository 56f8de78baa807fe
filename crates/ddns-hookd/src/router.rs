//! Axum router for the hook
//!
//! ## Routes
//!
//! ```text
//! /
//! ├── GET|POST /health  - liveness probe, always "hello\n"
//! └── ANY      /*       - update request (query string and/or form body);
//!                          every path other than /health lands here
//! ```
//!
//! The handlers only translate HTTP to and from the orchestrator. Every
//! request gets a child of the server's shutdown token, so shutting down
//! cancels work that is still running.

use axum::Router;
use axum::extract::rejection::{FormRejection, QueryRejection};
use axum::extract::{Form, Query, State};
use axum::http::{Method, StatusCode};
use axum::routing::get;
use ddns_hook_core::{UpdateForm, UpdateOrchestrator};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Body of the health endpoint
pub const HEALTH_BODY: &str = "hello\n";

#[derive(Clone)]
struct AppState {
    orchestrator: UpdateOrchestrator,
    shutdown: CancellationToken,
}

/// Build the router serving the health and update endpoints
pub fn build_router(orchestrator: UpdateOrchestrator, shutdown: CancellationToken) -> Router {
    Router::new()
        .route("/health", get(health).post(health))
        .fallback(update)
        .with_state(AppState {
            orchestrator,
            shutdown,
        })
}

async fn health() -> &'static str {
    HEALTH_BODY
}

/// Update endpoint
///
/// Fields may come from the query string, a urlencoded body, or both. A
/// non-empty body value wins over the query value. Anything that cannot be
/// read as a form counts as empty, so validation reports the missing fields.
async fn update(
    State(state): State<AppState>,
    method: Method,
    query: Result<Query<UpdateForm>, QueryRejection>,
    body: Result<Form<UpdateForm>, FormRejection>,
) -> (StatusCode, String) {
    let query = query.map(|Query(form)| form).unwrap_or_else(|rejection| {
        debug!("Ignoring unreadable query string: {}", rejection);
        UpdateForm::default()
    });
    let body = body.map(|Form(form)| form).unwrap_or_else(|rejection| {
        debug!("Ignoring request body: {}", rejection);
        UpdateForm::default()
    });

    debug!(%method, "Update request received");

    let response = state
        .orchestrator
        .handle(query.merged_with(body), state.shutdown.child_token())
        .await;

    let status =
        StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, response.body)
}
