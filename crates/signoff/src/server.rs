//! HTTP server receiving GitHub webhook deliveries.

use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use crate::event::PullRequestEvent;
use crate::handler::PullRequestHandler;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub handler: Arc<PullRequestHandler>,
}

/// Build the HTTP router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/webhooks/github", post(github_webhook_handler))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn run_server(state: AppState, addr: &str) -> Result<()> {
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("signoff listening on {addr}");

    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Handle a GitHub delivery. Only `pull_request` events are processed;
/// handler failures are answered with 500 so GitHub records the delivery as
/// failed.
async fn github_webhook_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let event_type = headers
        .get("X-GitHub-Event")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    let delivery_id = headers
        .get("X-GitHub-Delivery")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    info!(
        event_type = %event_type,
        delivery_id = %delivery_id,
        "Received GitHub webhook"
    );

    if event_type != "pull_request" {
        debug!(event_type = %event_type, "Ignoring non-pull_request event");
        return (
            StatusCode::OK,
            Json(json!({
                "status": "ignored",
                "reason": "not_pull_request_event"
            })),
        );
    }

    let event: PullRequestEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            error!(error = %e, delivery_id = %delivery_id, "Failed to parse pull_request payload");
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "status": "error",
                    "error": format!("invalid payload: {e}")
                })),
            );
        }
    };

    match state.handler.handle(&event).await {
        Ok(report) => (
            StatusCode::OK,
            Json(json!({
                "status": "processed",
                "delivery_id": delivery_id,
                "report": report
            })),
        ),
        Err(e) => {
            error!(error = %e, delivery_id = %delivery_id, "Failed to handle pull_request event");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "status": "error",
                    "delivery_id": delivery_id,
                    "error": e.to_string()
                })),
            )
        }
    }
}
