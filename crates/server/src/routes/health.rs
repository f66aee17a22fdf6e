use crate::state::ServerState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use std::sync::Arc;

/// Health check endpoint (liveness)
pub async fn health_check(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "searchkit-server",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": state.uptime_seconds(),
    }))
}

/// Readiness check endpoint
///
/// The summarizer is loaded before the listener binds, so reaching this
/// handler means the model is in memory. Search is reported as
/// `unconfigured` when credentials are missing.
pub async fn readiness_check(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let search = if state.search.config().has_credentials() {
        "ready"
    } else {
        "unconfigured"
    };

    Json(json!({
        "status": "ready",
        "service": "searchkit-server",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": state.uptime_seconds(),
        "components": {
            "api": "ready",
            "search": search,
            "summarizer": state.summarizer.backend(),
        }
    }))
}
