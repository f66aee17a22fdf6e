//! API route handlers
//!
//! - `health`: liveness and readiness
//! - `search`: web search proxy
//! - `summarise`: batch document summarization

pub mod health;
pub mod search;
pub mod summarise;

use crate::error::{ServerError, ServerResult};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// API version and base info (GET /)
pub async fn api_info() -> ServerResult<impl IntoResponse> {
    Ok(Json(json!({
        "name": "searchkit",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "GET /search?query=",
            "POST /summarise",
            "/health",
            "/ready"
        ]
    })))
}

/// 404 Not Found handler
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
