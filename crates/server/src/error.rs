use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use search::SearchError;
use serde_json::json;
use summarize::SummarizeError;

pub type ServerResult<T> = Result<T, ServerError>;

pub const NO_QUERY: &str = "No query provided";
pub const SEARCH_FAILED: &str = "Failed to fetch search results";
pub const NOT_A_DICTIONARY: &str = "Invalid JSON data: expected a dictionary";

/// Server error types. Every response body is `{"error": "<message>"}`.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("No query provided")]
    MissingQuery,

    #[error("Invalid JSON data: expected a dictionary")]
    NotADictionary,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Failed to fetch search results")]
    SearchFailed(#[source] SearchError),

    #[error("Summarization failed: {0}")]
    Summarize(#[from] SummarizeError),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found")]
    NotFound,
}

impl From<SearchError> for ServerError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::MissingQuery => ServerError::MissingQuery,
            other => ServerError::SearchFailed(other),
        }
    }
}

impl ServerError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::MissingQuery | ServerError::NotADictionary | ServerError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ServerError::SearchFailed(err) => {
                StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            ServerError::Summarize(err) => match err {
                SummarizeError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                SummarizeError::ModelUnavailable(_) | SummarizeError::WorkerStopped => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
                SummarizeError::InvalidConfig(_) | SummarizeError::Inference(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ServerError::NotFound => StatusCode::NOT_FOUND,
            ServerError::Internal(_) | ServerError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable code used in logs
    pub fn error_code(&self) -> &'static str {
        match self {
            ServerError::MissingQuery | ServerError::NotADictionary | ServerError::BadRequest(_) => {
                "INVALID_INPUT"
            }
            ServerError::SearchFailed(_) => "UPSTREAM_FAILURE",
            ServerError::Summarize(SummarizeError::InvalidInput(_)) => "INVALID_INPUT",
            ServerError::Summarize(SummarizeError::ModelUnavailable(_))
            | ServerError::Summarize(SummarizeError::WorkerStopped) => "MODEL_UNAVAILABLE",
            ServerError::Summarize(_) => "INFERENCE_ERROR",
            ServerError::Internal(_) => "INTERNAL_ERROR",
            ServerError::Config(_) => "CONFIG_ERROR",
            ServerError::NotFound => "NOT_FOUND",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = ?self, "request_failed");
        } else {
            tracing::warn!(code = self.error_code(), error = %self, "request_rejected");
        }

        let message = match &self {
            ServerError::Summarize(SummarizeError::InvalidInput(_)) => NOT_A_DICTIONARY.to_string(),
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        ServerError::Internal(format!("IO error: {err}"))
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(err: anyhow::Error) -> Self {
        ServerError::Internal(err.to_string())
    }
}
