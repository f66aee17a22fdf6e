use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::{Query, State};
use axum::Json;
use search::SearchResult;
use std::sync::Arc;

/// `GET /search?query=...`: up to ten web results from the configured engine.
///
/// Parameters are read as raw pairs so a repeated `query` resolves to its first
/// value instead of a rejection.
pub async fn search(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> ServerResult<Json<Vec<SearchResult>>> {
    let query = first_query(&params).ok_or(ServerError::MissingQuery)?;

    let results = state.search.search(query).await?;
    Ok(Json(results))
}

fn first_query(params: &[(String, String)]) -> Option<&str> {
    params
        .iter()
        .find(|(key, _)| key == "query")
        .map(|(_, value)| value.as_str())
        .filter(|q| !q.trim().is_empty())
}
