use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// `POST /summarise`: body `{"<id>": "<text>", ...}`, response `{"<id>": "<summary>", ...}`.
///
/// The body is read raw so that missing, malformed and non-object payloads
/// all produce the same 400.
pub async fn summarise(
    State(state): State<Arc<ServerState>>,
    body: Bytes,
) -> ServerResult<Json<BTreeMap<String, String>>> {
    let docs = parse_documents(&body)?;
    let summaries = state.summarizer.summarize(docs).await?;
    Ok(Json(summaries))
}

pub(crate) fn parse_documents(body: &[u8]) -> ServerResult<BTreeMap<String, String>> {
    let value: Value = serde_json::from_slice(body).map_err(|_| ServerError::NotADictionary)?;
    let object = match value {
        Value::Object(map) if !map.is_empty() => map,
        _ => return Err(ServerError::NotADictionary),
    };

    object
        .into_iter()
        .map(|(id, text)| match text {
            Value::String(text) => Ok((id, text)),
            _ => Err(ServerError::BadRequest(format!(
                "document {id:?} must be a string"
            ))),
        })
        .collect()
}
