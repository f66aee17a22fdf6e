use std::time::{Duration, Instant};

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{SearchConfig, SearchError};

/// Most results ever returned for one query.
pub const MAX_RESULTS: usize = 10;

/// One normalized search hit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub description: String,
    pub engine: String,
}

#[derive(Debug, Deserialize)]
struct GoogleResponse {
    #[serde(default)]
    items: Vec<GoogleItem>,
}

#[derive(Debug, Deserialize)]
struct GoogleItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

impl From<GoogleItem> for SearchResult {
    fn from(item: GoogleItem) -> Self {
        Self {
            title: item.title,
            url: item.link,
            description: item.snippet,
            engine: "Google".into(),
        }
    }
}

/// Forwards queries to the Custom Search JSON API. One request per query, no retries.
#[derive(Debug, Clone)]
pub struct SearchClient {
    config: SearchConfig,
    client: Client,
}

impl SearchClient {
    pub fn new(config: SearchConfig) -> Result<Self, SearchError> {
        if config.endpoint.trim().is_empty() {
            return Err(SearchError::Config("endpoint is empty".into()));
        }
        if !config.has_credentials() {
            warn!("search credentials missing; upstream will reject requests");
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| SearchError::Config(e.to_string()))?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Runs `query` and returns at most [`MAX_RESULTS`] records in upstream order.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::MissingQuery);
        }

        let start = Instant::now();
        let num = self.config.num_results.to_string();
        let response = self
            .client
            .get(&self.config.endpoint)
            .query(&[
                ("q", query),
                ("key", self.config.api_key.as_str()),
                ("cx", self.config.engine_id.as_str()),
                ("num", num.as_str()),
            ])
            .send()
            .await
            .map_err(|e| SearchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                status = status.as_u16(),
                body = %body.chars().take(200).collect::<String>(),
                "search_upstream_failed"
            );
            return Err(SearchError::Upstream {
                status: status.as_u16(),
            });
        }

        let body: GoogleResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Decode(e.to_string()))?;
        debug!(items = body.items.len(), "search_upstream_items");

        let results: Vec<SearchResult> = body
            .items
            .into_iter()
            .take(MAX_RESULTS)
            .map(SearchResult::from)
            .collect();

        info!(
            results = results.len(),
            elapsed_micros = start.elapsed().as_micros(),
            "search_success"
        );
        Ok(results)
    }
}
