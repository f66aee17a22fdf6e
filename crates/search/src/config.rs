use serde::{Deserialize, Serialize};

pub const GOOGLE_CUSTOM_SEARCH_URL: &str = "https://www.googleapis.com/customsearch/v1";

/// Credentials and request shape for the Custom Search JSON API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    /// Sent as `key`.
    pub api_key: String,
    /// Programmable search engine id, sent as `cx`.
    pub engine_id: String,
    pub endpoint: String,
    /// Sent as `num`; at most ten results are kept regardless.
    pub num_results: u32,
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            engine_id: String::new(),
            endpoint: GOOGLE_CUSTOM_SEARCH_URL.into(),
            num_results: 10,
            timeout_secs: 30,
        }
    }
}

impl SearchConfig {
    /// Both credentials are present.
    pub fn has_credentials(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.engine_id.trim().is_empty()
    }
}
