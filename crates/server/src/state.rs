use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use search::SearchClient;
use std::sync::Arc;
use std::time::Instant;
use summarize::Summarizer;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Upstream web search client
    pub search: Arc<SearchClient>,

    /// Summarization model, loaded once at startup
    pub summarizer: Arc<Summarizer>,

    started_at: Instant,
}

impl ServerState {
    /// Create new server state. Blocks until the summarization model is loaded.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let search = SearchClient::new(config.search.clone())
            .map_err(|e| ServerError::Config(e.to_string()))?;
        let summarizer = Summarizer::load(&config.summarize)?;
        Ok(Self::with_parts(config, search, summarizer))
    }

    /// Assemble state from already constructed services.
    pub fn with_parts(config: ServerConfig, search: SearchClient, summarizer: Summarizer) -> Self {
        Self {
            config: Arc::new(config),
            search: Arc::new(search),
            summarizer: Arc::new(summarizer),
            started_at: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
