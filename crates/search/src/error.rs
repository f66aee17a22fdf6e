use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    /// The query was absent or only whitespace.
    #[error("no query provided")]
    MissingQuery,
    /// The upstream answered with a non-success status.
    #[error("search upstream returned status {status}")]
    Upstream { status: u16 },
    /// The request never produced a response (DNS, connect, timeout).
    #[error("search request failed: {0}")]
    Transport(String),
    /// The upstream body was not the expected JSON.
    #[error("could not decode search response: {0}")]
    Decode(String),
    #[error("invalid search config: {0}")]
    Config(String),
}

impl SearchError {
    /// Status the HTTP layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            SearchError::MissingQuery => 400,
            SearchError::Upstream { status } => *status,
            SearchError::Transport(_) | SearchError::Decode(_) => 502,
            SearchError::Config(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_status_preserved() {
        assert_eq!(SearchError::Upstream { status: 403 }.status_code(), 403);
        assert_eq!(SearchError::Upstream { status: 429 }.status_code(), 429);
    }

    #[test]
    fn transport_is_bad_gateway() {
        assert_eq!(SearchError::Transport("refused".into()).status_code(), 502);
        assert_eq!(SearchError::MissingQuery.status_code(), 400);
    }
}
