//! searchkit server: HTTP API for web search and document summarization
//!
//! # API Endpoints
//!
//! - `GET /search?query=<text>` - up to ten results from Google Custom Search,
//!   each `{title, url, description, engine}`
//! - `POST /summarise` - body `{"<id>": "<text>"}`, returns `{"<id>": "<summary>"}`
//! - `GET /health` - Liveness probe
//! - `GET /ready` - Readiness probe
//!
//! Errors are `{"error": "<message>"}`. Upstream search failures keep the
//! upstream status code.
//!
//! # Configuration
//!
//! `API_KEY`, `PROGRAMMABLE_ENGINE_KEY` and `MODEL` (also read from `.env`),
//! an optional `server.toml`, and `SEARCHKIT_SERVER__*` variables such as
//! `SEARCHKIT_SERVER__PORT` or `SEARCHKIT_SERVER__SUMMARIZE__NUM_BEAMS`.
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
