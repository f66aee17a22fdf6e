//! Web search gateway for searchkit.
//!
//! Sends a query to the Google Custom Search JSON API and normalizes the first
//! ten items into [`SearchResult`] records (`title`, `url`, `description`,
//! `engine = "Google"`). Non-success upstream statuses come back as
//! [`SearchError::Upstream`] carrying the status so the HTTP layer can pass it on.

pub mod config;
pub mod error;

mod client;

pub use crate::client::{SearchClient, SearchResult, MAX_RESULTS};
pub use crate::config::{SearchConfig, GOOGLE_CUSTOM_SEARCH_URL};
pub use crate::error::SearchError;
