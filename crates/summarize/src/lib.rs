//! Document summarization for searchkit.
//!
//! Maps document id → text to document id → summary. All documents of a
//! request go through one batched generation: prompts are truncated to
//! `max_input_tokens`, left padded with the end token, and decoded with beam
//! search (`num_beams`, `no_repeat_ngram_size`) for at most `max_length` new
//! tokens. Special tokens are dropped when decoding.
//!
//! The model is loaded once by [`Summarizer::load`] on a dedicated inference
//! thread and reused for every call.
//!
//! ```no_run
//! use std::collections::BTreeMap;
//! use summarize::{SummarizeConfig, Summarizer};
//!
//! # async fn run() -> Result<(), summarize::SummarizeError> {
//! let summarizer = Summarizer::load(&SummarizeConfig::default())?;
//! let docs = BTreeMap::from([("doc1".to_string(), "Long article text ...".to_string())]);
//! let summaries = summarizer.summarize(docs).await?;
//! println!("{}", summaries["doc1"]);
//! # Ok(())
//! # }
//! ```

pub mod beam;
pub mod config;
pub mod error;

mod onnx;
mod service;
mod stub;

pub use crate::config::SummarizeConfig;
pub use crate::error::SummarizeError;
pub use crate::service::{SummaryEngine, Summarizer};
