//! Sentence embeddings for searchkit.
//!
//! Turns a list of terms into a single sentence vector with a dedicated
//! sentence-encoding model (all-MiniLM-L6-v2 exported to ONNX by default).
//! The terms are joined with single spaces, tokenized, run through the model,
//! mean pooled over real tokens and L2 normalized.
//!
//! Two modes:
//!
//! - **`onnx`**: local model + `tokenizer.json`. Missing files are downloaded
//!   when URLs are configured, otherwise loading fails.
//! - **`fast`**: deterministic hash vectors for tests and offline use.
//!
//! ## Threading notes
//!
//! ONNX sessions are cached per thread. The first encode on a thread pays for
//! the session setup; later calls on that thread reuse it.
//!
//! ```no_run
//! use semantic::{SemanticConfig, SentenceEncoder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), semantic::SemanticError> {
//!     let encoder = SentenceEncoder::load(&SemanticConfig::default()).await?;
//!     let vector = encoder.encode_terms(&["rust", "ownership"])?;
//!     println!("{} dims", vector.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;

mod assets;
mod cache;
mod normalize;
mod onnx;
mod stub;

use std::time::Instant;

use tracing::{debug, info};

pub use crate::config::SemanticConfig;
pub use crate::error::SemanticError;

use crate::assets::{resolve_model_assets, ModelAssets};
use crate::cache::get_or_load_model_handle;
use crate::normalize::l2_normalize_in_place;
use crate::onnx::run_sentence_embeddings;
use crate::stub::make_stub_vector;

#[derive(Debug, Clone)]
enum Backend {
    Onnx(ModelAssets),
    Stub { dim: usize },
}

/// A loaded sentence model. Cheap to clone; the ONNX session itself lives in a
/// per-thread cache keyed by the asset paths.
#[derive(Debug, Clone)]
pub struct SentenceEncoder {
    cfg: SemanticConfig,
    backend: Backend,
}

impl SentenceEncoder {
    /// Resolves (and if needed downloads) the model assets and loads the model once
    /// on the calling thread so that broken files fail here rather than on first use.
    pub async fn load(cfg: &SemanticConfig) -> Result<Self, SemanticError> {
        let start = Instant::now();
        let backend = match cfg.mode.as_str() {
            "fast" => {
                if cfg.stub_dim == 0 {
                    return Err(SemanticError::InvalidConfig(
                        "stub_dim must be positive".into(),
                    ));
                }
                Backend::Stub { dim: cfg.stub_dim }
            }
            "onnx" => {
                let assets = resolve_model_assets(cfg).await?;
                get_or_load_model_handle(&assets)?;
                Backend::Onnx(assets)
            }
            other => {
                return Err(SemanticError::InvalidConfig(format!(
                    "unknown mode '{other}', expected \"onnx\" or \"fast\""
                )))
            }
        };

        info!(
            mode = %cfg.mode,
            model = %cfg.model_name,
            elapsed_micros = start.elapsed().as_micros(),
            "sentence_encoder_ready"
        );

        Ok(Self {
            cfg: cfg.clone(),
            backend,
        })
    }

    pub fn config(&self) -> &SemanticConfig {
        &self.cfg
    }

    /// Joins `terms` with single spaces and encodes the result as one sentence.
    pub fn encode_terms<T>(&self, terms: &[T]) -> Result<Vec<f32>, SemanticError>
    where
        T: AsRef<str>,
    {
        if terms.is_empty() {
            return Err(SemanticError::EmptyInput("no terms supplied".into()));
        }
        let sentence = terms
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<&str>>()
            .join(" ");
        self.encode(&sentence)
    }

    /// Encodes one sentence.
    pub fn encode(&self, text: &str) -> Result<Vec<f32>, SemanticError> {
        self.encode_batch(&[text])?
            .pop()
            .ok_or_else(|| SemanticError::Inference("model returned no outputs".into()))
    }

    /// Encodes each text into its own vector, in input order, with one model call.
    pub fn encode_batch<T>(&self, texts: &[T]) -> Result<Vec<Vec<f32>>, SemanticError>
    where
        T: AsRef<str>,
    {
        let start = Instant::now();
        let vectors = match &self.backend {
            Backend::Stub { dim } => texts
                .iter()
                .map(|t| make_stub_vector(t.as_ref(), *dim, self.cfg.normalize))
                .collect(),
            Backend::Onnx(assets) => {
                let handle = get_or_load_model_handle(assets)?;
                let mut vectors =
                    run_sentence_embeddings(handle.as_ref(), texts, self.cfg.max_sequence_length)?;
                if vectors.len() != texts.len() {
                    return Err(SemanticError::Inference(format!(
                        "model returned {} embeddings for {} inputs",
                        vectors.len(),
                        texts.len()
                    )));
                }
                if self.cfg.normalize {
                    vectors.iter_mut().for_each(|v| l2_normalize_in_place(v));
                }
                vectors
            }
        };

        debug!(
            texts = texts.len(),
            elapsed_micros = start.elapsed().as_micros(),
            "sentence_encode"
        );
        Ok(vectors)
    }
}
