//! Word-vector vocabulary for searchkit.
//!
//! Loads a pretrained word2vec model, keeps a binary copy next to it so later
//! processes skip the slow text parse, and answers term lookups.
//!
//! - First load: parse the `.vec` text model, then write `model.bin` through a
//!   temporary file and an atomic rename.
//! - Later loads: read `model.bin` directly. A corrupt cache is ignored and
//!   rebuilt from the text model.
//! - Lookups are all-or-nothing: one unknown term fails the whole batch with
//!   [`WordVecError::TermNotFound`].
//!
//! ```no_run
//! use wordvec::{embed_terms, WordVecConfig};
//!
//! let vectors = embed_terms(&WordVecConfig::default(), &["rust", "ownership"])?;
//! assert_eq!(vectors.len(), 2);
//! # Ok::<(), wordvec::WordVecError>(())
//! ```

pub mod config;
pub mod error;
pub mod format;

mod average;
mod cache;
mod vocab;

pub use crate::average::mean_vector;
pub use crate::cache::{load_vocabulary, load_with_source, persist_binary, VocabularySource};
pub use crate::config::WordVecConfig;
pub use crate::error::WordVecError;
pub use crate::format::FormatError;
pub use crate::vocab::Vocabulary;

/// Loads the configured vocabulary and looks every term up in input order.
pub fn embed_terms<T>(cfg: &WordVecConfig, terms: &[T]) -> Result<Vec<Vec<f32>>, WordVecError>
where
    T: AsRef<str>,
{
    if terms.is_empty() {
        return Err(WordVecError::InvalidInput("no terms supplied".into()));
    }
    let vocab = load_vocabulary(cfg)?;
    vocab.lookup_all(terms)
}
