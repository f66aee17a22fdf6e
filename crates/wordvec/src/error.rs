use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::format::FormatError;

/// Errors surfaced while loading a vocabulary or looking terms up in it.
#[derive(Debug, Error)]
pub enum WordVecError {
    /// Neither the binary cache nor the text model could be loaded.
    #[error("model unavailable at {path}: {reason}")]
    ModelUnavailable { path: PathBuf, reason: String },
    /// A requested term is not part of the vocabulary.
    #[error("term not found in vocabulary: {0}")]
    TermNotFound(String),
    /// The caller supplied something the lookup cannot work with.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Vectors of different lengths were mixed.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    /// A model file exists but could not be parsed.
    #[error("corrupt model file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: FormatError,
    },
    /// Filesystem failures while persisting the cache.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl WordVecError {
    /// True when the error means "no model could be loaded at all".
    pub fn is_model_unavailable(&self) -> bool {
        matches!(self, WordVecError::ModelUnavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn term_not_found_mentions_term() {
        let err = WordVecError::TermNotFound("zyzzyva".into());
        assert!(err.to_string().contains("zyzzyva"));
        assert!(!err.is_model_unavailable());
    }

    #[test]
    fn model_unavailable_mentions_path() {
        let err = WordVecError::ModelUnavailable {
            path: PathBuf::from("./models/Word2VecModel.vec"),
            reason: "missing".into(),
        };
        assert!(err.to_string().contains("Word2VecModel.vec"));
        assert!(err.is_model_unavailable());
    }

    #[test]
    fn io_converts() {
        let err: WordVecError = io::Error::new(io::ErrorKind::PermissionDenied, "nope").into();
        assert!(matches!(err, WordVecError::Io(_)));
    }
}
