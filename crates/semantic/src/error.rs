use std::io;
use thiserror::Error;

/// Errors surfaced while loading or running the sentence encoder.
#[derive(Debug, Error)]
pub enum SemanticError {
    /// The ONNX model could not be located locally and no download URL was provided.
    #[error("model file not found: {0}")]
    ModelNotFound(String),
    /// The tokenizer JSON is missing and there was no remote URL to fetch it from.
    #[error("tokenizer missing: {0}")]
    TokenizerMissing(String),
    /// Configuration is inconsistent (unknown mode, zero dimensions, ...).
    #[error("invalid semantic config: {0}")]
    InvalidConfig(String),
    /// Unable to download remote assets.
    #[error("download failed: {0}")]
    Download(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    /// ONNX Runtime or tokenizer errors.
    #[error("inference failure: {0}")]
    Inference(String),
    /// Nothing to encode.
    #[error("empty input: {0}")]
    EmptyInput(String),
}

impl SemanticError {
    /// True for every failure that means the model could not produce a vector,
    /// as opposed to the caller passing nothing to encode.
    pub fn is_model_failure(&self) -> bool {
        !matches!(self, SemanticError::EmptyInput(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_model_not_found() {
        let err = SemanticError::ModelNotFound("/path/to/model.onnx".into());
        assert!(err.to_string().contains("model file not found"));
        assert!(err.to_string().contains("/path/to/model.onnx"));
    }

    #[test]
    fn error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: SemanticError = io_err.into();
        assert!(err.to_string().contains("io error"));
        assert!(err.is_model_failure());
    }

    #[test]
    fn load_and_encode_failures_are_model_failures() {
        for err in [
            SemanticError::ModelNotFound("a".into()),
            SemanticError::TokenizerMissing("b".into()),
            SemanticError::InvalidConfig("c".into()),
            SemanticError::Download("d".into()),
            SemanticError::Inference("e".into()),
        ] {
            assert!(err.is_model_failure(), "{err}");
        }
        assert!(!SemanticError::EmptyInput("no terms".into()).is_model_failure());
    }
}
