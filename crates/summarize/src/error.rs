use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SummarizeError {
    /// Model or tokenizer could not be loaded.
    #[error("summarization model unavailable: {0}")]
    ModelUnavailable(String),
    #[error("invalid summarize config: {0}")]
    InvalidConfig(String),
    /// The request itself was unusable (no documents, ...).
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Tokenizer or ONNX Runtime failed during generation.
    #[error("inference failure: {0}")]
    Inference(String),
    /// The inference thread is gone.
    #[error("summarizer worker stopped")]
    WorkerStopped,
}
