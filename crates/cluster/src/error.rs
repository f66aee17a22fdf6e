use thiserror::Error;

/// Errors surfaced by [`cluster_embeddings`](crate::cluster_embeddings).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ClusterError {
    /// The run cannot assign labels: too few samples, zero clusters, or an empty result.
    #[error("no labels found: {0}")]
    NoLabelsFound(String),
    /// Input vectors do not share one dimensionality.
    #[error("dimension mismatch at vector {index}: expected {expected}, got {actual}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },
    /// The input could not be decoded into vectors.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The clustering library rejected the parameters or failed to converge.
    #[error("k-means fit failed: {0}")]
    Fit(String),
}
