//! Embedding clustering for searchkit.
//!
//! Thin layer over `linfa-clustering`'s k-means: validates the input matrix,
//! runs a seeded fit, and regroups the predicted labels into
//! `(centroid, members)` pairs. The cluster count is configuration
//! ([`ClusterConfig::n_clusters`], three by default).
//!
//! ```
//! use cluster::{cluster_embeddings, ClusterConfig};
//!
//! let samples = vec![
//!     vec![0.0f32, 0.0], vec![0.1, 0.0],
//!     vec![5.0, 5.0], vec![5.1, 5.0],
//! ];
//! let clusters = cluster_embeddings(&samples, &ClusterConfig::default().with_clusters(2))?;
//! assert_eq!(clusters.iter().map(|c| c.len()).sum::<usize>(), 4);
//! # Ok::<(), cluster::ClusterError>(())
//! ```

pub mod config;
pub mod distance;
pub mod error;

mod kmeans;

pub use crate::config::ClusterConfig;
pub use crate::error::ClusterError;
pub use crate::kmeans::{cluster_embeddings, ClusterResult};

use crate::distance::euclidean_distance;

/// Decodes a JSON array of equally sized number arrays.
pub fn parse_embeddings(json: &str) -> Result<Vec<Vec<f32>>, ClusterError> {
    serde_json::from_str::<Vec<Vec<f32>>>(json)
        .map_err(|e| ClusterError::InvalidInput(format!("expected a JSON list of vectors: {e}")))
}

/// Picks the cluster whose centroid is closest to `query`.
///
/// Returns `None` when `clusters` is empty or no centroid matches the query's
/// dimensionality.
pub fn nearest_cluster<'a>(query: &[f32], clusters: &'a [ClusterResult]) -> Option<&'a ClusterResult> {
    clusters
        .iter()
        .filter(|c| c.centroid.len() == query.len())
        .map(|c| (c, euclidean_distance(query, &c.centroid)))
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(c, _)| c)
}
