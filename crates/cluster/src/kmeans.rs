use std::time::Instant;

use linfa::traits::{Fit, PredictInplace};
use linfa::DatasetBase;
use linfa_clustering::KMeans;
use ndarray::{Array1, Array2};
use rand_xoshiro::rand_core::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;
use serde::ser::{Serialize, SerializeTuple, Serializer};
use tracing::{debug, info};

use crate::{ClusterConfig, ClusterError};

/// One cluster: its centroid and the input vectors assigned to it.
///
/// Serializes as the pair `[centroid, members]`. `indices` records each member's
/// position in the input so callers can map members back to their documents.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterResult {
    pub label: usize,
    pub centroid: Vec<f32>,
    pub members: Vec<Vec<f32>>,
    pub indices: Vec<usize>,
}

impl ClusterResult {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl Serialize for ClusterResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut pair = serializer.serialize_tuple(2)?;
        pair.serialize_element(&self.centroid)?;
        pair.serialize_element(&self.members)?;
        pair.end()
    }
}

/// Partitions `samples` into `cfg.n_clusters` groups with seeded k-means.
///
/// Returns one [`ClusterResult`] per label that received members, in ascending
/// label order. Every input vector lands in exactly one result.
pub fn cluster_embeddings<V>(
    samples: &[V],
    cfg: &ClusterConfig,
) -> Result<Vec<ClusterResult>, ClusterError>
where
    V: AsRef<[f32]>,
{
    let start = Instant::now();
    let n_samples = samples.len();

    if cfg.n_clusters == 0 {
        return Err(ClusterError::NoLabelsFound(
            "cluster count must be positive".into(),
        ));
    }
    if cfg.n_clusters > n_samples {
        return Err(ClusterError::NoLabelsFound(format!(
            "{} clusters requested for {} samples",
            cfg.n_clusters, n_samples
        )));
    }

    let data = to_matrix(samples)?;

    let rng = Xoshiro256Plus::seed_from_u64(cfg.seed);
    let dataset = DatasetBase::from(data.clone());
    let model = KMeans::params_with_rng(cfg.n_clusters, rng)
        .max_n_iterations(cfg.max_iterations)
        .tolerance(cfg.tolerance)
        .n_runs(cfg.n_runs.max(1))
        .fit(&dataset)
        .map_err(|e| ClusterError::Fit(e.to_string()))?;

    let mut labels = Array1::<usize>::zeros(n_samples);
    model.predict_inplace(&data, &mut labels);
    let centroids = model.centroids();

    let mut groups: Vec<Vec<usize>> = vec![Vec::new(); cfg.n_clusters];
    for (idx, &label) in labels.iter().enumerate() {
        match groups.get_mut(label) {
            Some(group) => group.push(idx),
            None => {
                return Err(ClusterError::Fit(format!(
                    "label {label} outside 0..{}",
                    cfg.n_clusters
                )))
            }
        }
    }

    let clusters: Vec<ClusterResult> = groups
        .into_iter()
        .enumerate()
        .filter(|(_, indices)| !indices.is_empty())
        .map(|(label, indices)| {
            let centroid = centroids.row(label).iter().map(|&v| v as f32).collect();
            let members = indices
                .iter()
                .map(|&i| samples[i].as_ref().to_vec())
                .collect();
            ClusterResult {
                label,
                centroid,
                members,
                indices,
            }
        })
        .collect();

    if clusters.is_empty() {
        return Err(ClusterError::NoLabelsFound(
            "k-means produced no labels".into(),
        ));
    }

    debug!(sizes = ?clusters.iter().map(ClusterResult::len).collect::<Vec<_>>(), "cluster_sizes");
    info!(
        samples = n_samples,
        clusters = clusters.len(),
        seed = cfg.seed,
        elapsed_micros = start.elapsed().as_micros(),
        "cluster_success"
    );

    Ok(clusters)
}

fn to_matrix<V>(samples: &[V]) -> Result<Array2<f64>, ClusterError>
where
    V: AsRef<[f32]>,
{
    let dims = samples
        .first()
        .map(|v| v.as_ref().len())
        .ok_or_else(|| ClusterError::NoLabelsFound("no samples".into()))?;
    if dims == 0 {
        return Err(ClusterError::InvalidInput("vectors are empty".into()));
    }

    let mut flat = Vec::with_capacity(samples.len() * dims);
    for (index, sample) in samples.iter().enumerate() {
        let sample = sample.as_ref();
        if sample.len() != dims {
            return Err(ClusterError::DimensionMismatch {
                index,
                expected: dims,
                actual: sample.len(),
            });
        }
        if let Some(bad) = sample.iter().find(|v| !v.is_finite()) {
            return Err(ClusterError::InvalidInput(format!(
                "vector {index} contains non-finite value {bad}"
            )));
        }
        flat.extend(sample.iter().map(|&v| v as f64));
    }

    Array2::from_shape_vec((samples.len(), dims), flat)
        .map_err(|e| ClusterError::InvalidInput(e.to_string()))
}
