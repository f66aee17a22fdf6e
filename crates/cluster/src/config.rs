use serde::{Deserialize, Serialize};

/// K-means parameters. Defaults follow the contract: three clusters, seed zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClusterConfig {
    /// Number of clusters to partition into.
    pub n_clusters: usize,
    /// Seed for centroid initialisation; same seed + same input = same partition.
    pub seed: u64,
    /// Upper bound on Lloyd iterations per run.
    pub max_iterations: u64,
    /// Convergence tolerance on centroid movement.
    pub tolerance: f64,
    /// Independent initialisations; the lowest-inertia run wins.
    pub n_runs: usize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            n_clusters: 3,
            seed: 0,
            max_iterations: 300,
            tolerance: 1e-4,
            n_runs: 1,
        }
    }
}

impl ClusterConfig {
    pub fn with_clusters(mut self, n_clusters: usize) -> Self {
        self.n_clusters = n_clusters;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = ClusterConfig::default();
        assert_eq!(cfg.n_clusters, 3);
        assert_eq!(cfg.seed, 0);
        assert_eq!(cfg.n_runs, 1);
    }

    #[test]
    fn builders() {
        let cfg = ClusterConfig::default().with_clusters(5).with_seed(42);
        assert_eq!(cfg.n_clusters, 5);
        assert_eq!(cfg.seed, 42);
    }
}
