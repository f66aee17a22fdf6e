//! `cluster <json-embeddings>`: k-means over a JSON list of vectors.
//!
//! Prints `[[centroid, members], ...]` in ascending label order. Cluster count
//! and seed come from the `cluster` section of the config file unless given
//! on the command line.

use std::process::ExitCode;

use clap::Parser;
use searchkit::{cli, ClusterResult, PipelineError};

#[derive(Parser, Debug)]
#[command(name = "cluster", about = "Cluster embeddings with seeded k-means")]
struct Args {
    /// JSON array of equally sized number arrays.
    embeddings: String,

    /// Number of clusters; overrides the config file.
    #[arg(long, short = 'k')]
    clusters: Option<usize>,

    /// RNG seed; overrides the config file.
    #[arg(long)]
    seed: Option<u64>,
}

fn run(args: Args) -> Result<Vec<ClusterResult>, PipelineError> {
    let config = cli::load_config()?;
    let mut params = config.cluster;
    if let Some(k) = args.clusters {
        params.n_clusters = k;
    }
    if let Some(seed) = args.seed {
        params.seed = seed;
    }

    let embeddings = searchkit::parse_embeddings(&args.embeddings)?;
    Ok(searchkit::cluster_embeddings(&embeddings, &params)?)
}

fn main() -> ExitCode {
    cli::init_tracing();
    let args = match cli::parse_args::<Args>() {
        Ok(args) => args,
        Err(code) => return code,
    };
    cli::finish("cluster", run(args))
}
