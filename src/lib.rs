//! Workspace umbrella crate for searchkit.
//!
//! Re-exports the per-stage crates and defines [`PipelineError`], the shared
//! error taxonomy the command-line tools report with. Every stage error maps
//! onto one of five kinds, each with a stable string code and a reserved
//! numeric code:
//!
//! | kind               | code                | reserved |
//! |--------------------|---------------------|----------|
//! | `ModelUnavailable` | `MODEL_UNAVAILABLE` | 1        |
//! | `TermNotFound`     | `TERM_NOT_FOUND`    | 2        |
//! | `NoLabelsFound`    | `NO_LABELS_FOUND`   | 3        |
//! | `UpstreamFailure`  | `UPSTREAM_FAILURE`  | 4        |
//! | `InvalidInput`     | `INVALID_INPUT`     | 5        |

pub mod cli;
pub mod config;

pub use cluster::{
    cluster_embeddings, nearest_cluster, parse_embeddings, ClusterConfig, ClusterError,
    ClusterResult,
};
pub use config::{ConfigLoadError, SearchkitConfig};
pub use search::{SearchClient, SearchConfig, SearchError, SearchResult};
pub use semantic::{SemanticConfig, SemanticError, SentenceEncoder};
pub use summarize::{SummarizeConfig, SummarizeError, Summarizer};
pub use wordvec::{
    embed_terms, load_vocabulary, mean_vector, Vocabulary, WordVecConfig, WordVecError,
};

use serde::Serialize;
use thiserror::Error;

/// Failure kinds shared by every searchkit tool.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// A model could not be loaded or could not produce output.
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),
    /// A requested term is absent from the vocabulary.
    #[error("term not found: {0}")]
    TermNotFound(String),
    /// Clustering could not assign any labels.
    #[error("no labels found: {0}")]
    NoLabelsFound(String),
    /// The search upstream failed or answered with an error status.
    #[error("upstream failure: {0}")]
    UpstreamFailure(String),
    /// The caller's input was malformed or empty.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl PipelineError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::ModelUnavailable(_) => "MODEL_UNAVAILABLE",
            PipelineError::TermNotFound(_) => "TERM_NOT_FOUND",
            PipelineError::NoLabelsFound(_) => "NO_LABELS_FOUND",
            PipelineError::UpstreamFailure(_) => "UPSTREAM_FAILURE",
            PipelineError::InvalidInput(_) => "INVALID_INPUT",
        }
    }

    /// Reserved numeric code, stable across releases.
    pub fn reserved(&self) -> u8 {
        match self {
            PipelineError::ModelUnavailable(_) => 1,
            PipelineError::TermNotFound(_) => 2,
            PipelineError::NoLabelsFound(_) => 3,
            PipelineError::UpstreamFailure(_) => 4,
            PipelineError::InvalidInput(_) => 5,
        }
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            error: ErrorBody {
                code: self.code(),
                reserved: self.reserved(),
                message: self.to_string(),
            },
        }
    }
}

/// JSON shape printed by the tools on failure:
/// `{"error": {"code": "...", "reserved": n, "message": "..."}}`.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub reserved: u8,
    pub message: String,
}

impl From<WordVecError> for PipelineError {
    fn from(err: WordVecError) -> Self {
        match err {
            WordVecError::TermNotFound(term) => PipelineError::TermNotFound(term),
            WordVecError::InvalidInput(_) | WordVecError::DimensionMismatch { .. } => {
                PipelineError::InvalidInput(err.to_string())
            }
            WordVecError::ModelUnavailable { .. }
            | WordVecError::Corrupt { .. }
            | WordVecError::Io(_) => PipelineError::ModelUnavailable(err.to_string()),
        }
    }
}

impl From<SemanticError> for PipelineError {
    fn from(err: SemanticError) -> Self {
        if err.is_model_failure() {
            PipelineError::ModelUnavailable(err.to_string())
        } else {
            PipelineError::InvalidInput(err.to_string())
        }
    }
}

impl From<ClusterError> for PipelineError {
    fn from(err: ClusterError) -> Self {
        match err {
            ClusterError::NoLabelsFound(_) | ClusterError::Fit(_) => {
                PipelineError::NoLabelsFound(err.to_string())
            }
            ClusterError::DimensionMismatch { .. } | ClusterError::InvalidInput(_) => {
                PipelineError::InvalidInput(err.to_string())
            }
        }
    }
}

impl From<SearchError> for PipelineError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::MissingQuery => PipelineError::InvalidInput(err.to_string()),
            _ => PipelineError::UpstreamFailure(err.to_string()),
        }
    }
}

impl From<SummarizeError> for PipelineError {
    fn from(err: SummarizeError) -> Self {
        match err {
            SummarizeError::InvalidInput(_) => PipelineError::InvalidInput(err.to_string()),
            _ => PipelineError::ModelUnavailable(err.to_string()),
        }
    }
}

/// Averages each document's term vectors and clusters the resulting document vectors.
///
/// Every document must contain at least one term; all terms must be in `vocab`.
pub fn cluster_documents<T>(
    vocab: &Vocabulary,
    documents: &[Vec<T>],
    cfg: &ClusterConfig,
) -> Result<Vec<ClusterResult>, PipelineError>
where
    T: AsRef<str>,
{
    let doc_vectors = documents
        .iter()
        .map(|doc| {
            let vectors = vocab.lookup_all(doc)?;
            mean_vector(&vectors)
        })
        .collect::<Result<Vec<_>, WordVecError>>()?;
    Ok(cluster_embeddings(&doc_vectors, cfg)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn codes_are_stable() {
        let all = [
            PipelineError::ModelUnavailable(String::new()),
            PipelineError::TermNotFound(String::new()),
            PipelineError::NoLabelsFound(String::new()),
            PipelineError::UpstreamFailure(String::new()),
            PipelineError::InvalidInput(String::new()),
        ];
        let codes: Vec<_> = all.iter().map(|e| (e.code(), e.reserved())).collect();
        assert_eq!(
            codes,
            vec![
                ("MODEL_UNAVAILABLE", 1),
                ("TERM_NOT_FOUND", 2),
                ("NO_LABELS_FOUND", 3),
                ("UPSTREAM_FAILURE", 4),
                ("INVALID_INPUT", 5),
            ]
        );
    }

    #[test]
    fn report_json_shape() {
        let report = PipelineError::TermNotFound("zyzzyva".into()).report();
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["error"]["code"], "TERM_NOT_FOUND");
        assert_eq!(value["error"]["reserved"], 2);
        assert_eq!(value["error"]["message"], "term not found: zyzzyva");
    }

    #[test]
    fn wordvec_errors_map() {
        assert_eq!(
            PipelineError::from(WordVecError::TermNotFound("x".into())),
            PipelineError::TermNotFound("x".into())
        );
        let unavailable = WordVecError::ModelUnavailable {
            path: PathBuf::from("m.vec"),
            reason: "missing".into(),
        };
        assert_eq!(PipelineError::from(unavailable).code(), "MODEL_UNAVAILABLE");
    }

    #[test]
    fn semantic_load_and_encode_collapse_to_model_unavailable() {
        for err in [
            SemanticError::ModelNotFound("a".into()),
            SemanticError::Inference("b".into()),
        ] {
            assert_eq!(PipelineError::from(err).code(), "MODEL_UNAVAILABLE");
        }
        assert_eq!(
            PipelineError::from(SemanticError::EmptyInput("none".into())).code(),
            "INVALID_INPUT"
        );
    }

    #[test]
    fn cluster_and_search_errors_map() {
        assert_eq!(
            PipelineError::from(ClusterError::NoLabelsFound("k > n".into())).code(),
            "NO_LABELS_FOUND"
        );
        assert_eq!(
            PipelineError::from(ClusterError::DimensionMismatch {
                index: 1,
                expected: 2,
                actual: 3
            })
            .code(),
            "INVALID_INPUT"
        );
        assert_eq!(
            PipelineError::from(SearchError::Upstream { status: 500 }).code(),
            "UPSTREAM_FAILURE"
        );
        assert_eq!(
            PipelineError::from(SummarizeError::WorkerStopped).code(),
            "MODEL_UNAVAILABLE"
        );
    }

    #[test]
    fn documents_cluster_by_mean_vector() {
        let mut vocab = Vocabulary::new(2);
        vocab.insert("cat", &[1.0, 0.0]).unwrap();
        vocab.insert("dog", &[0.9, 0.1]).unwrap();
        vocab.insert("car", &[0.0, 1.0]).unwrap();
        vocab.insert("bus", &[0.1, 0.9]).unwrap();

        let docs = vec![vec!["cat", "dog"], vec!["car", "bus"], vec!["dog"], vec!["bus"]];
        let cfg = ClusterConfig::default().with_clusters(2).with_seed(7);
        let clusters = cluster_documents(&vocab, &docs, &cfg).unwrap();

        let mut groups: Vec<Vec<usize>> = clusters.iter().map(|c| c.indices.clone()).collect();
        groups.sort();
        assert_eq!(groups, vec![vec![0, 2], vec![1, 3]]);
    }

    #[test]
    fn unknown_term_in_document_fails_whole_run() {
        let mut vocab = Vocabulary::new(1);
        vocab.insert("a", &[1.0]).unwrap();
        let docs = vec![vec!["a"], vec!["missing"]];
        let err = cluster_documents(&vocab, &docs, &ClusterConfig::default()).unwrap_err();
        assert_eq!(err, PipelineError::TermNotFound("missing".into()));
    }
}
