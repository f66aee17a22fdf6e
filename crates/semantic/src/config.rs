use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which sentence model to run and how to post-process its vectors.
///
/// # Example
/// ```no_run
/// use semantic::{SemanticConfig, SentenceEncoder};
///
/// # async fn run() -> Result<(), semantic::SemanticError> {
/// let cfg = SemanticConfig {
///     model_url: Some("https://huggingface.co/sentence-transformers/all-MiniLM-L6-v2/resolve/main/onnx/model.onnx".into()),
///     tokenizer_url: Some("https://huggingface.co/sentence-transformers/all-MiniLM-L6-v2/resolve/main/tokenizer.json".into()),
///     ..Default::default()
/// };
/// let encoder = SentenceEncoder::load(&cfg).await?;
/// let vector = encoder.encode_terms(&["rust", "ownership"])?;
/// # let _ = vector;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SemanticConfig {
    /// `"onnx"` runs the local model; `"fast"` returns deterministic hash vectors.
    pub mode: String,
    /// Label reported in logs.
    pub model_name: String,
    /// Local ONNX export of the sentence model; also the download target for
    /// [`model_url`](Self::model_url).
    pub model_path: PathBuf,
    /// Fetched into `model_path` when that file is missing.
    pub model_url: Option<String>,
    /// Path to `tokenizer.json`. When absent and [`tokenizer_url`](Self::tokenizer_url) is set the
    /// file name is taken from the URL and placed next to the model.
    pub tokenizer_path: Option<PathBuf>,
    pub tokenizer_url: Option<String>,
    /// Longer inputs are truncated to this many tokens.
    pub max_sequence_length: usize,
    /// Scale every vector to unit length.
    pub normalize: bool,
    /// Vector width produced in `"fast"` mode.
    pub stub_dim: usize,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        Self {
            mode: "onnx".into(),
            model_name: "all-MiniLM-L6-v2".into(),
            model_path: PathBuf::from("./models/all-MiniLM-L6-v2/onnx/model.onnx"),
            model_url: None,
            tokenizer_path: Some(PathBuf::from("./models/all-MiniLM-L6-v2/tokenizer.json")),
            tokenizer_url: None,
            max_sequence_length: 256,
            normalize: true,
            stub_dim: 384,
        }
    }
}
