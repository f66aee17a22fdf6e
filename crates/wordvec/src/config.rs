use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the word-vector model lives and whether the binary cache is written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WordVecConfig {
    /// Canonical text-format model (`.vec`).
    pub text_path: PathBuf,
    /// Binary cache derived from [`text_path`](Self::text_path) on first load.
    pub binary_path: PathBuf,
    /// Write the binary cache after a text load. Disable for read-only deployments.
    pub persist_binary: bool,
}

impl Default for WordVecConfig {
    fn default() -> Self {
        Self {
            text_path: PathBuf::from("./models/Word2VecModel.vec"),
            binary_path: PathBuf::from("./models/model.bin"),
            persist_binary: true,
        }
    }
}
