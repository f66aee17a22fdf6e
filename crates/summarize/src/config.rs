use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::SummarizeError;

/// Generation settings and model location for the summarizer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SummarizeConfig {
    /// `"onnx"` for the causal LM, `"stub"` for the extractive lead summary.
    pub backend: String,
    /// Model directory holding `model.onnx` and `tokenizer.json`.
    pub model: String,
    /// Overrides `<model>/model.onnx`.
    pub model_path: Option<PathBuf>,
    /// Overrides `<model>/tokenizer.json`.
    pub tokenizer_path: Option<PathBuf>,
    pub num_beams: usize,
    /// Most tokens generated for one summary.
    pub max_length: usize,
    /// Prompts are truncated to this many tokens before generation.
    pub max_input_tokens: usize,
    /// An n-gram of this size never appears twice in a sequence; 0 disables.
    pub no_repeat_ngram_size: usize,
    /// Exponent applied to hypothesis length when ranking finished beams.
    pub length_penalty: f32,
    /// Defaults to the tokenizer's `<|endoftext|>` / `</s>` id.
    pub eos_token_id: Option<u32>,
    /// Sentences kept by the stub backend.
    pub stub_sentences: usize,
}

impl Default for SummarizeConfig {
    fn default() -> Self {
        Self {
            backend: "onnx".into(),
            model: "./models/summarizer".into(),
            model_path: None,
            tokenizer_path: None,
            num_beams: 5,
            max_length: 150,
            max_input_tokens: 512,
            no_repeat_ngram_size: 2,
            length_penalty: 1.0,
            eos_token_id: None,
            stub_sentences: 2,
        }
    }
}

impl SummarizeConfig {
    pub fn model_file(&self) -> PathBuf {
        self.model_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(&self.model).join("model.onnx"))
    }

    pub fn tokenizer_file(&self) -> PathBuf {
        self.tokenizer_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(&self.model).join("tokenizer.json"))
    }

    pub fn validate(&self) -> Result<(), SummarizeError> {
        if !matches!(self.backend.as_str(), "onnx" | "stub") {
            return Err(SummarizeError::InvalidConfig(format!(
                "unknown backend '{}', expected \"onnx\" or \"stub\"",
                self.backend
            )));
        }
        if self.num_beams == 0 {
            return Err(SummarizeError::InvalidConfig("num_beams must be positive".into()));
        }
        if self.max_length == 0 {
            return Err(SummarizeError::InvalidConfig("max_length must be positive".into()));
        }
        if self.max_input_tokens == 0 {
            return Err(SummarizeError::InvalidConfig(
                "max_input_tokens must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = SummarizeConfig::default();
        assert_eq!(cfg.num_beams, 5);
        assert_eq!(cfg.max_length, 150);
        assert_eq!(cfg.max_input_tokens, 512);
        assert_eq!(cfg.no_repeat_ngram_size, 2);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn asset_paths_derive_from_model_dir() {
        let cfg = SummarizeConfig {
            model: "/srv/gpt2".into(),
            ..Default::default()
        };
        assert_eq!(cfg.model_file(), PathBuf::from("/srv/gpt2/model.onnx"));
        assert_eq!(cfg.tokenizer_file(), PathBuf::from("/srv/gpt2/tokenizer.json"));

        let cfg = SummarizeConfig {
            model_path: Some("/other/decoder.onnx".into()),
            ..cfg
        };
        assert_eq!(cfg.model_file(), PathBuf::from("/other/decoder.onnx"));
    }

    #[test]
    fn rejects_degenerate_settings() {
        for cfg in [
            SummarizeConfig {
                num_beams: 0,
                ..Default::default()
            },
            SummarizeConfig {
                max_length: 0,
                ..Default::default()
            },
            SummarizeConfig {
                backend: "remote".into(),
                ..Default::default()
            },
        ] {
            assert!(matches!(
                cfg.validate(),
                Err(SummarizeError::InvalidConfig(_))
            ));
        }
    }
}
