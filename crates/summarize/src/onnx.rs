use once_cell::sync::OnceCell;
use onnxruntime::environment::Environment;
use onnxruntime::ndarray::Array;
use onnxruntime::session::Session;
use std::path::Path;
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::beam::{beam_search, BeamParams, CausalLm};
use crate::{SummarizeConfig, SummarizeError, SummaryEngine};

static ORT_ENV: OnceCell<Environment> = OnceCell::new();

fn ort_environment() -> Result<&'static Environment, SummarizeError> {
    ORT_ENV.get_or_try_init(|| {
        Environment::builder()
            .with_name("searchkit-summarize")
            .build()
            .map_err(|e| SummarizeError::ModelUnavailable(e.to_string()))
    })
}

/// Decoder-only ONNX export without past key values; every step re-runs the full sequence.
pub(crate) struct OnnxCausalLm {
    session: Session<'static>,
}

impl OnnxCausalLm {
    pub(crate) fn load(model_path: &Path) -> Result<Self, SummarizeError> {
        if !model_path.exists() {
            return Err(SummarizeError::ModelUnavailable(format!(
                "model file not found: {}",
                model_path.display()
            )));
        }
        let session = ort_environment()?
            .new_session_builder()
            .map_err(|e| SummarizeError::ModelUnavailable(e.to_string()))?
            .with_model_from_file(model_path.to_path_buf())
            .map_err(|e| SummarizeError::ModelUnavailable(e.to_string()))?;

        if let Some(input) = session
            .inputs
            .iter()
            .find(|i| i.name.starts_with("past_key_values"))
        {
            return Err(SummarizeError::ModelUnavailable(format!(
                "model expects cache input '{}'; export it without past key values",
                input.name
            )));
        }
        Ok(Self { session })
    }
}

impl CausalLm for OnnxCausalLm {
    fn next_token_logits(
        &mut self,
        input_ids: &[Vec<i64>],
        attention_mask: &[Vec<i64>],
    ) -> Result<Vec<Vec<f32>>, SummarizeError> {
        let batch = input_ids.len();
        let seq_len = input_ids.first().map(Vec::len).unwrap_or(0);
        if batch == 0 || seq_len == 0 {
            return Ok(Vec::new());
        }

        let flat_ids: Vec<i64> = input_ids.iter().flatten().copied().collect();
        let flat_mask: Vec<i64> = attention_mask.iter().flatten().copied().collect();
        let positions = position_ids(attention_mask);

        let mut runtime_inputs = Vec::with_capacity(self.session.inputs.len());
        for input in &self.session.inputs {
            let data = match input.name.as_str() {
                "input_ids" => flat_ids.clone(),
                "attention_mask" => flat_mask.clone(),
                "position_ids" => positions.clone(),
                other => {
                    return Err(SummarizeError::Inference(format!(
                        "unsupported model input '{other}'"
                    )))
                }
            };
            let tensor = Array::from_shape_vec((batch, seq_len), data)
                .map_err(|e| SummarizeError::Inference(e.to_string()))?;
            runtime_inputs.push(tensor.into_dyn());
        }

        let outputs = self
            .session
            .run::<i64, f32, _>(runtime_inputs)
            .map_err(|e| SummarizeError::Inference(e.to_string()))?;
        let logits = outputs
            .into_iter()
            .next()
            .ok_or_else(|| SummarizeError::Inference("model returned no outputs".into()))?;

        let shape = logits.shape().to_vec();
        let flat: Vec<f32> = logits.iter().copied().collect();
        last_position_logits(&flat, &shape)
    }
}

/// Positions count real tokens only; padding gets position 1 like `generate` does.
fn position_ids(attention_mask: &[Vec<i64>]) -> Vec<i64> {
    attention_mask
        .iter()
        .flat_map(|row| {
            let mut seen = 0i64;
            row.iter()
                .map(move |&m| {
                    seen += m;
                    if m == 0 {
                        1
                    } else {
                        seen - 1
                    }
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Slices `[batch, seq, vocab]` logits down to the final position of each row.
fn last_position_logits(flat: &[f32], shape: &[usize]) -> Result<Vec<Vec<f32>>, SummarizeError> {
    let [batch, seq, vocab] = *shape else {
        return Err(SummarizeError::Inference(format!(
            "expected logits of rank 3, got {shape:?}"
        )));
    };
    if flat.len() != batch * seq * vocab || seq == 0 {
        return Err(SummarizeError::Inference(format!(
            "logits hold {} values for shape {shape:?}",
            flat.len()
        )));
    }
    Ok((0..batch)
        .map(|b| {
            let offset = (b * seq + seq - 1) * vocab;
            flat[offset..offset + vocab].to_vec()
        })
        .collect())
}

/// Tokenizer + causal LM + beam settings.
pub(crate) struct OnnxSummaryEngine {
    tokenizer: Tokenizer,
    model: OnnxCausalLm,
    params: BeamParams,
    max_input_tokens: usize,
}

impl OnnxSummaryEngine {
    pub(crate) fn load(cfg: &SummarizeConfig) -> Result<Self, SummarizeError> {
        let tokenizer_path = cfg.tokenizer_file();
        let tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(|e| {
            SummarizeError::ModelUnavailable(format!("{}: {e}", tokenizer_path.display()))
        })?;
        let eos = match cfg.eos_token_id {
            Some(id) => id,
            None => ["<|endoftext|>", "</s>", "<eos>"]
                .iter()
                .find_map(|t| tokenizer.token_to_id(t))
                .ok_or_else(|| {
                    SummarizeError::InvalidConfig(
                        "tokenizer has no end token; set eos_token_id".into(),
                    )
                })?,
        };
        let model = OnnxCausalLm::load(&cfg.model_file())?;

        info!(
            model = %cfg.model_file().display(),
            eos,
            num_beams = cfg.num_beams,
            "summarizer_model_loaded"
        );

        Ok(Self {
            tokenizer,
            model,
            params: BeamParams {
                num_beams: cfg.num_beams,
                max_new_tokens: cfg.max_length,
                no_repeat_ngram_size: cfg.no_repeat_ngram_size,
                length_penalty: cfg.length_penalty,
                eos_token_id: i64::from(eos),
            },
            max_input_tokens: cfg.max_input_tokens,
        })
    }
}

impl SummaryEngine for OnnxSummaryEngine {
    fn summarize_batch(&mut self, texts: &[String]) -> Result<Vec<String>, SummarizeError> {
        let mut prompts = Vec::with_capacity(texts.len());
        for text in texts {
            let encoding = self
                .tokenizer
                .encode(text.as_str(), false)
                .map_err(|e| SummarizeError::Inference(e.to_string()))?;
            let ids: Vec<i64> = encoding
                .get_ids()
                .iter()
                .take(self.max_input_tokens)
                .map(|&id| i64::from(id))
                .collect();
            prompts.push(ids);
        }
        debug!(
            docs = prompts.len(),
            longest = prompts.iter().map(Vec::len).max().unwrap_or(0),
            "summarize_prompts_encoded"
        );

        let generated = beam_search(&mut self.model, &prompts, &self.params)?;
        generated
            .into_iter()
            .map(|ids| {
                let ids: Vec<u32> = ids.into_iter().filter_map(|id| u32::try_from(id).ok()).collect();
                self.tokenizer
                    .decode(&ids, true)
                    .map(|s| s.trim().to_string())
                    .map_err(|e| SummarizeError::Inference(e.to_string()))
            })
            .collect()
    }
}
