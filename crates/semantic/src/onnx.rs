use onnxruntime::ndarray::{Array, Array2};
use onnxruntime::session::Session;
use std::cell::RefCell;
use tokenizers::Tokenizer;

use crate::cache::CachedModel;
use crate::SemanticError;

/// Encodes `texts` as one padded batch and mean-pools the token states of each row.
pub(crate) fn run_sentence_embeddings<T>(
    handle: &CachedModel,
    texts: &[T],
    max_sequence_length: usize,
) -> Result<Vec<Vec<f32>>, SemanticError>
where
    T: AsRef<str>,
{
    if texts.is_empty() {
        return Ok(Vec::new());
    }

    let (encoded, max_len) = encode_documents(&handle.tokenizer, texts, max_sequence_length)?;
    let (input_ids, attn_mask) = build_padded_arrays(encoded, max_len)?;
    let mask: Vec<i64> = attn_mask.iter().copied().collect();
    let (flat, shape) = execute_session(&handle.session, input_ids, attn_mask)?;
    pool_output(&flat, &shape, &mask)
}

struct EncodedDoc {
    ids: Vec<i64>,
    mask: Vec<i64>,
}

fn encode_documents<T>(
    tokenizer: &Tokenizer,
    texts: &[T],
    max_sequence_length: usize,
) -> Result<(Vec<EncodedDoc>, usize), SemanticError>
where
    T: AsRef<str>,
{
    let mut encoded = Vec::with_capacity(texts.len());
    let mut max_len = 0usize;

    for text in texts {
        let encoding = tokenizer
            .encode(text.as_ref(), true)
            .map_err(|e| SemanticError::Inference(e.to_string()))?;
        let mut ids: Vec<i64> = encoding.get_ids().iter().map(|&x| x as i64).collect();
        let mut mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&x| x as i64)
            .collect();
        ids.truncate(max_sequence_length);
        mask.truncate(max_sequence_length);
        max_len = max_len.max(ids.len());
        encoded.push(EncodedDoc { ids, mask });
    }

    Ok((encoded, max_len))
}

fn build_padded_arrays(
    encoded: Vec<EncodedDoc>,
    max_len: usize,
) -> Result<(Array2<i64>, Array2<i64>), SemanticError> {
    let seq_len = max_len.max(1);
    let batch = encoded.len();
    let mut id_storage = Vec::with_capacity(batch * seq_len);
    let mut mask_storage = Vec::with_capacity(batch * seq_len);

    for EncodedDoc { ids, mask } in encoded {
        if ids.len() != mask.len() {
            return Err(SemanticError::Inference(
                "tokenizer produced mismatched id/mask lengths".into(),
            ));
        }
        let pad = seq_len.saturating_sub(ids.len());
        id_storage.extend(ids);
        mask_storage.extend(mask);
        id_storage.extend(std::iter::repeat_n(0, pad));
        mask_storage.extend(std::iter::repeat_n(0, pad));
    }

    let input_ids = Array::from_shape_vec((batch, seq_len), id_storage)
        .map_err(|e| SemanticError::Inference(e.to_string()))?;
    let attn_mask = Array::from_shape_vec((batch, seq_len), mask_storage)
        .map_err(|e| SemanticError::Inference(e.to_string()))?;
    Ok((input_ids, attn_mask))
}

/// Runs the session and returns the first output flattened, with its shape.
fn execute_session(
    session: &RefCell<Session<'static>>,
    input_ids: Array2<i64>,
    attn_mask: Array2<i64>,
) -> Result<(Vec<f32>, Vec<usize>), SemanticError> {
    let (batch, seq_len) = input_ids.dim();
    let mut guard = session.borrow_mut();
    let session_ref = &mut *guard;
    let mut runtime_inputs = Vec::with_capacity(session_ref.inputs.len());
    let mut input_ids_tensor = Some(input_ids);
    let mut attn_mask_tensor = Some(attn_mask);

    for input in &session_ref.inputs {
        match input.name.as_str() {
            "input_ids" => {
                let tensor = input_ids_tensor.take().ok_or_else(|| {
                    SemanticError::InvalidConfig(
                        "model requested `input_ids` multiple times".into(),
                    )
                })?;
                runtime_inputs.push(tensor.into_dyn());
            }
            "attention_mask" => {
                let tensor = attn_mask_tensor.take().ok_or_else(|| {
                    SemanticError::InvalidConfig(
                        "model requested `attention_mask` multiple times".into(),
                    )
                })?;
                runtime_inputs.push(tensor.into_dyn());
            }
            "token_type_ids" => {
                runtime_inputs.push(Array::from_elem((batch, seq_len), 0_i64).into_dyn());
            }
            other => {
                return Err(SemanticError::Inference(format!(
                    "unsupported model input '{other}'"
                )))
            }
        }
    }

    let outputs = session_ref
        .run::<i64, f32, _>(runtime_inputs)
        .map_err(|e| SemanticError::Inference(e.to_string()))?;
    let output_tensor = outputs
        .into_iter()
        .next()
        .ok_or_else(|| SemanticError::Inference("model returned no outputs".into()))?;

    let shape = output_tensor.shape().to_vec();
    let flat: Vec<f32> = output_tensor.iter().copied().collect();
    Ok((flat, shape))
}

/// Turns a model output into one vector per batch row.
///
/// `[batch, seq, hidden]` token states are averaged over positions whose mask is
/// non-zero; a `[batch, hidden]` output is already pooled and is split by row.
fn pool_output(flat: &[f32], shape: &[usize], mask: &[i64]) -> Result<Vec<Vec<f32>>, SemanticError> {
    match *shape {
        [batch, hidden] => {
            if flat.len() != batch * hidden {
                return Err(SemanticError::Inference(format!(
                    "output holds {} values for shape {shape:?}",
                    flat.len()
                )));
            }
            Ok(flat.chunks(hidden.max(1)).map(<[f32]>::to_vec).collect())
        }
        [batch, seq, hidden] => {
            if flat.len() != batch * seq * hidden || mask.len() != batch * seq {
                return Err(SemanticError::Inference(format!(
                    "output shape {shape:?} does not match {} mask entries",
                    mask.len()
                )));
            }
            let mut pooled = Vec::with_capacity(batch);
            for b in 0..batch {
                let mut sum = vec![0f32; hidden];
                let mut count = 0f32;
                for s in 0..seq {
                    if mask[b * seq + s] == 0 {
                        continue;
                    }
                    count += 1.0;
                    let offset = (b * seq + s) * hidden;
                    for (acc, &v) in sum.iter_mut().zip(&flat[offset..offset + hidden]) {
                        *acc += v;
                    }
                }
                let denom = count.max(1e-9);
                sum.iter_mut().for_each(|v| *v /= denom);
                pooled.push(sum);
            }
            Ok(pooled)
        }
        _ => Err(SemanticError::Inference(format!(
            "unexpected output rank {shape:?}"
        ))),
    }
}
