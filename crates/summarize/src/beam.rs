//! Batched beam search over a causal language model.
//!
//! Every live beam of every document is scored in one model call per step.
//! Prompts are left padded with the end token so that the last column of the
//! batch is always the newest token of each row.

use std::iter;

use crate::SummarizeError;

/// A decoder-only model that scores the next token.
pub trait CausalLm {
    /// Next-token logits for each row of `input_ids`.
    ///
    /// Rows share one length and are padded on the left; `attention_mask` is 0
    /// exactly on the padding.
    fn next_token_logits(
        &mut self,
        input_ids: &[Vec<i64>],
        attention_mask: &[Vec<i64>],
    ) -> Result<Vec<Vec<f32>>, SummarizeError>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeamParams {
    pub num_beams: usize,
    pub max_new_tokens: usize,
    pub no_repeat_ngram_size: usize,
    pub length_penalty: f32,
    pub eos_token_id: i64,
}

#[derive(Debug, Clone)]
struct Beam {
    tokens: Vec<i64>,
    score: f32,
}

/// The best finished sequences of one document.
#[derive(Debug)]
struct Hypotheses {
    kept: Vec<(f32, Vec<i64>)>,
    num_beams: usize,
    length_penalty: f32,
    done: bool,
}

impl Hypotheses {
    fn new(num_beams: usize, length_penalty: f32) -> Self {
        Self {
            kept: Vec::with_capacity(num_beams + 1),
            num_beams,
            length_penalty,
            done: false,
        }
    }

    fn normalize(&self, sum_logprobs: f32, len: usize) -> f32 {
        sum_logprobs / (len.max(1) as f32).powf(self.length_penalty)
    }

    fn worst(&self) -> f32 {
        self.kept
            .iter()
            .map(|(score, _)| *score)
            .fold(f32::INFINITY, f32::min)
    }

    fn add(&mut self, tokens: Vec<i64>, sum_logprobs: f32) {
        let score = self.normalize(sum_logprobs, tokens.len());
        if self.kept.len() < self.num_beams || score > self.worst() {
            self.kept.push((score, tokens));
            if self.kept.len() > self.num_beams {
                if let Some(pos) = self
                    .kept
                    .iter()
                    .enumerate()
                    .min_by(|(_, a), (_, b)| a.0.total_cmp(&b.0))
                    .map(|(pos, _)| pos)
                {
                    self.kept.remove(pos);
                }
            }
        }
    }

    /// No running beam can still beat the worst kept hypothesis.
    fn is_done(&self, best_running: f32, cur_len: usize) -> bool {
        self.kept.len() >= self.num_beams && self.worst() >= self.normalize(best_running, cur_len)
    }

    fn best(self) -> Vec<i64> {
        self.kept
            .into_iter()
            .max_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, tokens)| tokens)
            .unwrap_or_default()
    }
}

/// Generates up to `max_new_tokens` tokens after each prompt and returns them,
/// without the prompt and without the end token, in prompt order.
pub fn beam_search<M>(
    model: &mut M,
    prompts: &[Vec<i64>],
    params: &BeamParams,
) -> Result<Vec<Vec<i64>>, SummarizeError>
where
    M: CausalLm + ?Sized,
{
    if params.num_beams == 0 {
        return Err(SummarizeError::InvalidConfig("num_beams must be positive".into()));
    }
    let eos = params.eos_token_id;
    let num_beams = params.num_beams;

    let prompts: Vec<Vec<i64>> = prompts
        .iter()
        .map(|p| if p.is_empty() { vec![eos] } else { p.clone() })
        .collect();
    let prompt_len = prompts.iter().map(Vec::len).max().unwrap_or(0);
    let padded: Vec<(Vec<i64>, Vec<i64>)> = prompts
        .iter()
        .map(|p| {
            let pad = prompt_len - p.len();
            let ids = iter::repeat_n(eos, pad).chain(p.iter().copied()).collect();
            let mask = iter::repeat_n(0, pad).chain(iter::repeat_n(1, p.len())).collect();
            (ids, mask)
        })
        .collect();

    let mut beams: Vec<Vec<Beam>> = prompts
        .iter()
        .map(|_| {
            vec![Beam {
                tokens: Vec::new(),
                score: 0.0,
            }]
        })
        .collect();
    let mut hyps: Vec<Hypotheses> = prompts
        .iter()
        .map(|_| Hypotheses::new(num_beams, params.length_penalty))
        .collect();

    for step in 0..params.max_new_tokens {
        let mut owners = Vec::new();
        let mut ids = Vec::new();
        let mut masks = Vec::new();
        for (doc, doc_beams) in beams.iter().enumerate() {
            if hyps[doc].done {
                continue;
            }
            let (prompt_ids, prompt_mask) = &padded[doc];
            for (b, beam) in doc_beams.iter().enumerate() {
                let mut row = prompt_ids.clone();
                row.extend_from_slice(&beam.tokens);
                let mut mask = prompt_mask.clone();
                mask.extend(iter::repeat_n(1, beam.tokens.len()));
                ids.push(row);
                masks.push(mask);
                owners.push((doc, b));
            }
        }
        if ids.is_empty() {
            break;
        }

        let logits = model.next_token_logits(&ids, &masks)?;
        if logits.len() != ids.len() {
            return Err(SummarizeError::Inference(format!(
                "model scored {} rows, expected {}",
                logits.len(),
                ids.len()
            )));
        }

        let mut candidates: Vec<Vec<(f32, usize, i64)>> = vec![Vec::new(); prompts.len()];
        for (&(doc, b), row_logits) in owners.iter().zip(&logits) {
            let beam = &beams[doc][b];
            let mut logprobs = log_softmax(row_logits);
            let mut context = prompts[doc].clone();
            context.extend_from_slice(&beam.tokens);
            ban_repeated_ngrams(&mut logprobs, &context, params.no_repeat_ngram_size);
            for (token, lp) in top_k(&logprobs, 2 * num_beams) {
                if lp.is_finite() {
                    candidates[doc].push((beam.score + lp, b, token as i64));
                }
            }
        }

        let cur_len = step + 1;
        for (doc, mut cands) in candidates.into_iter().enumerate() {
            if hyps[doc].done {
                continue;
            }
            cands.sort_by(|x, y| {
                y.0.total_cmp(&x.0)
                    .then(x.1.cmp(&y.1))
                    .then(x.2.cmp(&y.2))
            });

            let mut next = Vec::with_capacity(num_beams);
            for (rank, (score, b, token)) in cands.into_iter().enumerate() {
                if token == eos {
                    if rank < num_beams {
                        hyps[doc].add(beams[doc][b].tokens.clone(), score);
                    }
                } else {
                    let mut tokens = beams[doc][b].tokens.clone();
                    tokens.push(token);
                    next.push(Beam { tokens, score });
                }
                if next.len() == num_beams {
                    break;
                }
            }

            hyps[doc].done = match next.first() {
                Some(best) => hyps[doc].is_done(best.score, cur_len),
                None => true,
            };
            beams[doc] = next;
        }
    }

    Ok(hyps
        .into_iter()
        .zip(beams)
        .map(|(mut doc_hyps, doc_beams)| {
            if !doc_hyps.done {
                for beam in doc_beams {
                    doc_hyps.add(beam.tokens, beam.score);
                }
            }
            doc_hyps.best()
        })
        .collect())
}

fn log_softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(f32::NEG_INFINITY, f32::max);
    if !max.is_finite() {
        return vec![f32::NEG_INFINITY; logits.len()];
    }
    let sum: f32 = logits
        .iter()
        .filter(|v| v.is_finite())
        .map(|v| (v - max).exp())
        .sum();
    let lse = max + sum.ln();
    logits.iter().map(|v| v - lse).collect()
}

/// Forbids every token that would complete an n-gram already present in `seq`.
fn ban_repeated_ngrams(logprobs: &mut [f32], seq: &[i64], n: usize) {
    if n == 0 || seq.len() + 1 < n {
        return;
    }
    let prefix = &seq[seq.len() + 1 - n..];
    for window in seq.windows(n) {
        if &window[..n - 1] == prefix {
            if let Some(slot) = usize::try_from(window[n - 1])
                .ok()
                .and_then(|t| logprobs.get_mut(t))
            {
                *slot = f32::NEG_INFINITY;
            }
        }
    }
}

/// The `k` largest values with their indices, largest first, ties by index.
fn top_k(values: &[f32], k: usize) -> Vec<(usize, f32)> {
    let order = |a: &usize, b: &usize| values[*b].total_cmp(&values[*a]).then(a.cmp(b));
    let mut idx: Vec<usize> = (0..values.len()).collect();
    let k = k.min(idx.len());
    if k == 0 {
        return Vec::new();
    }
    if k < idx.len() {
        idx.select_nth_unstable_by(k - 1, order);
        idx.truncate(k);
    }
    idx.sort_by(order);
    idx.into_iter().map(|i| (i, values[i])).collect()
}
