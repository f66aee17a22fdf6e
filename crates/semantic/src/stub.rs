use fxhash::hash64;

use crate::normalize::l2_normalize_in_place;

/// Deterministic stand-in for the sentence model used in `"fast"` mode.
/// Sinusoid values derived from a hash of the text: same text, same vector.
pub(crate) fn make_stub_vector(text: &str, dim: usize, normalize: bool) -> Vec<f32> {
    let mut v = vec![0f32; dim];
    let h = hash64(text.as_bytes());
    for (idx, value) in v.iter_mut().enumerate() {
        *value = ((h >> (idx % 32)) as f32 * 0.0001 + idx as f32).sin();
    }
    if normalize {
        l2_normalize_in_place(&mut v);
    }
    v
}
