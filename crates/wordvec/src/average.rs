use crate::WordVecError;

/// Component-wise mean of equally sized vectors.
///
/// Used to turn a document's term vectors into a single document vector before
/// clustering.
pub fn mean_vector<V>(vectors: &[V]) -> Result<Vec<f32>, WordVecError>
where
    V: AsRef<[f32]>,
{
    let first = vectors
        .first()
        .ok_or_else(|| WordVecError::InvalidInput("cannot average zero vectors".into()))?;
    let dims = first.as_ref().len();

    let mut acc = vec![0f32; dims];
    for vector in vectors {
        let vector = vector.as_ref();
        if vector.len() != dims {
            return Err(WordVecError::DimensionMismatch {
                expected: dims,
                actual: vector.len(),
            });
        }
        for (slot, value) in acc.iter_mut().zip(vector) {
            *slot += value;
        }
    }

    let n = vectors.len() as f32;
    acc.iter_mut().for_each(|v| *v /= n);
    Ok(acc)
}
