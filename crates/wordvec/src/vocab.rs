use fxhash::FxHashMap;

use crate::WordVecError;

/// Read-only mapping from term to embedding vector.
///
/// Vectors live in one contiguous buffer in file order; `index` maps a term to
/// its row. The first occurrence of a duplicated term wins.
#[derive(Debug, Clone, PartialEq)]
pub struct Vocabulary {
    dims: usize,
    terms: Vec<String>,
    index: FxHashMap<String, usize>,
    data: Vec<f32>,
}

impl Vocabulary {
    /// Creates an empty vocabulary for vectors of `dims` components.
    pub fn new(dims: usize) -> Self {
        Self::with_capacity(dims, 0)
    }

    pub fn with_capacity(dims: usize, terms: usize) -> Self {
        Self {
            dims,
            terms: Vec::with_capacity(terms),
            index: FxHashMap::default(),
            data: Vec::with_capacity(terms.checked_mul(dims).unwrap_or(0)),
        }
    }

    /// Appends `term` with its vector. Returns `false` when the term was already present.
    pub fn insert(&mut self, term: &str, vector: &[f32]) -> Result<bool, WordVecError> {
        if term.is_empty() || term.contains(char::is_whitespace) {
            return Err(WordVecError::InvalidInput(format!(
                "term {term:?} is empty or contains whitespace"
            )));
        }
        if vector.len() != self.dims {
            return Err(WordVecError::DimensionMismatch {
                expected: self.dims,
                actual: vector.len(),
            });
        }
        if self.index.contains_key(term) {
            return Ok(false);
        }

        self.index.insert(term.to_owned(), self.terms.len());
        self.terms.push(term.to_owned());
        self.data.extend_from_slice(vector);
        Ok(true)
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.index.contains_key(term)
    }

    pub fn get(&self, term: &str) -> Option<&[f32]> {
        self.index.get(term).map(|&row| self.row(row))
    }

    /// Looks up every term in order. The first absent term aborts the whole batch.
    pub fn lookup_all<T>(&self, terms: &[T]) -> Result<Vec<Vec<f32>>, WordVecError>
    where
        T: AsRef<str>,
    {
        if terms.is_empty() {
            return Err(WordVecError::InvalidInput("no terms supplied".into()));
        }

        terms
            .iter()
            .map(|term| {
                let term = term.as_ref();
                self.get(term)
                    .map(<[f32]>::to_vec)
                    .ok_or_else(|| WordVecError::TermNotFound(term.to_owned()))
            })
            .collect()
    }

    /// Iterates `(term, vector)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f32])> + '_ {
        self.terms
            .iter()
            .enumerate()
            .map(move |(row, term)| (term.as_str(), self.row(row)))
    }

    fn row(&self, row: usize) -> &[f32] {
        let start = row * self.dims;
        &self.data[start..start + self.dims]
    }
}
