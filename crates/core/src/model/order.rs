use rand::Rng;
use rand::seq::SliceRandom;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum OrderError {
    #[error("order is empty")]
    Empty,

    #[error("order has {actual} entries, expected {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("order entry {0} is out of range or repeated")]
    NotAPermutation(usize),
}

/// Display sequence of questions: a permutation of `0..n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order(Vec<usize>);

impl Order {
    /// The identity permutation `[0, 1, .., n - 1]`.
    #[must_use]
    pub fn identity(len: usize) -> Self {
        Self((0..len).collect())
    }

    /// Validate a persisted order against the number of loaded questions.
    ///
    /// # Errors
    ///
    /// Returns `OrderError` unless `indices` is a non-empty permutation of `0..len`.
    pub fn from_persisted(indices: Vec<usize>, len: usize) -> Result<Self, OrderError> {
        if indices.is_empty() {
            return Err(OrderError::Empty);
        }
        if indices.len() != len {
            return Err(OrderError::LengthMismatch {
                expected: len,
                actual: indices.len(),
            });
        }
        let mut seen = vec![false; len];
        for &idx in &indices {
            match seen.get_mut(idx) {
                Some(slot) if !*slot => *slot = true,
                _ => return Err(OrderError::NotAPermutation(idx)),
            }
        }
        Ok(Self(indices))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Question index displayed at `position`.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<usize> {
        self.0.get(position).copied()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Uniform in-place reshuffle.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.0.shuffle(rng);
    }
}
