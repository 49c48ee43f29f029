use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A dense feature vector
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vector {
    data: Vec<f32>,
}

impl Vector {
    #[inline]
    #[must_use]
    pub fn new(data: Vec<f32>) -> Self {
        Self { data }
    }

    #[inline]
    #[must_use]
    pub fn zeros(dim: usize) -> Self {
        Self {
            data: vec![0.0; dim],
        }
    }

    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.data.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    #[inline]
    pub fn dot(&self, other: &Vector) -> f32 {
        dot(&self.data, &other.data)
    }

    /// Dot product restricted to one block of dimensions
    #[inline]
    pub fn dot_range(&self, other: &Vector, range: Range<usize>) -> f32 {
        match (self.data.get(range.clone()), other.data.get(range)) {
            (Some(a), Some(b)) => dot(a, b),
            _ => 0.0,
        }
    }

    #[inline]
    pub fn norm(&self) -> f32 {
        dot(&self.data, &self.data).sqrt()
    }

    /// Compute cosine similarity with another vector.
    /// Returns 0.0 when the dimensions differ or either norm is zero.
    #[inline]
    pub fn cosine_similarity(&self, other: &Vector) -> f32 {
        if self.dim() != other.dim() {
            return 0.0;
        }

        let norm_a = self.norm();
        let norm_b = other.norm();

        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        self.dot(other) / (norm_a * norm_b)
    }

    /// Multiply a block of dimensions by a scalar in place
    #[inline]
    pub fn scale_range(&mut self, range: Range<usize>, factor: f32) {
        if let Some(block) = self.data.get_mut(range) {
            for x in block {
                *x *= factor;
            }
        }
    }

    /// Normalize a block of dimensions to unit length in place
    #[inline]
    pub fn normalize_range(&mut self, range: Range<usize>) {
        if let Some(block) = self.data.get_mut(range) {
            let norm = dot(block, block).sqrt();
            if norm > f32::EPSILON {
                let inv_norm = 1.0 / norm;
                for x in block {
                    *x *= inv_norm;
                }
            }
        }
    }
}

impl From<Vec<f32>> for Vector {
    fn from(data: Vec<f32>) -> Self {
        Self::new(data)
    }
}

/// Scalar dot product with two accumulators
#[inline]
fn dot(a: &[f32], b: &[f32]) -> f32 {
    let mut dot0 = 0.0f32;
    let mut dot1 = 0.0f32;

    let a_chunks = a.chunks_exact(2);
    let b_chunks = b.chunks_exact(2);
    let a_rem = a_chunks.remainder();
    let b_rem = b_chunks.remainder();

    for (x, y) in a_chunks.zip(b_chunks) {
        dot0 += x[0] * y[0];
        dot1 += x[1] * y[1];
    }
    for (x, y) in a_rem.iter().zip(b_rem) {
        dot0 += x * y;
    }

    dot0 + dot1
}
