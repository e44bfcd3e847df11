//! Exact nearest-neighbor index over Euclidean distance.

use rayon::prelude::*;
use serde::Serialize;

use crate::error::IndexError;

/// Below this many stored vectors, distances are computed on the calling thread.
const PARALLEL_THRESHOLD: usize = 4096;

/// A search hit: stored position and its Euclidean distance to the query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Neighbor {
    pub position: usize,
    pub distance: f32,
}

/// Brute-force flat index. Vectors live in one contiguous buffer and are
/// addressed by insertion ordinal.
#[derive(Debug, Clone)]
pub struct FlatL2Index {
    dimensions: usize,
    data: Vec<f32>,
}

impl FlatL2Index {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            data: Vec::new(),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Number of stored vectors.
    pub fn len(&self) -> usize {
        if self.dimensions == 0 {
            0
        } else {
            self.data.len() / self.dimensions
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Check a vector's width without inserting it.
    pub fn check(&self, vector: &[f32]) -> Result<(), IndexError> {
        if vector.len() != self.dimensions {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimensions,
                actual: vector.len(),
            });
        }
        Ok(())
    }

    /// Append a vector, returning its position. Duplicates are stored again.
    pub fn add(&mut self, vector: &[f32]) -> Result<usize, IndexError> {
        self.check(vector)?;
        let position = self.len();
        self.data.extend_from_slice(vector);
        Ok(position)
    }

    /// Stored vector at `position`.
    pub fn get(&self, position: usize) -> Option<&[f32]> {
        let start = position.checked_mul(self.dimensions)?;
        self.data.get(start..start + self.dimensions)
    }

    /// The `k` nearest stored vectors, ascending by distance (ties by position).
    /// Returns every vector when fewer than `k` are stored.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>, IndexError> {
        self.check(query)?;
        if self.is_empty() {
            return Err(IndexError::Empty);
        }
        if k == 0 {
            return Ok(Vec::new());
        }

        let distance_at = |(position, stored): (usize, &[f32])| Neighbor {
            position,
            distance: squared_euclidean(stored, query),
        };
        let mut scored: Vec<Neighbor> = if self.len() >= PARALLEL_THRESHOLD {
            self.data
                .par_chunks_exact(self.dimensions)
                .enumerate()
                .map(distance_at)
                .collect()
        } else {
            self.data
                .chunks_exact(self.dimensions)
                .enumerate()
                .map(distance_at)
                .collect()
        };

        let by_distance = |a: &Neighbor, b: &Neighbor| {
            a.distance
                .total_cmp(&b.distance)
                .then(a.position.cmp(&b.position))
        };
        if k < scored.len() {
            scored.select_nth_unstable_by(k - 1, by_distance);
            scored.truncate(k);
        }
        scored.sort_unstable_by(by_distance);

        for n in &mut scored {
            n.distance = n.distance.sqrt();
        }
        Ok(scored)
    }
}

/// Squared Euclidean distance between two vectors.
#[inline]
fn squared_euclidean(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
