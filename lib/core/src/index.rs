//! Exact cosine vector index
//!
//! The index is built once from the cached corpus and is read-only afterwards.
//! Vectors are stored normalized in one contiguous buffer, so a search is a
//! single pass of dot products followed by a ranked sort.

use crate::vector::dot_product;
use crate::{Error, Result, Vector};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One ranked hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedRecord {
    pub hack_id: String,
    pub text: String,
    pub score: f32,
    /// Insertion position in the corpus
    pub position: usize,
}

/// Ranked hits for one query, best first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub hits: Vec<RetrievedRecord>,
}

impl RetrievalResult {
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn hack_ids(&self) -> Vec<String> {
        self.hits.iter().map(|h| h.hack_id.clone()).collect()
    }

    pub fn texts(&self) -> Vec<String> {
        self.hits.iter().map(|h| h.text.clone()).collect()
    }

    pub fn scores(&self) -> Vec<f32> {
        self.hits.iter().map(|h| h.score).collect()
    }
}

pub struct VectorIndex {
    dim: usize,
    ids: Vec<String>,
    texts: Vec<String>,
    /// Row-major, `ids.len() * dim` normalized components
    data: Vec<f32>,
}

impl VectorIndex {
    /// Build the index from parallel lists of ids, vectors and texts
    pub fn build(ids: Vec<String>, vectors: Vec<Vector>, texts: Vec<String>) -> Result<Self> {
        if ids.is_empty() && vectors.is_empty() && texts.is_empty() {
            return Err(Error::EmptyCorpus);
        }
        if ids.len() != vectors.len() || ids.len() != texts.len() {
            return Err(Error::InvalidArgument(format!(
                "parallel lists differ in length: {} ids, {} vectors, {} texts",
                ids.len(),
                vectors.len(),
                texts.len()
            )));
        }

        if vectors[0].is_empty() {
            return Err(Error::InvalidArgument("vectors must not be empty".to_string()));
        }
        let dim = vectors[0].dim();

        let mut data = Vec::with_capacity(ids.len() * dim);
        for vector in &vectors {
            if vector.dim() != dim {
                return Err(Error::DimensionMismatch {
                    expected: dim,
                    actual: vector.dim(),
                });
            }
            data.extend_from_slice(vector.normalized().as_slice());
        }

        tracing::debug!(entries = ids.len(), dim, "vector index built");

        Ok(Self {
            dim,
            ids,
            texts,
            data,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dim
    }

    /// Id and text stored at an insertion position
    pub fn get(&self, position: usize) -> Option<(&str, &str)> {
        let id = self.ids.get(position)?;
        let text = self.texts.get(position)?;
        Some((id.as_str(), text.as_str()))
    }

    /// Return up to `k` entries ranked by cosine similarity to `query`.
    ///
    /// `k` is clamped to the corpus size. Equal scores keep insertion order.
    pub fn search(&self, query: &Vector, k: usize) -> Result<RetrievalResult> {
        if k == 0 {
            return Err(Error::InvalidArgument("k must be positive".to_string()));
        }
        if query.dim() != self.dim {
            return Err(Error::DimensionMismatch {
                expected: self.dim,
                actual: query.dim(),
            });
        }

        let query = query.normalized();
        let mut scored: Vec<(usize, f32)> = self
            .data
            .chunks_exact(self.dim)
            .map(|row| dot_product(row, query.as_slice()))
            .enumerate()
            .collect();

        scored.sort_by(|a, b| rank_order(a, b));
        scored.truncate(k.min(self.len()));

        let hits = scored
            .into_iter()
            .map(|(position, score)| RetrievedRecord {
                hack_id: self.ids[position].clone(),
                text: self.texts[position].clone(),
                score,
                position,
            })
            .collect();

        Ok(RetrievalResult { hits })
    }
}

/// Higher score first, then lower insertion position
fn rank_order(a: &(usize, f32), b: &(usize, f32)) -> Ordering {
    b.1.total_cmp(&a.1).then(a.0.cmp(&b.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("id{}", i)).collect()
    }

    fn texts(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("text {}", i)).collect()
    }

    fn sample_index() -> VectorIndex {
        let vectors = vec![
            Vector::new(vec![1.0, 0.0, 0.0]),
            Vector::new(vec![0.0, 1.0, 0.0]),
            Vector::new(vec![0.7, 0.7, 0.0]),
            Vector::new(vec![0.0, 0.0, 1.0]),
        ];
        VectorIndex::build(ids(4), vectors, texts(4)).unwrap()
    }

    #[test]
    fn test_empty_corpus_rejected() {
        let result = VectorIndex::build(Vec::new(), Vec::new(), Vec::new());
        assert!(matches!(result, Err(Error::EmptyCorpus)));
    }

    #[test]
    fn test_mismatched_lists_rejected() {
        let vectors = vec![Vector::new(vec![1.0, 0.0])];
        let result = VectorIndex::build(ids(2), vectors, texts(2));
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_mixed_dimensions_rejected() {
        let vectors = vec![Vector::new(vec![1.0, 0.0]), Vector::new(vec![1.0, 0.0, 0.0])];
        let result = VectorIndex::build(ids(2), vectors, texts(2));
        assert!(matches!(
            result,
            Err(Error::DimensionMismatch { expected: 2, actual: 3 })
        ));
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let vectors = vec![Vector::new(Vec::new())];
        let result = VectorIndex::build(ids(1), vectors, texts(1));
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_query_dimension_checked() {
        let index = sample_index();
        let result = index.search(&Vector::new(vec![1.0, 0.0]), 2);
        assert!(matches!(
            result,
            Err(Error::DimensionMismatch { expected: 3, actual: 2 })
        ));
    }

    #[test]
    fn test_search_ranking() {
        let index = sample_index();
        let result = index.search(&Vector::new(vec![1.0, 0.1, 0.0]), 3).unwrap();

        assert_eq!(result.hack_ids(), vec!["id0", "id2", "id1"]);
        for pair in result.hits.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_k_clamped_to_corpus() {
        let index = sample_index();
        let result = index.search(&Vector::new(vec![1.0, 0.0, 0.0]), 50).unwrap();
        assert_eq!(result.len(), 4);
    }

    #[test]
    fn test_zero_k_rejected() {
        let index = sample_index();
        let result = index.search(&Vector::new(vec![1.0, 0.0, 0.0]), 0);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let vectors = vec![
            Vector::new(vec![0.0, 1.0]),
            Vector::new(vec![1.0, 0.0]),
            Vector::new(vec![1.0, 0.0]),
            Vector::new(vec![2.0, 0.0]),
        ];
        let index = VectorIndex::build(ids(4), vectors, texts(4)).unwrap();
        let result = index.search(&Vector::new(vec![1.0, 0.0]), 4).unwrap();

        assert_eq!(result.hack_ids(), vec!["id1", "id2", "id3", "id0"]);
    }

    #[test]
    fn test_get_by_position() {
        let index = sample_index();
        assert_eq!(index.get(2), Some(("id2", "text 2")));
        assert_eq!(index.get(9), None);
    }
}
