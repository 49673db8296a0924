#![allow(dead_code)]

//! Flat inner-product index over unit-normalized vectors.
//!
//! Build-once, query-many. Vectors are unit-normalized by the embedding
//! oracle, so inner product equals cosine similarity. This is the search
//! primitive contract, not an ANN library; an exhaustive scan is exact and
//! plenty for document-sized corpora.

/// Immutable vector index. Rebuilding means constructing a new one.
pub struct DenseIndex {
    vectors: Vec<Vec<f32>>,
}

impl DenseIndex {
    pub fn build(vectors: Vec<Vec<f32>>) -> Self {
        Self { vectors }
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Top-k entries ranked descending by inner product with `query`.
    /// Returns `(score, id)` pairs where `id` is the build-time position.
    pub fn query(&self, query: &[f32], k: usize) -> Vec<(f32, usize)> {
        let mut scored: Vec<(f32, usize)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(id, v)| (dot(query, v), id))
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        scored
    }
}

pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_ranks_by_inner_product() {
        let index = DenseIndex::build(vec![
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![0.6, 0.8],
        ]);
        let results = index.query(&[1.0, 0.0], 3);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].1, 0);
        assert!((results[0].0 - 1.0).abs() < 1e-6);
        assert_eq!(results[1].1, 2);
        assert!((results[1].0 - 0.6).abs() < 1e-6);
        assert_eq!(results[2].1, 1);
    }

    #[test]
    fn test_query_truncates_to_k() {
        let index = DenseIndex::build(vec![vec![1.0], vec![0.5], vec![0.2]]);
        assert_eq!(index.query(&[1.0], 2).len(), 2);
    }

    #[test]
    fn test_k_larger_than_corpus() {
        let index = DenseIndex::build(vec![vec![1.0]]);
        assert_eq!(index.query(&[1.0], 10).len(), 1);
    }

    #[test]
    fn test_empty_index_returns_nothing() {
        let index = DenseIndex::build(Vec::new());
        assert!(index.is_empty());
        assert!(index.query(&[1.0], 5).is_empty());
    }

    #[test]
    fn test_dot_product() {
        assert!((dot(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]) - 32.0).abs() < 1e-6);
    }
}
