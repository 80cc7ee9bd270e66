//! Precomputed pairwise similarity table aligned to catalog order.
//!
//! Row `i` holds the similarity of item `i` to every item, itself included.
//! No symmetry or normalization is assumed; scores are used exactly as loaded.

use crate::catalog::ItemCatalog;
use crate::errors::{RecommendError, RecommendResult};

/// Dense N×N score matrix stored row-major
#[derive(Debug, Clone, Default)]
pub struct SimilarityMatrix {
    dimension: usize,
    scores: Vec<f32>,
}

impl SimilarityMatrix {
    /// Build a matrix from rows, rejecting ragged or non-square input
    pub fn from_rows(rows: Vec<Vec<f32>>) -> RecommendResult<Self> {
        let dimension = rows.len();
        let mut scores = Vec::with_capacity(dimension * dimension);

        for (row_index, row) in rows.into_iter().enumerate() {
            if row.len() != dimension {
                return Err(RecommendError::artifact(
                    "similarity matrix",
                    format!("row {} has {} columns, expected {}", row_index, row.len(), dimension),
                ));
            }
            scores.extend(row);
        }

        Ok(Self { dimension, scores })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn row(&self, index: usize) -> Option<&[f32]> {
        if index >= self.dimension {
            return None;
        }
        let start = index * self.dimension;
        Some(&self.scores[start..start + self.dimension])
    }
}

/// Similarity rows addressable by catalog title
#[derive(Debug, Clone)]
pub struct SimilarityIndex {
    catalog: ItemCatalog,
    matrix: SimilarityMatrix,
}

impl SimilarityIndex {
    /// Pair a catalog with its matrix; the matrix dimension must equal the catalog size
    pub fn new(catalog: ItemCatalog, matrix: SimilarityMatrix) -> RecommendResult<Self> {
        if matrix.dimension() != catalog.len() {
            return Err(RecommendError::artifact(
                "similarity matrix",
                format!(
                    "matrix dimension {} does not match catalog size {}",
                    matrix.dimension(),
                    catalog.len()
                ),
            ));
        }
        Ok(Self { catalog, matrix })
    }

    pub fn catalog(&self) -> &ItemCatalog {
        &self.catalog
    }

    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    /// Similarity row for `title`, or `ItemNotFound`
    pub fn row_for(&self, title: &str) -> RecommendResult<&[f32]> {
        let index = self.catalog.index_of(title)?;
        self.row_at(index)
    }

    pub fn row_at(&self, index: usize) -> RecommendResult<&[f32]> {
        self.matrix
            .row(index)
            .ok_or(RecommendError::IndexOutOfRange { index, size: self.catalog.len() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> SimilarityIndex {
        let catalog = ItemCatalog::from_titles(["A", "B", "C"]);
        let matrix = SimilarityMatrix::from_rows(vec![
            vec![1.0, 0.2, 0.3],
            vec![0.2, 1.0, 0.7],
            vec![0.4, 0.7, 1.0],
        ])
        .unwrap();
        SimilarityIndex::new(catalog, matrix).unwrap()
    }

    #[test]
    fn test_row_for_title() {
        let index = sample_index();
        assert_eq!(index.row_for("B").unwrap(), &[0.2, 1.0, 0.7]);
    }

    #[test]
    fn test_asymmetric_rows_are_kept_as_loaded() {
        let index = sample_index();
        assert_eq!(index.row_for("A").unwrap()[2], 0.3);
        assert_eq!(index.row_for("C").unwrap()[0], 0.4);
    }

    #[test]
    fn test_row_for_unknown_title() {
        let index = sample_index();
        assert!(matches!(
            index.row_for("Z"),
            Err(RecommendError::ItemNotFound { .. })
        ));
    }

    #[test]
    fn test_ragged_matrix_rejected() {
        let result = SimilarityMatrix::from_rows(vec![vec![1.0, 0.5], vec![0.5]]);
        assert!(matches!(result, Err(RecommendError::ArtifactLoad { .. })));
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let catalog = ItemCatalog::from_titles(["A", "B", "C"]);
        let matrix = SimilarityMatrix::from_rows(vec![vec![1.0, 0.5], vec![0.5, 1.0]]).unwrap();
        assert!(matches!(
            SimilarityIndex::new(catalog, matrix),
            Err(RecommendError::ArtifactLoad { .. })
        ));
    }

    #[test]
    fn test_empty_index() {
        let index = SimilarityIndex::new(ItemCatalog::default(), SimilarityMatrix::default()).unwrap();
        assert!(index.is_empty());
        assert!(index.row_at(0).is_err());
    }
}
