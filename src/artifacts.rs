//! Loading of the precomputed catalog and similarity artifacts.
//!
//! The catalog is JSON in one of two shapes:
//!
//! - records: `[{"title": "Avatar", ...}, ...]`
//! - columns: `{"title": {"0": "Avatar", "1": "Spectre"}, ...}` (row labels are
//!   catalog positions)
//!
//! The similarity matrix is a JSON array of rows. Any malformed or mismatched
//! artifact is an `ArtifactLoad` error; nothing here tries to repair input.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::catalog::ItemCatalog;
use crate::errors::{RecommendError, RecommendResult};
use crate::similarity_index::{SimilarityIndex, SimilarityMatrix};

#[derive(Debug, Deserialize)]
struct CatalogRecord {
    title: String,
}

#[derive(Debug, Deserialize)]
struct CatalogColumns {
    title: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    Records(Vec<CatalogRecord>),
    Columns(CatalogColumns),
}

fn read_artifact(path: &Path) -> RecommendResult<String> {
    fs::read_to_string(path).map_err(|e| RecommendError::artifact(path.display().to_string(), e.to_string()))
}

/// Parse catalog JSON; `source` only labels errors
pub fn parse_catalog(content: &str, source: &str) -> RecommendResult<ItemCatalog> {
    let file: CatalogFile = serde_json::from_str(content).map_err(|e| {
        RecommendError::artifact(
            source,
            format!("expected a list of records or a column map with a 'title' field ({})", e),
        )
    })?;

    let titles: Vec<String> = match file {
        CatalogFile::Records(records) => records.into_iter().map(|r| r.title).collect(),
        CatalogFile::Columns(columns) => {
            let mut rows = Vec::with_capacity(columns.title.len());
            for (label, title) in columns.title {
                let position: usize = label
                    .parse()
                    .map_err(|_| RecommendError::artifact(source, format!("row label '{}' is not a position", label)))?;
                rows.push((position, title));
            }
            rows.sort_by_key(|(position, _)| *position);
            if rows.iter().enumerate().any(|(expected, (position, _))| expected != *position) {
                return Err(RecommendError::artifact(source, "row labels are not contiguous from 0"));
            }
            rows.into_iter().map(|(_, title)| title).collect()
        }
    };

    if titles.is_empty() {
        return Err(RecommendError::artifact(source, "catalog is empty"));
    }
    Ok(ItemCatalog::from_titles(titles))
}

/// Parse similarity matrix JSON; `source` only labels errors
pub fn parse_similarity(content: &str, source: &str) -> RecommendResult<SimilarityMatrix> {
    let rows: Vec<Vec<f32>> = serde_json::from_str(content)
        .map_err(|e| RecommendError::artifact(source, format!("expected an array of numeric rows ({})", e)))?;

    SimilarityMatrix::from_rows(rows).map_err(|e| match e {
        RecommendError::ArtifactLoad { reason, .. } => RecommendError::artifact(source, reason),
        other => other,
    })
}

pub fn load_catalog(path: &Path) -> RecommendResult<ItemCatalog> {
    let content = read_artifact(path)?;
    parse_catalog(&content, &path.display().to_string())
}

pub fn load_similarity(path: &Path) -> RecommendResult<SimilarityMatrix> {
    let content = read_artifact(path)?;
    parse_similarity(&content, &path.display().to_string())
}

/// Load both artifacts and check that they line up
pub fn load_index(catalog_path: &Path, similarity_path: &Path) -> RecommendResult<SimilarityIndex> {
    let catalog = load_catalog(catalog_path)?;
    let matrix = load_similarity(similarity_path)?;
    let index = SimilarityIndex::new(catalog, matrix)?;
    log::info!(
        "Loaded {} catalog items from {} with similarity table {}",
        index.len(),
        catalog_path.display(),
        similarity_path.display()
    );
    Ok(index)
}
