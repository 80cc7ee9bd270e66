//! Top-k recommendation over a precomputed similarity table.
//!
//! ## Ranking
//!
//! 1. Resolve the query title to its catalog index (first exact match)
//! 2. Pair every index with its score from the query row, in catalog order
//! 3. Stable sort by score descending, so equal scores keep ascending index order
//! 4. Drop the query item by index identity, wherever it landed
//! 5. Keep the first `k`
//!
//! Non-finite scores sort after every finite score. Ranking is synchronous and
//! never touches the network; only [`Recommender::recommend`] enriches.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::concurrent_enricher::ConcurrentEnricher;
use crate::errors::RecommendResult;
use crate::similarity_index::SimilarityIndex;
use crate::types::{EnrichmentResult, RankedCandidate};

/// Number of recommendations returned when the caller does not choose
pub const DEFAULT_TOP_K: usize = 5;

/// Descending score, NaN last
fn by_score_descending(a: &RankedCandidate, b: &RankedCandidate) -> Ordering {
    match (a.score.is_nan(), b.score.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal),
    }
}

/// Rank a similarity row, excluding `query_index`, and keep the best `k`
pub fn rank_row(row: &[f32], query_index: usize, k: usize) -> Vec<RankedCandidate> {
    let mut candidates: Vec<RankedCandidate> = row
        .iter()
        .enumerate()
        .map(|(index, &score)| RankedCandidate { index, score })
        .collect();

    // sort_by is stable: ties stay in ascending index order
    candidates.sort_by(by_score_descending);

    candidates
        .into_iter()
        .filter(|candidate| candidate.index != query_index)
        .take(k)
        .collect()
}

/// Ranks catalog items against a query item and enriches the winners
pub struct Recommender {
    index: Arc<SimilarityIndex>,
    enricher: Arc<ConcurrentEnricher>,
}

impl Recommender {
    pub fn new(index: Arc<SimilarityIndex>, enricher: Arc<ConcurrentEnricher>) -> Self {
        Self { index, enricher }
    }

    pub fn index(&self) -> &Arc<SimilarityIndex> {
        &self.index
    }

    pub fn enricher(&self) -> &Arc<ConcurrentEnricher> {
        &self.enricher
    }

    /// Ranked candidates for `title`, or `ItemNotFound`
    pub fn try_rank(&self, title: &str, k: usize) -> RecommendResult<Vec<RankedCandidate>> {
        let query_index = self.index.catalog().index_of(title)?;
        let row = self.index.row_at(query_index)?;
        Ok(rank_row(row, query_index, k))
    }

    /// Titles of the `k` items most similar to `title`, best first.
    ///
    /// Unknown titles yield an empty list; callers check for emptiness.
    pub fn rank(&self, title: &str, k: usize) -> Vec<String> {
        let candidates = match self.try_rank(title, k) {
            Ok(candidates) => candidates,
            Err(e) => {
                log::warn!("No recommendations for '{}': {}", title, e);
                return Vec::new();
            }
        };

        candidates
            .iter()
            .filter_map(|candidate| self.index.catalog().get(candidate.index))
            .map(|item| item.title.clone())
            .collect()
    }

    /// Rank, then enrich the top `k` titles in rank order
    pub async fn recommend(&self, title: &str, k: usize) -> Vec<EnrichmentResult> {
        let titles = self.rank(title, k);
        if titles.is_empty() {
            return Vec::new();
        }
        log::info!("Recommending {} titles for '{}'", titles.len(), title);
        self.enricher.enrich(&titles).await
    }
}
