//! # Application Setup
//!
//! Builds the recommendation pipeline from an [`AppConfig`]:
//!
//! 1. Load the catalog and similarity artifacts (fatal on failure)
//! 2. Create the lookup client from `config.lookup`
//! 3. Create one enrichment cache for the process and hand it to the enricher
//! 4. Wire the similarity index and enricher into a [`Recommender`]
//!
//! The cache lives exactly as long as the returned recommender; call
//! [`ConcurrentEnricher::shutdown`] through [`Recommender::enricher`] to stop
//! outstanding lookups before exit.

use std::sync::Arc;

use crate::artifacts::load_index;
use crate::concurrent_enricher::ConcurrentEnricher;
use crate::config::AppConfig;
use crate::enrichment_cache::EnrichmentCache;
use crate::enrichment_client::{EnrichmentClient, EnrichmentSource};
use crate::errors::RecommendResult;
use crate::recommender::Recommender;
use crate::similarity_index::SimilarityIndex;

/// Load artifacts named in `config` and build a recommender backed by the HTTP client
pub fn build_recommender(config: &AppConfig) -> RecommendResult<Recommender> {
    let index = load_index(&config.artifacts.catalog_path, &config.artifacts.similarity_path)?;

    if config.lookup.image_api_key.is_empty() || config.lookup.detail_api_key.is_empty() {
        log::warn!("Lookup API keys are not configured; enrichment requests will likely be rejected");
    }

    let client: Arc<dyn EnrichmentSource> = Arc::new(EnrichmentClient::with_config(config.lookup.clone()));
    Ok(assemble(index, client, config))
}

/// Wire an already-loaded index to any enrichment source
pub fn assemble(index: SimilarityIndex, source: Arc<dyn EnrichmentSource>, config: &AppConfig) -> Recommender {
    let cache = Arc::new(EnrichmentCache::with_config(source, config.cache.clone()));
    let enricher = Arc::new(ConcurrentEnricher::with_config(cache, config.enricher.clone()));

    log::info!(
        "Recommender ready: {} items, {} enrichment workers, task timeout {}ms",
        index.len(),
        config.enricher.worker_count,
        config.enricher.task_timeout_ms
    );
    Recommender::new(Arc::new(index), enricher)
}
