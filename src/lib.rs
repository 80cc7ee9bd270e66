// Module declarations
pub mod errors;
pub mod types;
pub mod catalog;
pub mod similarity_index;
pub mod enrichment_client;
pub mod enrichment_cache;
pub mod concurrent_enricher;
pub mod recommender;
pub mod artifacts;
pub mod config;
pub mod app_setup;

// Re-exports for commonly used types
pub use errors::{LookupError, LookupResult, RecommendError, RecommendResult};
pub use types::{EnrichmentResult, Item, RankedCandidate};
pub use catalog::ItemCatalog;
pub use similarity_index::{SimilarityIndex, SimilarityMatrix};
pub use enrichment_client::{EnrichmentClient, EnrichmentSource, LookupConfig};
pub use enrichment_cache::{CacheConfig, CacheMetrics, EnrichmentCache};
pub use concurrent_enricher::{ConcurrentEnricher, EnricherConfig};
pub use recommender::{Recommender, DEFAULT_TOP_K};
pub use config::AppConfig;
pub use app_setup::{assemble, build_recommender};
