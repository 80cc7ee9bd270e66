use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Instant;

use lru::LruCache;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::enrichment_client::EnrichmentSource;
use crate::errors::LookupError;
use crate::types::EnrichmentResult;

/// Configuration for the enrichment cache
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of titles kept; `None` keeps every entry for the cache's lifetime
    pub max_entries: Option<usize>,
    /// Enable hit/miss accounting
    pub enable_metrics: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: None,
            enable_metrics: true,
        }
    }
}

/// Cache hit/miss statistics
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CacheMetrics {
    pub hits: u64,
    pub misses: u64,
    pub insertions: u64,
    /// Entries pushed out by the LRU bound
    pub evictions: u64,
    /// Fetches that hit a transport fault and were not stored
    pub fetch_failures: u64,
    /// Average source fetch time (ms) for misses
    pub avg_fetch_time_ms: f64,
    /// Cache hit rate (0.0 to 1.0)
    pub hit_rate: f64,
}

impl CacheMetrics {
    pub fn update_hit_rate(&mut self) {
        let total_requests = self.hits + self.misses;
        self.hit_rate = if total_requests > 0 {
            self.hits as f64 / total_requests as f64
        } else {
            0.0
        };
    }

    pub fn update_avg_fetch_time(&mut self, time_ms: f64) {
        // Exponential moving average
        let alpha = 0.1;
        self.avg_fetch_time_ms = if self.avg_fetch_time_ms == 0.0 {
            time_ms
        } else {
            alpha * time_ms + (1.0 - alpha) * self.avg_fetch_time_ms
        };
    }
}

/// Per-title memo of enrichment results.
///
/// Concurrent first requests for the same title may both reach the source;
/// the last completed fetch wins. Results touched by a transport fault are
/// returned (empty, or partial when one lookup succeeded) but never stored.
#[derive(Clone)]
pub struct EnrichmentCache {
    source: Arc<dyn EnrichmentSource>,
    entries: Arc<RwLock<LruCache<String, EnrichmentResult>>>,
    config: CacheConfig,
    metrics: Arc<RwLock<CacheMetrics>>,
}

impl EnrichmentCache {
    pub fn new(source: Arc<dyn EnrichmentSource>) -> Self {
        Self::with_config(source, CacheConfig::default())
    }

    pub fn with_config(source: Arc<dyn EnrichmentSource>, config: CacheConfig) -> Self {
        let entries = match config.max_entries.and_then(NonZeroUsize::new) {
            Some(capacity) => LruCache::new(capacity),
            None => LruCache::unbounded(),
        };

        Self {
            source,
            entries: Arc::new(RwLock::new(entries)),
            config,
            metrics: Arc::new(RwLock::new(CacheMetrics::default())),
        }
    }

    /// Stored result for `title`, or fetch it from the source and store it
    pub async fn get_or_fetch(&self, title: &str) -> EnrichmentResult {
        let hit = self.get(title).await;
        self.record_lookup(hit.is_some()).await;

        if let Some(hit) = hit {
            log::debug!("Cache HIT for '{}'", title);
            return hit;
        }
        log::debug!("Cache MISS for '{}'", title);

        let start_time = Instant::now();
        match self.source.fetch(title).await {
            Ok(result) => {
                let elapsed_ms = start_time.elapsed().as_secs_f64() * 1000.0;
                self.insert(title, result.clone(), elapsed_ms).await;
                result
            }
            Err(LookupError::Incomplete { result, cause }) => {
                log::warn!("Enrichment for '{}' is partial and will not be stored: {}", title, cause);
                self.record_failure().await;
                *result
            }
            Err(e) => {
                log::warn!("Enrichment for '{}' degraded to empty result: {}", title, e);
                self.record_failure().await;
                EnrichmentResult::absent(title)
            }
        }
    }

    /// Look up a stored result, refreshing its recency.
    ///
    /// Hit/miss counters only track `get_or_fetch`, so peeking here leaves them alone.
    pub async fn get(&self, title: &str) -> Option<EnrichmentResult> {
        let mut entries = self.entries.write().await;
        entries.get(title).cloned()
    }

    async fn record_lookup(&self, hit: bool) {
        if self.config.enable_metrics {
            let mut metrics = self.metrics.write().await;
            if hit {
                metrics.hits += 1;
            } else {
                metrics.misses += 1;
            }
            metrics.update_hit_rate();
        }
    }

    async fn record_failure(&self) {
        if self.config.enable_metrics {
            let mut metrics = self.metrics.write().await;
            metrics.fetch_failures += 1;
        }
    }

    async fn insert(&self, title: &str, result: EnrichmentResult, fetch_time_ms: f64) {
        let will_evict = {
            let mut entries = self.entries.write().await;
            let will_evict = entries.len() >= entries.cap().get() && !entries.contains(title);
            entries.put(title.to_string(), result);
            will_evict
        };

        if self.config.enable_metrics {
            let mut metrics = self.metrics.write().await;
            metrics.insertions += 1;
            if will_evict {
                metrics.evictions += 1;
            }
            metrics.update_avg_fetch_time(fetch_time_ms);
        }
    }

    pub async fn contains(&self, title: &str) -> bool {
        let entries = self.entries.read().await;
        entries.peek(title).is_some()
    }

    pub async fn len(&self) -> usize {
        let entries = self.entries.read().await;
        entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        entries.clear();

        if self.config.enable_metrics {
            let mut metrics = self.metrics.write().await;
            *metrics = CacheMetrics::default();
        }
        log::debug!("Enrichment cache cleared");
    }

    pub async fn metrics(&self) -> CacheMetrics {
        if self.config.enable_metrics {
            self.metrics.read().await.clone()
        } else {
            CacheMetrics::default()
        }
    }

    pub fn get_config(&self) -> &CacheConfig {
        &self.config
    }
}
