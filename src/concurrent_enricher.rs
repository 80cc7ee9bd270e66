//! Order-preserving batch enrichment over a bounded worker pool.
//!
//! Every title becomes one task. Tasks wait for a pool permit, then go
//! through the shared [`EnrichmentCache`]. Results are joined in spawn order,
//! so output position `i` always belongs to input title `i` no matter which
//! task finishes first. Any per-task failure (transport fault, timeout,
//! cancellation, panic) degrades to an empty result for that title only.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tokio::sync::{Notify, Semaphore};

use crate::enrichment_cache::EnrichmentCache;
use crate::enrichment_client::is_timeout;
use crate::errors::{LookupError, LookupResult};
use crate::types::EnrichmentResult;

/// Configuration for the enrichment worker pool
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnricherConfig {
    /// Maximum number of enrichment tasks running at once (default: CPU count)
    pub worker_count: usize,
    /// Per-task deadline in milliseconds; 0 disables the deadline
    pub task_timeout_ms: u64,
}

impl Default for EnricherConfig {
    fn default() -> Self {
        Self {
            worker_count: num_cpus::get().max(1),
            task_timeout_ms: 10_000,
        }
    }
}

impl EnricherConfig {
    fn task_timeout(&self) -> Option<Duration> {
        (self.task_timeout_ms > 0).then(|| Duration::from_millis(self.task_timeout_ms))
    }
}

/// Thread-safe cancellation token for cooperative cancellation
#[derive(Debug, Default)]
pub struct CancellationToken {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once `cancel` has been called
    pub async fn cancelled(&self) {
        loop {
            let notified = self.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

/// Dispatches cache lookups for a batch of titles across a bounded pool
pub struct ConcurrentEnricher {
    cache: Arc<EnrichmentCache>,
    permits: Arc<Semaphore>,
    cancellation_token: Arc<CancellationToken>,
    config: EnricherConfig,
}

impl ConcurrentEnricher {
    pub fn new(cache: Arc<EnrichmentCache>) -> Self {
        Self::with_config(cache, EnricherConfig::default())
    }

    pub fn with_config(cache: Arc<EnrichmentCache>, config: EnricherConfig) -> Self {
        let worker_count = config.worker_count.max(1);
        Self {
            cache,
            permits: Arc::new(Semaphore::new(worker_count)),
            cancellation_token: Arc::new(CancellationToken::new()),
            config,
        }
    }

    pub fn cache(&self) -> &Arc<EnrichmentCache> {
        &self.cache
    }

    pub fn get_config(&self) -> &EnricherConfig {
        &self.config
    }

    /// Enrich `titles`, returning one result per title in input order.
    ///
    /// Waits for every task; there are no partial results.
    pub async fn enrich(&self, titles: &[String]) -> Vec<EnrichmentResult> {
        if titles.is_empty() {
            return Vec::new();
        }

        let start_time = Instant::now();
        let task_timeout = self.config.task_timeout();

        let handles: Vec<_> = titles
            .iter()
            .enumerate()
            .map(|(position, title)| {
                tokio::spawn(Self::run_task(
                    position,
                    title.clone(),
                    self.cache.clone(),
                    self.permits.clone(),
                    self.cancellation_token.clone(),
                    task_timeout,
                ))
            })
            .collect();

        let results: Vec<EnrichmentResult> = join_all(handles)
            .await
            .into_iter()
            .zip(titles)
            .map(|(outcome, title)| match outcome {
                Ok(result) => result,
                Err(e) => {
                    log::warn!("Enrichment task for '{}' aborted: {}", title, e);
                    EnrichmentResult::absent(title.as_str())
                }
            })
            .collect();

        let degraded = results.iter().filter(|r| r.is_empty()).count();
        log::info!(
            "Enriched {} titles in {:?} ({} without metadata)",
            results.len(),
            start_time.elapsed(),
            degraded
        );
        results
    }

    /// Stop accepting work; queued and in-flight tasks resolve to empty results
    pub fn shutdown(&self) {
        log::info!("Shutting down enrichment pool");
        self.cancellation_token.cancel();
        self.permits.close();
    }

    pub fn is_shut_down(&self) -> bool {
        self.cancellation_token.is_cancelled()
    }

    async fn run_task(
        position: usize,
        title: String,
        cache: Arc<EnrichmentCache>,
        permits: Arc<Semaphore>,
        cancellation_token: Arc<CancellationToken>,
        task_timeout: Option<Duration>,
    ) -> EnrichmentResult {
        let _permit = tokio::select! {
            permit = permits.acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => return EnrichmentResult::absent(title),
            },
            _ = cancellation_token.cancelled() => return EnrichmentResult::absent(title),
        };

        if cancellation_token.is_cancelled() {
            return EnrichmentResult::absent(title);
        }

        log::debug!("Task {} enriching '{}'", position, title);
        let outcome = tokio::select! {
            result = Self::with_deadline(&title, cache.get_or_fetch(&title), task_timeout) => result,
            _ = cancellation_token.cancelled() => Err(LookupError::Cancelled { title: title.clone() }),
        };

        match outcome {
            Ok(result) => result,
            Err(e) => {
                if is_timeout(&e) {
                    log::warn!("Task {} timed out: {}", position, e);
                } else {
                    log::debug!("Task {} stopped: {}", position, e);
                }
                EnrichmentResult::absent(title)
            }
        }
    }

    async fn with_deadline<F>(title: &str, future: F, deadline: Option<Duration>) -> LookupResult<EnrichmentResult>
    where
        F: Future<Output = EnrichmentResult>,
    {
        match deadline {
            Some(deadline) => tokio::time::timeout(deadline, future)
                .await
                .map_err(|_| LookupError::Timeout {
                    title: title.to_string(),
                    timeout_ms: deadline.as_millis() as u64,
                }),
            None => Ok(future.await),
        }
    }
}

impl Drop for ConcurrentEnricher {
    fn drop(&mut self) {
        // Wake anything still waiting on a permit
        self.cancellation_token.cancel();
    }
}
