//! The three fetch strategies.
//!
//! Each strategy is an async procedure over a single request sharing one
//! contract: return a response to the caller, eventually. Network errors
//! are never retried; each strategy degrades exactly once (to cache, or
//! to the shell page) and then surfaces the error if no degrade path
//! yields a response.
//!
//! # Degrade paths
//!
//! ```text
//! cache-first:   cache ──miss──► network ──► store ──► live
//!                  │ hit                        │ fail
//!                  ▼                            ▼
//!                cached                       error
//!
//! network-first: network ──► store ──► live
//!                  │ fail
//!                  ▼
//!                cache ──miss──► shell (documents only) ──miss──► error
//!
//! swr:           cache hit ──► cached  (+ detached refresh, never awaited)
//!                cache miss ──► network ──► store ──► live | error
//! ```
//!
//! Responses handed to both the caller and the cache writer are duplicated
//! at the fork point ([`FetchResponse::fork`]); only 2xx responses are
//! snapshotted.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, instrument, warn};

use crate::Result;
use crate::classify::Strategy;
use crate::fetch::{FetchResponse, Fetcher};
use crate::generations::GenerationManager;
use crate::telemetry;
use crate::types::{Destination, FetchRequest, RequestKey};

/// Executes classified requests against the cache generations and the
/// network.
pub struct StrategyEngine {
    generations: Arc<GenerationManager>,
    fetcher: Arc<dyn Fetcher>,
    shell_key: RequestKey,
}

impl StrategyEngine {
    pub fn new(
        generations: Arc<GenerationManager>,
        fetcher: Arc<dyn Fetcher>,
        shell_key: RequestKey,
    ) -> Self {
        Self {
            generations,
            fetcher,
            shell_key,
        }
    }

    /// Run the given strategy for one request, recording outcome metrics.
    pub async fn dispatch(
        &self,
        strategy: Strategy,
        request: &FetchRequest,
    ) -> Result<FetchResponse> {
        let start = Instant::now();
        let result = match strategy {
            Strategy::CacheFirst => self.cache_first(request).await,
            Strategy::NetworkFirst => self.network_first(request).await,
            Strategy::StaleWhileRevalidate => self.stale_while_revalidate(request).await,
        };
        record_dispatch(strategy, start, result.is_ok());
        result
    }

    /// Cache-first: known static assets cost zero round-trips.
    ///
    /// A never-before-seen asset with no network is a hard miss; the fetch
    /// error propagates with no further fallback.
    #[instrument(skip(self, request), fields(strategy = "cache-first", url = %request.url))]
    pub async fn cache_first(&self, request: &FetchRequest) -> Result<FetchResponse> {
        let key = RequestKey::of(request);
        if let Some(snapshot) = self.generations.lookup_any(&key).await? {
            record_lookup(Strategy::CacheFirst, true);
            return Ok(FetchResponse::from_snapshot(snapshot));
        }
        record_lookup(Strategy::CacheFirst, false);

        let live = self.fetcher.fetch(request).await?;
        if !live.ok() {
            return Ok(live);
        }
        let (live, copy) = live.fork();
        let snapshot = copy.into_snapshot().await?;
        self.generations
            .static_generation()
            .await?
            .put(key, snapshot)
            .await?;
        Ok(live)
    }

    /// Network-first: dynamic data is never stale-served, but an offline
    /// hit still gets the last captured snapshot, and navigations degrade
    /// all the way to the cached shell page.
    #[instrument(skip(self, request), fields(strategy = "network-first", url = %request.url))]
    pub async fn network_first(&self, request: &FetchRequest) -> Result<FetchResponse> {
        let key = RequestKey::of(request);
        let err = match self.fetcher.fetch(request).await {
            Ok(live) if live.ok() => {
                let (live, copy) = live.fork();
                let snapshot = copy.into_snapshot().await?;
                self.generations
                    .dynamic_generation()
                    .await?
                    .put(key, snapshot)
                    .await?;
                return Ok(live);
            }
            Ok(live) => return Ok(live),
            Err(err) => err,
        };

        warn!(error = %err, "network-first fetch failed, degrading to cache");
        if let Some(snapshot) = self.generations.lookup_any(&key).await? {
            record_fallback("cache");
            return Ok(FetchResponse::from_snapshot(snapshot));
        }
        if request.destination == Destination::Document
            && let Some(shell) = self
                .generations
                .static_generation()
                .await?
                .lookup(&self.shell_key)
                .await?
        {
            record_fallback("shell");
            return Ok(FetchResponse::from_snapshot(shell));
        }
        Err(err)
    }

    /// Stale-while-revalidate: return the cached snapshot immediately and
    /// refresh it in the background; the caller never waits on the refresh.
    ///
    /// Only when nothing is cached does the caller wait on the network,
    /// and a failure there is surfaced as-is — no shell fallback in this
    /// path, unlike network-first.
    #[instrument(skip(self, request), fields(strategy = "stale-while-revalidate", url = %request.url))]
    pub async fn stale_while_revalidate(&self, request: &FetchRequest) -> Result<FetchResponse> {
        let key = RequestKey::of(request);
        if let Some(snapshot) = self.generations.lookup_any(&key).await? {
            record_lookup(Strategy::StaleWhileRevalidate, true);
            self.spawn_refresh(request.clone(), key);
            return Ok(FetchResponse::from_snapshot(snapshot));
        }
        record_lookup(Strategy::StaleWhileRevalidate, false);

        let live = self.fetcher.fetch(request).await?;
        if !live.ok() {
            return Ok(live);
        }
        let (live, copy) = live.fork();
        let snapshot = copy.into_snapshot().await?;
        self.generations
            .dynamic_generation()
            .await?
            .put(key, snapshot)
            .await?;
        Ok(live)
    }

    /// Fire-and-forget revalidation. The task is detached; its rejection
    /// is caught and logged so it never surfaces as an unhandled error.
    fn spawn_refresh(&self, request: FetchRequest, key: RequestKey) {
        let fetcher = Arc::clone(&self.fetcher);
        let generations = Arc::clone(&self.generations);
        tokio::spawn(async move {
            if let Err(err) = refresh(fetcher, generations, &request, key).await {
                metrics::counter!(telemetry::REFRESH_FAILURES_TOTAL).increment(1);
                debug!(url = %request.url, error = %err, "background refresh failed");
            }
        });
    }
}

/// One revalidation fetch: capture into the dynamic generation for next time.
async fn refresh(
    fetcher: Arc<dyn Fetcher>,
    generations: Arc<GenerationManager>,
    request: &FetchRequest,
    key: RequestKey,
) -> Result<()> {
    let response = fetcher.fetch(request).await?;
    if !response.ok() {
        return Ok(());
    }
    let snapshot = response.into_snapshot().await?;
    generations
        .dynamic_generation()
        .await?
        .put(key, snapshot)
        .await?;
    Ok(())
}

fn record_dispatch(strategy: Strategy, start: Instant, ok: bool) {
    let status = if ok { "ok" } else { "error" };
    metrics::counter!(telemetry::FETCHES_TOTAL,
        "strategy" => strategy.label(),
        "status" => status,
    )
    .increment(1);
    metrics::histogram!(telemetry::FETCH_DURATION_SECONDS,
        "strategy" => strategy.label(),
    )
    .record(start.elapsed().as_secs_f64());
}

fn record_lookup(strategy: Strategy, hit: bool) {
    let name = if hit {
        telemetry::CACHE_HITS_TOTAL
    } else {
        telemetry::CACHE_MISSES_TOTAL
    };
    metrics::counter!(name, "strategy" => strategy.label()).increment(1);
}

fn record_fallback(kind: &'static str) {
    metrics::counter!(telemetry::FALLBACKS_TOTAL, "fallback" => kind).increment(1);
}
