//! Telemetry metric name constants.
//!
//! Centralised metric names for vordr operations. Consumers install their
//! own `metrics` recorder (e.g. prometheus, statsd); without a recorder
//! installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `vordr_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `strategy` — dispatch strategy ("cache-first", "network-first",
//!   "stale-while-revalidate")
//! - `status` — outcome: "ok" or "error"
//! - `fallback` — degrade path taken by network-first: "cache" or "shell"

/// Total intercepted requests dispatched to a strategy.
///
/// Labels: `strategy`, `status` ("ok" | "error").
pub const FETCHES_TOTAL: &str = "vordr_fetches_total";

/// Strategy dispatch duration in seconds.
///
/// Labels: `strategy`.
pub const FETCH_DURATION_SECONDS: &str = "vordr_fetch_duration_seconds";

/// Total cache hits.
///
/// Labels: `strategy`.
pub const CACHE_HITS_TOTAL: &str = "vordr_cache_hits_total";

/// Total cache misses.
///
/// Labels: `strategy`.
pub const CACHE_MISSES_TOTAL: &str = "vordr_cache_misses_total";

/// Total offline fallbacks served by the network-first strategy.
///
/// Labels: `fallback` ("cache" | "shell").
pub const FALLBACKS_TOTAL: &str = "vordr_fallbacks_total";

/// Total background revalidation fetches that failed.
///
/// No labels. Failures are absorbed, never surfaced to the caller.
pub const REFRESH_FAILURES_TOTAL: &str = "vordr_refresh_failures_total";

/// Total obsolete generations deleted during activation.
///
/// No labels.
pub const GENERATIONS_PRUNED_TOTAL: &str = "vordr_generations_pruned_total";
