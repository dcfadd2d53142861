//! Request classification: pure routing from request shape to strategy.
//!
//! The rules are an ordered precedence, not independent matchers:
//!
//! 1. non-GET → skip (mutating requests are never cached or replayed)
//! 2. cross-origin → skip (third-party content is left to the host)
//! 3. dynamic API prefix → network-first
//! 4. static asset extension → cache-first
//! 5. everything else (navigations included) → stale-while-revalidate
//!
//! API-like paths must never be stale-served even if they happen to end in
//! a matched extension, so the prefix check gates the extension check.

use crate::types::{FetchRequest, Url};

/// Path prefixes routed network-first by default.
pub const DEFAULT_API_PREFIXES: &[&str] = &["/api/"];

/// File extensions routed cache-first by default: stylesheets, scripts,
/// fonts, common image formats, and PDFs.
pub const DEFAULT_STATIC_EXTENSIONS: &[&str] = &[
    "css", "js", "mjs", "woff", "woff2", "ttf", "otf", "png", "jpg", "jpeg", "gif", "svg", "webp",
    "ico", "pdf",
];

/// The three fetch strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    CacheFirst,
    NetworkFirst,
    StaleWhileRevalidate,
}

impl Strategy {
    /// Stable label for metrics and spans.
    pub fn label(&self) -> &'static str {
        match self {
            Strategy::CacheFirst => "cache-first",
            Strategy::NetworkFirst => "network-first",
            Strategy::StaleWhileRevalidate => "stale-while-revalidate",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// The engine does not intercept; the request passes through untouched.
    Skip,
    /// Dispatch to the given strategy.
    Handle(Strategy),
}

/// Compiled-in routing rules plus the worker's own origin.
#[derive(Debug, Clone)]
pub struct Routes {
    origin: Url,
    api_prefixes: Vec<String>,
    static_extensions: Vec<String>,
}

impl Routes {
    /// Routes with the default prefix and extension sets.
    pub fn new(origin: Url) -> Self {
        Self::with_rules(
            origin,
            DEFAULT_API_PREFIXES.iter().map(|s| s.to_string()),
            DEFAULT_STATIC_EXTENSIONS.iter().map(|s| s.to_string()),
        )
    }

    pub fn with_rules(
        origin: Url,
        api_prefixes: impl IntoIterator<Item = String>,
        static_extensions: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            origin,
            api_prefixes: api_prefixes.into_iter().collect(),
            static_extensions: static_extensions.into_iter().collect(),
        }
    }

    /// Classify a request. Pure; a total function over the rule order.
    pub fn classify(&self, request: &FetchRequest) -> RouteDecision {
        if !request.method.is_get() {
            return RouteDecision::Skip;
        }
        if request.url.origin() != self.origin.origin() {
            return RouteDecision::Skip;
        }

        let path = request.url.path();
        if self.api_prefixes.iter().any(|p| path.starts_with(p.as_str())) {
            return RouteDecision::Handle(Strategy::NetworkFirst);
        }
        if let Some(ext) = extension(path)
            && self
                .static_extensions
                .iter()
                .any(|e| e.eq_ignore_ascii_case(ext))
        {
            return RouteDecision::Handle(Strategy::CacheFirst);
        }

        RouteDecision::Handle(Strategy::StaleWhileRevalidate)
    }
}

/// File extension of the last path segment, if any.
fn extension(path: &str) -> Option<&str> {
    let segment = path.rsplit('/').next()?;
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext)
}
