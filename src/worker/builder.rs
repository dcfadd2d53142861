//! Builder for configuring worker instances

use std::sync::Arc;

use crate::classify::{DEFAULT_API_PREFIXES, DEFAULT_STATIC_EXTENSIONS, Routes};
use crate::events::{EventHandlers, Notifier};
use crate::fetch::{Fetcher, HttpFetcher};
use crate::generations::GenerationManager;
use crate::store::{CacheStore, MemoryStore};
use crate::strategy::StrategyEngine;
use crate::types::{AssetManifest, RequestKey, Url};
use crate::{Result, VordrError};

use super::Worker;

/// Main entry point for creating worker instances.
pub struct Vordr;

impl Vordr {
    /// Create a new builder for configuring the worker.
    pub fn builder() -> VordrBuilder {
        VordrBuilder::new()
    }
}

/// Builder for configuring worker instances.
///
/// The generation name strings are derived from `namespace` and `version`;
/// the version must change whenever deployed static content changes, to
/// force generation replacement on the next activation.
pub struct VordrBuilder {
    origin: Option<String>,
    namespace: String,
    version: String,
    manifest: Vec<String>,
    shell: String,
    api_prefixes: Vec<String>,
    static_extensions: Vec<String>,
    skip_waiting: bool,
    store: Option<Arc<dyn CacheStore>>,
    fetcher: Option<Arc<dyn Fetcher>>,
    notifier: Option<Arc<dyn Notifier>>,
}

impl VordrBuilder {
    pub fn new() -> Self {
        Self {
            origin: None,
            namespace: "vordr".to_string(),
            version: "v1".to_string(),
            manifest: Vec::new(),
            shell: "/index.html".to_string(),
            api_prefixes: DEFAULT_API_PREFIXES.iter().map(|s| s.to_string()).collect(),
            static_extensions: DEFAULT_STATIC_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            skip_waiting: true,
            store: None,
            fetcher: None,
            notifier: None,
        }
    }

    /// The worker's own origin. Required; only same-origin requests are
    /// ever intercepted.
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Namespace prefix for generation names (default `"vordr"`). Fences
    /// pruning off from other applications on the same storage origin.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Deployed version string (default `"v1"`).
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Set the precache manifest (absolute paths, order preserved).
    pub fn precache<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.manifest = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Append one path to the precache manifest.
    pub fn asset(mut self, path: impl Into<String>) -> Self {
        self.manifest.push(path.into());
        self
    }

    /// The shell page path (default `"/index.html"`): the ultimate offline
    /// fallback for navigations. Must appear in the precache manifest.
    pub fn shell(mut self, path: impl Into<String>) -> Self {
        self.shell = path.into();
        self
    }

    /// Add a dynamic-API path prefix routed network-first.
    pub fn api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefixes.push(prefix.into());
        self
    }

    /// Add a file extension routed cache-first.
    pub fn static_extension(mut self, ext: impl Into<String>) -> Self {
        self.static_extensions.push(ext.into());
        self
    }

    /// Whether a successful install rolls straight into activation
    /// (default `true`).
    pub fn skip_waiting(mut self, yes: bool) -> Self {
        self.skip_waiting = yes;
        self
    }

    /// Use a custom cache store (default: in-memory).
    pub fn store(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Use a custom fetcher (default: [`HttpFetcher`]).
    pub fn fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Set the notification hook for push events.
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Build the worker.
    pub fn build(self) -> Result<Worker> {
        let origin = self
            .origin
            .ok_or_else(|| VordrError::Configuration("origin is required".to_string()))?;
        let origin = Url::parse(&origin).map_err(|e| VordrError::InvalidUrl(e.to_string()))?;
        if origin.host_str().is_none() {
            return Err(VordrError::Configuration(format!(
                "origin must have a host: {origin}"
            )));
        }

        let manifest = AssetManifest::new(self.manifest)?;
        if !manifest.contains(&self.shell) {
            return Err(VordrError::Configuration(format!(
                "precache manifest must include the shell path {}",
                self.shell
            )));
        }

        let store = self.store.unwrap_or_else(|| Arc::new(MemoryStore::new()));
        let fetcher: Arc<dyn Fetcher> = self
            .fetcher
            .unwrap_or_else(|| Arc::new(HttpFetcher::new()));

        let shell_url = origin
            .join(&self.shell)
            .map_err(|e| VordrError::InvalidUrl(e.to_string()))?;
        let shell_key = RequestKey::get(&shell_url);

        let generations = Arc::new(GenerationManager::new(store, self.namespace, self.version));
        let engine = StrategyEngine::new(
            Arc::clone(&generations),
            Arc::clone(&fetcher),
            shell_key,
        );
        let routes = Routes::with_rules(origin.clone(), self.api_prefixes, self.static_extensions);
        let events = EventHandlers::new(self.notifier);

        Ok(Worker::new(
            origin,
            manifest,
            routes,
            engine,
            generations,
            fetcher,
            events,
            self.skip_waiting,
        ))
    }
}

impl Default for VordrBuilder {
    fn default() -> Self {
        Self::new()
    }
}
