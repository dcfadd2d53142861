//! Generation manager: owns the named caches for the current version.
//!
//! Two generations exist per deployed version — one for the precached
//! static assets, one for dynamic content captured at runtime. Names are
//! version-qualified (`{namespace}-static-{version}`), so bumping the
//! version string at deploy time forces wholesale replacement: the next
//! activation deletes every generation in the namespace whose name no
//! longer matches.
//!
//! The namespace prefix fences pruning off from other applications sharing
//! the same storage origin.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::Result;
use crate::store::{CacheStore, Generation};
use crate::telemetry;
use crate::types::{RequestKey, ResponseSnapshot};

/// Owns the current static and dynamic generations and prunes the rest.
pub struct GenerationManager {
    store: Arc<dyn CacheStore>,
    namespace: String,
    version: String,
}

impl GenerationManager {
    pub fn new(
        store: Arc<dyn CacheStore>,
        namespace: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            store,
            namespace: namespace.into(),
            version: version.into(),
        }
    }

    /// Name of the static-assets generation for the current version.
    pub fn static_name(&self) -> String {
        format!("{}-static-{}", self.namespace, self.version)
    }

    /// Name of the dynamic-content generation for the current version.
    pub fn dynamic_name(&self) -> String {
        format!("{}-dynamic-{}", self.namespace, self.version)
    }

    /// The generation names that survive an activation, in lookup order.
    pub fn current_names(&self) -> [String; 2] {
        [self.static_name(), self.dynamic_name()]
    }

    /// Idempotently open (creating if absent) the named generation.
    pub async fn ensure(&self, name: &str) -> Result<Arc<dyn Generation>> {
        self.store.open(name).await
    }

    pub async fn static_generation(&self) -> Result<Arc<dyn Generation>> {
        self.ensure(&self.static_name()).await
    }

    /// The dynamic generation is created lazily at first use.
    pub async fn dynamic_generation(&self) -> Result<Arc<dyn Generation>> {
        self.ensure(&self.dynamic_name()).await
    }

    /// Look a key up across the current generations, static first.
    pub async fn lookup_any(&self, key: &RequestKey) -> Result<Option<ResponseSnapshot>> {
        for name in self.current_names() {
            if let Some(snapshot) = self.ensure(&name).await?.lookup(key).await? {
                return Ok(Some(snapshot));
            }
        }
        Ok(None)
    }

    /// Delete every generation in this namespace that is not one of the
    /// current names. Generations outside the namespace are never touched.
    ///
    /// Deletion is awaited to completion before returning, so callers can
    /// guarantee no request is served from a generation mid-deletion.
    /// Returns the deleted names.
    #[instrument(skip(self), fields(namespace = %self.namespace, version = %self.version))]
    pub async fn prune_obsolete(&self) -> Result<Vec<String>> {
        let current = self.current_names();
        let prefix = format!("{}-", self.namespace);

        let mut removed = Vec::new();
        for name in self.store.names().await? {
            if !name.starts_with(&prefix) || current.contains(&name) {
                continue;
            }
            if self.store.delete(&name).await? {
                debug!(cache = %name, "deleted obsolete generation");
                removed.push(name);
            }
        }

        if !removed.is_empty() {
            metrics::counter!(telemetry::GENERATIONS_PRUNED_TOTAL).increment(removed.len() as u64);
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use bytes::Bytes;

    fn manager(store: Arc<MemoryStore>) -> GenerationManager {
        GenerationManager::new(store, "vordr", "v2")
    }

    fn key(url: &str) -> RequestKey {
        RequestKey {
            method: "GET".into(),
            url: url.into(),
        }
    }

    fn snap() -> ResponseSnapshot {
        ResponseSnapshot {
            status: 200,
            headers: vec![],
            body: Bytes::from("x"),
        }
    }

    #[test]
    fn names_are_version_qualified() {
        let m = manager(Arc::new(MemoryStore::new()));
        assert_eq!(m.static_name(), "vordr-static-v2");
        assert_eq!(m.dynamic_name(), "vordr-dynamic-v2");
    }

    #[tokio::test]
    async fn lookup_any_prefers_static() {
        let store = Arc::new(MemoryStore::new());
        let m = manager(store);
        let k = key("https://a/page");

        let dynamic = m.dynamic_generation().await.unwrap();
        dynamic
            .put(
                k.clone(),
                ResponseSnapshot {
                    status: 200,
                    headers: vec![],
                    body: Bytes::from("dynamic"),
                },
            )
            .await
            .unwrap();
        let fixed = m.static_generation().await.unwrap();
        fixed
            .put(
                k.clone(),
                ResponseSnapshot {
                    status: 200,
                    headers: vec![],
                    body: Bytes::from("static"),
                },
            )
            .await
            .unwrap();

        let got = m.lookup_any(&k).await.unwrap().unwrap();
        assert_eq!(got.body, Bytes::from("static"));
    }

    #[tokio::test]
    async fn prune_removes_only_stale_namespace_generations() {
        let store = Arc::new(MemoryStore::new());
        store.open("vordr-static-v1").await.unwrap();
        store.open("vordr-dynamic-v1").await.unwrap();
        store.open("vordr-static-v2").await.unwrap();
        store.open("other-app-cache").await.unwrap();

        let m = manager(Arc::clone(&store));
        let mut removed = m.prune_obsolete().await.unwrap();
        removed.sort();
        assert_eq!(removed, vec!["vordr-dynamic-v1", "vordr-static-v1"]);

        let mut names = store.names().await.unwrap();
        names.sort();
        assert_eq!(names, vec!["other-app-cache", "vordr-static-v2"]);
    }

    #[tokio::test]
    async fn prune_is_a_no_op_when_everything_is_current() {
        let store = Arc::new(MemoryStore::new());
        let m = manager(Arc::clone(&store));
        m.static_generation().await.unwrap();
        m.dynamic_generation().await.unwrap();

        assert!(m.prune_obsolete().await.unwrap().is_empty());
        assert_eq!(store.names().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn ensure_is_idempotent_across_calls() {
        let store = Arc::new(MemoryStore::new());
        let m = manager(store);
        let a = m.static_generation().await.unwrap();
        a.put(key("https://a/x"), snap()).await.unwrap();
        let b = m.static_generation().await.unwrap();
        assert_eq!(b.len().await.unwrap(), 1);
    }
}
