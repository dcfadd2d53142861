//! In-memory cache store backend.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::types::{RequestKey, ResponseSnapshot};
use crate::{Result, VordrError};

use super::{CacheStore, Generation};

/// In-process [`CacheStore`] backed by tokio `RwLock` maps.
///
/// Entries within a generation keep insertion order. An optional quota
/// bounds the total entry count across all generations; exceeding it
/// surfaces [`VordrError::Storage`] to the caller — there is no LRU
/// trimming below generation granularity.
pub struct MemoryStore {
    shared: Arc<Shared>,
}

struct Shared {
    generations: RwLock<HashMap<String, Arc<MemoryGeneration>>>,
    quota: Option<usize>,
    used: AtomicUsize,
}

impl MemoryStore {
    /// Create an unbounded store.
    pub fn new() -> Self {
        Self::with_capacity(None)
    }

    /// Create a store that fails puts once `max_entries` total entries
    /// exist across all generations.
    pub fn with_quota(max_entries: usize) -> Self {
        Self::with_capacity(Some(max_entries))
    }

    fn with_capacity(quota: Option<usize>) -> Self {
        Self {
            shared: Arc::new(Shared {
                generations: RwLock::new(HashMap::new()),
                quota,
                used: AtomicUsize::new(0),
            }),
        }
    }

    /// Total entries across all generations.
    pub fn used(&self) -> usize {
        self.shared.used.load(Ordering::Relaxed)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn open(&self, name: &str) -> Result<Arc<dyn Generation>> {
        let mut generations = self.shared.generations.write().await;
        let generation = generations
            .entry(name.to_string())
            .or_insert_with(|| {
                Arc::new(MemoryGeneration {
                    name: name.to_string(),
                    entries: RwLock::new(Vec::new()),
                    shared: Arc::clone(&self.shared),
                })
            })
            .clone();
        Ok(generation)
    }

    async fn delete(&self, name: &str) -> Result<bool> {
        let removed = self.shared.generations.write().await.remove(name);
        match removed {
            Some(generation) => {
                let dropped = generation.entries.read().await.len();
                self.shared.used.fetch_sub(dropped, Ordering::Relaxed);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn names(&self) -> Result<Vec<String>> {
        Ok(self
            .shared
            .generations
            .read()
            .await
            .keys()
            .cloned()
            .collect())
    }
}

/// One named partition of a [`MemoryStore`].
struct MemoryGeneration {
    name: String,
    // Insertion-ordered; a put overwrites in place.
    entries: RwLock<Vec<(RequestKey, ResponseSnapshot)>>,
    shared: Arc<Shared>,
}

#[async_trait]
impl Generation for MemoryGeneration {
    fn name(&self) -> &str {
        &self.name
    }

    async fn lookup(&self, key: &RequestKey) -> Result<Option<ResponseSnapshot>> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, snapshot)| snapshot.clone()))
    }

    async fn put(&self, key: RequestKey, snapshot: ResponseSnapshot) -> Result<()> {
        let mut entries = self.entries.write().await;
        if let Some(slot) = entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = snapshot;
            return Ok(());
        }
        if let Some(quota) = self.shared.quota
            && self.shared.used.load(Ordering::Relaxed) >= quota
        {
            return Err(VordrError::Storage(format!(
                "quota exhausted ({quota} entries)"
            )));
        }
        self.shared.used.fetch_add(1, Ordering::Relaxed);
        entries.push((key, snapshot));
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<RequestKey>> {
        let entries = self.entries.read().await;
        Ok(entries.iter().map(|(k, _)| k.clone()).collect())
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.entries.read().await.len())
    }
}
