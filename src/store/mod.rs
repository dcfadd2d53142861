//! Cache store abstraction.
//!
//! A [`CacheStore`] is a key-addressed, origin-scoped store of
//! (request key → response snapshot) pairs, partitioned into named
//! [`Generation`]s. Generations are created idempotently, replaced
//! wholesale on version change, and never trimmed entry-by-entry — the
//! only eviction granularity is deleting a whole generation.
//!
//! The store promises per-key atomicity for `put`/`lookup` and nothing
//! more; there is no cross-key locking or transaction layer above it.
//!
//! [`MemoryStore`] is the default in-process backend. Persistent backends
//! (origin-private disk storage) implement the same pair of traits.

mod memory;

pub use memory::MemoryStore;

use std::sync::Arc;

use async_trait::async_trait;

use crate::Result;
use crate::types::{RequestKey, ResponseSnapshot};

/// A named partition holding cached snapshots for one deployed version.
#[async_trait]
pub trait Generation: Send + Sync {
    /// The version-qualified partition name.
    fn name(&self) -> &str;

    /// Look up the snapshot for a key. `None` on miss.
    async fn lookup(&self, key: &RequestKey) -> Result<Option<ResponseSnapshot>>;

    /// Insert a snapshot. At most one entry per key; a put overwrites.
    async fn put(&self, key: RequestKey, snapshot: ResponseSnapshot) -> Result<()>;

    /// All keys, in insertion order.
    async fn keys(&self) -> Result<Vec<RequestKey>>;

    /// Number of entries.
    async fn len(&self) -> Result<usize>;
}

/// A set of named generations sharing one storage origin.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Open the named generation, creating it if absent. Idempotent;
    /// fails only on storage errors.
    async fn open(&self, name: &str) -> Result<Arc<dyn Generation>>;

    /// Delete a whole generation. Returns whether it existed. Deletion is
    /// irreversible; callers await completion before relying on it.
    async fn delete(&self, name: &str) -> Result<bool>;

    /// Names of all generations currently in the store, including any
    /// belonging to other applications on the same origin.
    async fn names(&self) -> Result<Vec<String>>;
}
