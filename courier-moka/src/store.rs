//! Moka store implementation.

use std::time::Duration;

use async_trait::async_trait;
use courier_core::CacheKey;
use courier_store::format::{Format, JsonFormat};
use courier_store::{DeleteStatus, Store, StoreLabel, StoreResult, StoredEntry};
use moka::future::Cache;
use tracing::trace;

/// In-memory cache store powered by Moka.
///
/// `MokaStore` provides a concurrent in-memory cache with automatic entry
/// expiration. It uses Moka's async cache internally, which offers lock-free
/// reads and fine-grained locking for writes, so independent calls can read
/// and write concurrently without corrupting entries.
///
/// # Type Parameters
///
/// * `S` - Serialization format for payloads. Implements [`Format`].
///   Default: [`JsonFormat`].
///
/// # Examples
///
/// ```
/// use courier_moka::MokaStore;
///
/// let store = MokaStore::builder().max_entries(10_000).build();
/// ```
///
/// # Caveats
///
/// - Data is **not persisted**; the cache is lost on process restart
/// - Expiration is **best-effort**; expired entries may briefly remain in
///   Moka until its maintenance runs, but typed reads skip them
#[derive(Clone)]
pub struct MokaStore<S = JsonFormat>
where
    S: Format,
{
    pub(crate) cache: Cache<CacheKey, StoredEntry>,
    pub(crate) serializer: S,
    pub(crate) label: StoreLabel,
    pub(crate) time_to_live: Option<Duration>,
}

impl<S> std::fmt::Debug for MokaStore<S>
where
    S: Format,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaStore")
            .field("label", &self.label)
            .field("entries", &self.cache.entry_count())
            .field("serializer", &self.serializer.name())
            .field("time_to_live", &self.time_to_live)
            .finish()
    }
}

impl MokaStore<JsonFormat> {
    /// Creates a new builder for `MokaStore`.
    ///
    /// Capacity must be configured with
    /// [`max_entries`](crate::MokaStoreBuilder::max_entries) or
    /// [`max_bytes`](crate::MokaStoreBuilder::max_bytes) before building.
    pub fn builder() -> crate::builder::MokaStoreBuilder<crate::builder::NoCapacity, JsonFormat> {
        crate::builder::MokaStoreBuilder::new()
    }
}

impl<S> MokaStore<S>
where
    S: Format,
{
    /// Returns the underlying Moka cache.
    pub fn cache(&self) -> &Cache<CacheKey, StoredEntry> {
        &self.cache
    }
}

#[async_trait]
impl<S> Store for MokaStore<S>
where
    S: Format + Send + Sync,
{
    async fn read(&self, key: &CacheKey) -> StoreResult<Option<StoredEntry>> {
        Ok(self.cache.get(key).await)
    }

    async fn write(&self, key: &CacheKey, entry: StoredEntry) -> StoreResult<()> {
        let entry = match (entry.expire, self.time_to_live) {
            (None, Some(ttl)) => entry.with_ttl(ttl),
            _ => entry,
        };
        trace!(store = %self.label, %key, expire = ?entry.expire, "moka write");
        self.cache.insert(key.clone(), entry).await;
        Ok(())
    }

    async fn remove(&self, key: &CacheKey) -> StoreResult<DeleteStatus> {
        match self.cache.remove(key).await {
            Some(_) => Ok(DeleteStatus::Deleted(1)),
            None => Ok(DeleteStatus::Missing),
        }
    }

    fn label(&self) -> StoreLabel {
        self.label.clone()
    }

    fn value_format(&self) -> &dyn Format {
        &self.serializer
    }
}
