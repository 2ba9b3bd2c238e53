use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use courier_core::{CacheKey, Raw};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::format::{Format, FormatExt, JsonFormat};
use crate::{DeleteStatus, StoreError, StoreLabel, StoredEntry};

pub type StoreResult<T> = Result<T, StoreError>;

/// Raw keyed storage of [`StoredEntry`] values.
///
/// Implementations must tolerate concurrent reads and writes for different
/// and identical keys. A missing key is `Ok(None)`, never an error.
#[async_trait]
pub trait Store: Sync + Send {
    async fn read(&self, key: &CacheKey) -> StoreResult<Option<StoredEntry>>;

    async fn write(&self, key: &CacheKey, entry: StoredEntry) -> StoreResult<()>;

    async fn remove(&self, key: &CacheKey) -> StoreResult<DeleteStatus>;

    /// Returns the label of this store for logs and metrics.
    fn label(&self) -> StoreLabel {
        StoreLabel::new_static("store")
    }

    fn value_format(&self) -> &dyn Format {
        &JsonFormat
    }
}

#[async_trait]
impl Store for &dyn Store {
    async fn read(&self, key: &CacheKey) -> StoreResult<Option<StoredEntry>> {
        (*self).read(key).await
    }

    async fn write(&self, key: &CacheKey, entry: StoredEntry) -> StoreResult<()> {
        (*self).write(key, entry).await
    }

    async fn remove(&self, key: &CacheKey) -> StoreResult<DeleteStatus> {
        (*self).remove(key).await
    }

    fn label(&self) -> StoreLabel {
        (*self).label()
    }

    fn value_format(&self) -> &dyn Format {
        (*self).value_format()
    }
}

#[async_trait]
impl Store for Box<dyn Store> {
    async fn read(&self, key: &CacheKey) -> StoreResult<Option<StoredEntry>> {
        (**self).read(key).await
    }

    async fn write(&self, key: &CacheKey, entry: StoredEntry) -> StoreResult<()> {
        (**self).write(key, entry).await
    }

    async fn remove(&self, key: &CacheKey) -> StoreResult<DeleteStatus> {
        (**self).remove(key).await
    }

    fn label(&self) -> StoreLabel {
        (**self).label()
    }

    fn value_format(&self) -> &dyn Format {
        (**self).value_format()
    }
}

#[async_trait]
impl Store for Arc<dyn Store> {
    async fn read(&self, key: &CacheKey) -> StoreResult<Option<StoredEntry>> {
        (**self).read(key).await
    }

    async fn write(&self, key: &CacheKey, entry: StoredEntry) -> StoreResult<()> {
        (**self).write(key, entry).await
    }

    async fn remove(&self, key: &CacheKey) -> StoreResult<DeleteStatus> {
        (**self).remove(key).await
    }

    fn label(&self) -> StoreLabel {
        (**self).label()
    }

    fn value_format(&self) -> &dyn Format {
        (**self).value_format()
    }
}

/// Typed cache operations on top of a [`Store`].
///
/// `get` decodes the stored payload into the caller's type; `put` encodes a
/// decoded payload together with the raw response body. Both go through the
/// store's [`value_format`](Store::value_format).
pub trait CacheStore: Store {
    fn get<T>(&self, key: &CacheKey) -> impl Future<Output = StoreResult<Option<T>>> + Send
    where
        T: DeserializeOwned + Send,
    {
        async move {
            let Some(entry) = self.read(key).await? else {
                debug!(store = %self.label(), %key, "cache store miss");
                return Ok(None);
            };
            if entry.is_expired() {
                debug!(store = %self.label(), %key, "cache store entry expired");
                return Ok(None);
            }
            let payload = self.value_format().deserialize::<T>(&entry.payload)?;
            debug!(store = %self.label(), %key, "cache store hit");
            Ok(Some(payload))
        }
    }

    fn put<T>(
        &self,
        key: &CacheKey,
        payload: &T,
        raw: Raw,
    ) -> impl Future<Output = StoreResult<()>> + Send
    where
        T: Serialize + Sync,
    {
        async move {
            let encoded = self.value_format().serialize(payload)?;
            self.write(key, StoredEntry::new(encoded, raw)).await
        }
    }

    fn delete(&self, key: &CacheKey) -> impl Future<Output = StoreResult<DeleteStatus>> + Send {
        async move { self.remove(key).await }
    }
}

impl<S: Store + ?Sized> CacheStore for S {}
