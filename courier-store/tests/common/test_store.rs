//! Simple in-memory test store implementation using DashMap.

use async_trait::async_trait;
use courier_core::CacheKey;
use courier_store::{DeleteStatus, Store, StoreError, StoreLabel, StoreResult, StoredEntry};
use dashmap::DashMap;
use std::sync::Arc;

/// Simple in-memory store for testing using DashMap.
///
/// This store is thread-safe and can be cloned cheaply (Arc internally).
#[derive(Clone, Default)]
pub struct TestStore {
    entries: Arc<DashMap<CacheKey, StoredEntry>>,
}

impl TestStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get raw entry for inspection.
    pub fn get_raw(&self, key: &CacheKey) -> Option<StoredEntry> {
        self.entries.get(key).map(|v| v.clone())
    }

    /// Insert a raw entry directly, bypassing the format.
    pub fn insert_raw(&self, key: &CacheKey, entry: StoredEntry) {
        self.entries.insert(key.clone(), entry);
    }
}

#[async_trait]
impl Store for TestStore {
    async fn read(&self, key: &CacheKey) -> StoreResult<Option<StoredEntry>> {
        Ok(self.entries.get(key).map(|v| v.clone()))
    }

    async fn write(&self, key: &CacheKey, entry: StoredEntry) -> StoreResult<()> {
        self.entries.insert(key.clone(), entry);
        Ok(())
    }

    async fn remove(&self, key: &CacheKey) -> StoreResult<DeleteStatus> {
        Ok(match self.entries.remove(key) {
            Some(_) => DeleteStatus::Deleted(1),
            None => DeleteStatus::Missing,
        })
    }

    fn label(&self) -> StoreLabel {
        StoreLabel::new_static("test")
    }
}

/// Store whose every operation fails.
#[derive(Clone, Debug)]
pub struct FailingStore {
    message: String,
}

impl FailingStore {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }

    fn error(&self) -> StoreError {
        StoreError::InternalError(Box::new(std::io::Error::other(self.message.clone())))
    }
}

#[async_trait]
impl Store for FailingStore {
    async fn read(&self, _key: &CacheKey) -> StoreResult<Option<StoredEntry>> {
        Err(self.error())
    }

    async fn write(&self, _key: &CacheKey, _entry: StoredEntry) -> StoreResult<()> {
        Err(self.error())
    }

    async fn remove(&self, _key: &CacheKey) -> StoreResult<DeleteStatus> {
        Err(self.error())
    }
}
