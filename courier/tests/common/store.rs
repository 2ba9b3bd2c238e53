//! Cache stores for engine tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use courier_core::CacheKey;
use courier_store::{DeleteStatus, Store, StoreError, StoreLabel, StoreResult, StoredEntry};
use dashmap::DashMap;

/// DashMap-backed store counting reads and writes.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<DashMap<CacheKey, StoredEntry>>,
    reads: Arc<AtomicUsize>,
    writes: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn read(&self, key: &CacheKey) -> StoreResult<Option<StoredEntry>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.entries.get(key).map(|entry| entry.clone()))
    }

    async fn write(&self, key: &CacheKey, entry: StoredEntry) -> StoreResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
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
        StoreLabel::new_static("memory")
    }
}

/// Store whose every operation fails.
#[derive(Clone, Debug, Default)]
pub struct FailingStore;

#[async_trait]
impl Store for FailingStore {
    async fn read(&self, _key: &CacheKey) -> StoreResult<Option<StoredEntry>> {
        Err(StoreError::connection("store unreachable"))
    }

    async fn write(&self, _key: &CacheKey, _entry: StoredEntry) -> StoreResult<()> {
        Err(StoreError::internal("write refused"))
    }

    async fn remove(&self, _key: &CacheKey) -> StoreResult<DeleteStatus> {
        Err(StoreError::internal("remove refused"))
    }

    fn label(&self) -> StoreLabel {
        StoreLabel::new_static("failing")
    }
}
