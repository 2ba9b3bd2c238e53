//! Builder for configuring [`MokaStore`].

use std::time::{Duration, Instant};

use chrono::Utc;
use courier_core::CacheKey;
use courier_store::format::{Format, JsonFormat};
use courier_store::{StoreLabel, StoredEntry};
use moka::Expiry;
use moka::future::{Cache, CacheBuilder};
use moka::policy::EvictionPolicy;

use crate::store::MokaStore;

/// Expiration policy driven by [`StoredEntry::expire`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Expiration;

impl Expiry<CacheKey, StoredEntry> for Expiration {
    fn expire_after_create(
        &self,
        _key: &CacheKey,
        value: &StoredEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Self::remaining(value)
    }

    fn expire_after_update(
        &self,
        _key: &CacheKey,
        value: &StoredEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        // Overwrites carry their own expiry; never keep the replaced entry's.
        Self::remaining(value)
    }
}

impl Expiration {
    fn remaining(value: &StoredEntry) -> Option<Duration> {
        value.expire.map(|expire| {
            let millis = (expire - Utc::now()).num_milliseconds();
            if millis <= 0 {
                Duration::ZERO
            } else {
                Duration::from_millis(millis as u64)
            }
        })
    }
}

/// Marker type: capacity has not been configured yet.
///
/// Call [`max_entries()`](MokaStoreBuilder::max_entries) or
/// [`max_bytes()`](MokaStoreBuilder::max_bytes) before `build()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCapacity;

/// Marker type: entry-count capacity has been configured.
#[derive(Debug, Clone, Copy)]
pub struct EntryCapacity(pub(crate) u64);

/// Marker type: byte-based capacity has been configured.
#[derive(Debug, Clone, Copy)]
pub struct ByteCapacity(pub(crate) u64);

/// Builder for creating and configuring a [`MokaStore`].
///
/// Capacity is required and set with exactly one of
/// [`max_entries`](Self::max_entries) or [`max_bytes`](Self::max_bytes);
/// `build()` only exists once one of them has been called.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use courier_moka::MokaStore;
///
/// let store = MokaStore::builder()
///     .label("github")
///     .max_bytes(50 * 1024 * 1024)
///     .time_to_live(Duration::from_secs(60))
///     .build();
/// ```
pub struct MokaStoreBuilder<Cap, S = JsonFormat>
where
    S: Format,
{
    capacity: Cap,
    serializer: S,
    label: StoreLabel,
    eviction_policy: Option<EvictionPolicy>,
    time_to_live: Option<Duration>,
}

impl MokaStoreBuilder<NoCapacity, JsonFormat> {
    /// Creates a new builder with no capacity configured.
    pub fn new() -> Self {
        Self {
            capacity: NoCapacity,
            serializer: JsonFormat,
            label: StoreLabel::new_static("moka"),
            eviction_policy: None,
            time_to_live: None,
        }
    }
}

impl Default for MokaStoreBuilder<NoCapacity, JsonFormat> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> MokaStoreBuilder<NoCapacity, S>
where
    S: Format,
{
    /// Sets the maximum number of entries the cache can hold.
    pub fn max_entries(self, capacity: u64) -> MokaStoreBuilder<EntryCapacity, S> {
        MokaStoreBuilder {
            capacity: EntryCapacity(capacity),
            serializer: self.serializer,
            label: self.label,
            eviction_policy: self.eviction_policy,
            time_to_live: self.time_to_live,
        }
    }

    /// Sets the approximate memory budget in bytes.
    ///
    /// Each entry is weighed as its key length plus
    /// [`StoredEntry::memory_size`].
    pub fn max_bytes(self, bytes: u64) -> MokaStoreBuilder<ByteCapacity, S> {
        MokaStoreBuilder {
            capacity: ByteCapacity(bytes),
            serializer: self.serializer,
            label: self.label,
            eviction_policy: self.eviction_policy,
            time_to_live: self.time_to_live,
        }
    }
}

impl<Cap, S> MokaStoreBuilder<Cap, S>
where
    S: Format,
{
    /// Sets a custom label for this store. Defaults to `"moka"`.
    pub fn label(mut self, label: impl Into<StoreLabel>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the eviction policy.
    ///
    /// Defaults to [`EvictionPolicy::tiny_lfu()`] for entry capacity and
    /// [`EvictionPolicy::lru()`] for byte capacity.
    pub fn eviction_policy(mut self, policy: EvictionPolicy) -> Self {
        self.eviction_policy = Some(policy);
        self
    }

    /// Expiry applied to written entries that don't carry one.
    pub fn time_to_live(mut self, ttl: Duration) -> Self {
        self.time_to_live = Some(ttl);
        self
    }

    /// Sets the payload serialization format.
    pub fn value_format<NewS>(self, serializer: NewS) -> MokaStoreBuilder<Cap, NewS>
    where
        NewS: Format,
    {
        MokaStoreBuilder {
            capacity: self.capacity,
            serializer,
            label: self.label,
            eviction_policy: self.eviction_policy,
            time_to_live: self.time_to_live,
        }
    }
}

impl<S> MokaStoreBuilder<EntryCapacity, S>
where
    S: Format,
{
    /// Builds the [`MokaStore`] with entry-count based capacity.
    pub fn build(self) -> MokaStore<S> {
        let policy = self
            .eviction_policy
            .unwrap_or_else(EvictionPolicy::tiny_lfu);
        let cache: Cache<CacheKey, StoredEntry> = CacheBuilder::new(self.capacity.0)
            .eviction_policy(policy)
            .expire_after(Expiration)
            .build();

        MokaStore {
            cache,
            serializer: self.serializer,
            label: self.label,
            time_to_live: self.time_to_live,
        }
    }
}

impl<S> MokaStoreBuilder<ByteCapacity, S>
where
    S: Format,
{
    /// Builds the [`MokaStore`] with byte-based capacity.
    pub fn build(self) -> MokaStore<S> {
        let policy = self.eviction_policy.unwrap_or_else(EvictionPolicy::lru);
        let cache: Cache<CacheKey, StoredEntry> = CacheBuilder::new(self.capacity.0)
            .eviction_policy(policy)
            .weigher(|key: &CacheKey, entry: &StoredEntry| -> u32 {
                let size = key.as_str().len() + entry.memory_size();
                size.try_into().unwrap_or(u32::MAX)
            })
            .expire_after(Expiration)
            .build();

        MokaStore {
            cache,
            serializer: self.serializer,
            label: self.label,
            time_to_live: self.time_to_live,
        }
    }
}
