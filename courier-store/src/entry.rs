//! Stored cache entries.

use std::time::Duration;

use chrono::{DateTime, Utc};
use courier_core::Raw;

/// What a store keeps for one request identity.
///
/// `payload` is the decoded payload re-encoded with the store's
/// [`Format`](crate::Format); `raw` is the response body exactly as it
/// arrived from the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEntry {
    /// Serialized decoded payload.
    pub payload: Raw,
    /// Original response body.
    pub raw: Raw,
    /// When the entry was written.
    pub stored_at: DateTime<Utc>,
    /// When the entry stops being served, if ever.
    pub expire: Option<DateTime<Utc>>,
}

impl StoredEntry {
    /// Creates an entry stamped with the current time and no expiry.
    pub fn new(payload: Raw, raw: Raw) -> Self {
        Self {
            payload,
            raw,
            stored_at: Utc::now(),
            expire: None,
        }
    }

    /// Sets the expiry to `ttl` from the write time.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.expire = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| self.stored_at.checked_add_signed(ttl));
        self
    }

    /// Remaining time until expiry, `None` when the entry never expires.
    pub fn ttl(&self) -> Option<Duration> {
        self.expire.map(|expire| {
            (expire - Utc::now())
                .to_std()
                .unwrap_or(Duration::ZERO)
        })
    }

    /// Whether the expiry has passed.
    pub fn is_expired(&self) -> bool {
        self.expire.is_some_and(|expire| expire <= Utc::now())
    }

    /// Approximate memory footprint, used for byte-bounded stores.
    pub fn memory_size(&self) -> usize {
        std::mem::size_of::<Self>() + self.payload.len() + self.raw.len()
    }
}
