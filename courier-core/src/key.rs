//! Request identity used as the cache key.
//!
//! A [`CacheKey`] is a stable hash over the three things that make two calls
//! interchangeable for caching purposes:
//!
//! 1. **Method** - `GET`, `POST`, ...
//! 2. **Resolved URL** - the absolute target, query string included
//! 3. **Encoded body** - the exact bytes sent, empty when there is none
//!
//! The hash is SHA-256 rendered as lowercase hex, so keys survive process
//! restarts and can be shared by persistent stores.
//!
//! ```
//! use courier_core::CacheKey;
//! use http::Method;
//! use url::Url;
//!
//! let url = Url::parse("https://api.example.com/users?page=2").unwrap();
//! let a = CacheKey::for_request(&Method::GET, &url, None);
//! let b = CacheKey::for_request(&Method::GET, &url, None);
//! assert_eq!(a, b);
//! assert_eq!(a.as_str().len(), 64);
//!
//! let post = CacheKey::for_request(&Method::POST, &url, Some(b"{}"));
//! assert_ne!(a, post);
//! ```

use std::fmt;

use http::Method;
use sha2::{Digest, Sha256};
use smol_str::SmolStr;
use url::Url;

/// Stable identity of a request for cache lookups.
///
/// Cloning is cheap: the digest is held in a [`SmolStr`], which shares heap
/// storage between clones.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct CacheKey(SmolStr);

impl CacheKey {
    /// Computes the identity of `(method, url, body)`.
    pub fn for_request(method: &Method, url: &Url, body: Option<&[u8]>) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(method.as_str().as_bytes());
        hasher.update(b"\n");
        hasher.update(url.as_str().as_bytes());
        hasher.update(b"\n");
        if let Some(body) = body {
            hasher.update(body);
        }
        Self(SmolStr::new(hex::encode(hasher.finalize())))
    }

    /// Wraps an already computed key, e.g. one read back from a store listing.
    pub fn from_raw(key: impl Into<SmolStr>) -> Self {
        Self(key.into())
    }

    /// Returns the key as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
