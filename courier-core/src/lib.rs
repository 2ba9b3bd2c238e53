#![warn(missing_docs)]
//! # courier-core
//!
//! Core traits and types for the courier request-interceptor chain.
//!
//! This crate holds the vocabulary shared by the engine (`courier`), the cache
//! stores (`courier-store`, `courier-moka`) and the transports
//! (`courier-reqwest`):
//!
//! - **Describe** a call ([`Request`], [`RequestDescription`])
//! - **Identify** it for caching ([`CacheKey`])
//! - **Decide** how the cache participates ([`CachePolicy`])
//! - **Carry** what came back ([`RawResponse`], [`CallResult`], [`Source`])
//! - **Send** it over the wire ([`Transport`])

pub mod key;
pub mod policy;
pub mod request;
pub mod response;
pub mod transport;

pub use key::CacheKey;
pub use policy::CachePolicy;
pub use request::{Request, RequestDescription, RequestError};
pub use response::{CallResult, RawResponse, Source};
pub use transport::{Transport, TransportError, TransportRequest};

#[doc(hidden)]
pub use smol_str::SmolStr;

/// Raw byte data type used for response bodies and serialized cache payloads.
/// Using `Bytes` provides efficient zero-copy cloning via reference counting.
pub type Raw = bytes::Bytes;
