#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

/// Chain dispatch: the per-stage [`Chain`] handle, [`Flow`] and the
/// [`RequestChain`] that drives one call.
pub mod chain;

/// Client facade: callback, single-value and streaming entry points.
pub mod client;

/// Client configuration loaded from code or YAML.
pub mod config;

mod delivery;

/// Error types surfaced to callers.
pub mod error;

/// Error-handler delegation consulted whenever a stage fails.
pub mod handler;

/// The [`Interceptor`] trait and the concrete pipeline stages.
pub mod interceptor;

/// Metrics collection for call observability.
///
/// When the `metrics` feature is enabled, this module registers counters for
/// emissions, cache reads, transport attempts, retries and swallowed store
/// write failures. Without the feature every recorder is a no-op.
pub mod metrics;

/// Per-call operation state.
pub mod operation;

/// Interceptor providers: one per external API.
pub mod provider;

mod watch;

pub use chain::{Chain, Flow, HttpResponse, RequestChain};
pub use client::{CancelHandle, Client};
pub use config::{ClientConfig, ConfigError, MaxRetry, RetryBackoff};
pub use error::{CallError, DecodeErrorKind};
pub use handler::{AuthErrorHandler, CredentialRecovery, ErrorHandler, GitHubErrorHandler, Recovery};
pub use interceptor::Interceptor;
pub use operation::Operation;
pub use provider::{AuthenticatedProvider, GitHubProvider, InterceptorProvider, Pipeline};
pub use watch::Watch;

pub use courier_core::{
    CacheKey, CachePolicy, CallResult, RawResponse, Request, RequestDescription, Source, Transport,
};
