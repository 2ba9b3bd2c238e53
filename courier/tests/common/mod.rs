#![allow(dead_code)]

pub mod store;
pub mod transport;

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use courier::{CallError, CallResult, Operation, RequestDescription, Watch};
use courier_core::CachePolicy;
use courier_store::{CacheStore, Store};
use futures::StreamExt;
use serde::{Deserialize, Serialize};

pub use store::{FailingStore, MemoryStore};
pub use transport::{FakeTransport, Outcome};

pub const REPO_URL: &str = "https://api.github.com/repos/courier-rs/courier";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repo {
    pub id: u64,
    pub name: String,
    pub pushed_at: DateTime<Utc>,
}

impl Repo {
    pub fn cached() -> Self {
        Self {
            id: 1,
            name: "from-cache".into(),
            pushed_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    pub fn fresh() -> Self {
        Self {
            id: 1,
            name: "from-server".into(),
            pushed_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 30, 0).unwrap(),
        }
    }

    pub fn fresh_json() -> &'static str {
        r#"{"id":1,"name":"from-server","pushed_at":"2024-06-01T12:30:00Z"}"#
    }
}

pub fn repo_request() -> RequestDescription<Repo> {
    RequestDescription::get(REPO_URL).unwrap().named("repo")
}

/// Writes `repo` where a call for `repo_request()` will look it up.
pub async fn seed(store: &Arc<dyn Store>, repo: &Repo) {
    let operation = Operation::new(&repo_request(), CachePolicy::default()).unwrap();
    store
        .put(operation.cache_key(), repo, bytes::Bytes::new())
        .await
        .unwrap();
}

/// What a stream emitted, with errors flattened to strings for comparison.
#[derive(Debug, PartialEq)]
pub enum Seen {
    Cache(Repo),
    Server(Repo),
    Error(String),
}

pub async fn drain(watch: Watch<Repo>) -> Vec<Seen> {
    watch.map(seen).collect().await
}

pub fn seen(item: Result<CallResult<Repo>, CallError>) -> Seen {
    match item {
        Ok(CallResult {
            source: courier::Source::Cache,
            data,
        }) => Seen::Cache(data),
        Ok(CallResult {
            source: courier::Source::Server,
            data,
        }) => Seen::Server(data),
        Err(error) => Seen::Error(error.to_string()),
    }
}

/// Yields until `condition` holds.
pub async fn eventually(condition: impl Fn() -> bool) {
    tokio::time::timeout(std::time::Duration::from_secs(5), async {
        while !condition() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("condition not reached in time");
}
