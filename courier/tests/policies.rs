//! Emission sequences for every cache policy against a warm and a cold cache.

mod common;

use std::sync::Arc;

use common::{FakeTransport, MemoryStore, Outcome, Repo, Seen, drain, repo_request, seed};
use courier::{CachePolicy, Client, GitHubProvider, MaxRetry};
use courier_moka::MokaStore;
use courier_store::Store;

struct Harness {
    client: Client<GitHubProvider>,
    transport: Arc<FakeTransport>,
    memory: MemoryStore,
    store: Arc<dyn Store>,
}

fn harness() -> Harness {
    let transport = Arc::new(FakeTransport::ok(Repo::fresh_json()));
    let memory = MemoryStore::new();
    let store: Arc<dyn Store> = Arc::new(memory.clone());
    let provider = GitHubProvider::new(transport.clone(), store.clone(), MaxRetry::DEFAULT);
    Harness {
        client: Client::new(provider),
        transport,
        memory,
        store,
    }
}

async fn warm_harness() -> Harness {
    let harness = harness();
    seed(&harness.store, &Repo::cached()).await;
    harness
}

#[tokio::test]
async fn ignore_cache_completely_never_touches_the_store() {
    let h = warm_harness().await;

    let seen = drain(h.client.watch(repo_request(), Some(CachePolicy::IgnoreCacheCompletely))).await;

    assert_eq!(seen, vec![Seen::Server(Repo::fresh())]);
    assert_eq!(h.transport.attempts(), 1);
    assert_eq!(h.memory.reads(), 0);
    assert_eq!(h.memory.writes(), 1, "only the seed write");
}

#[tokio::test]
async fn ignore_cache_data_fetches_and_still_writes() {
    let h = warm_harness().await;

    let seen = drain(h.client.watch(repo_request(), Some(CachePolicy::IgnoreCacheData))).await;

    assert_eq!(seen, vec![Seen::Server(Repo::fresh())]);
    assert_eq!(h.memory.reads(), 0);
    assert_eq!(h.memory.writes(), 2);
}

#[tokio::test]
async fn cache_then_fetch_with_warm_cache_emits_twice() {
    let h = warm_harness().await;

    let seen = drain(h.client.watch(repo_request(), Some(CachePolicy::CacheThenFetch))).await;

    assert_eq!(
        seen,
        vec![Seen::Cache(Repo::cached()), Seen::Server(Repo::fresh())]
    );
    assert_eq!(h.transport.attempts(), 1);
}

#[tokio::test]
async fn cache_then_fetch_with_cold_cache_emits_server_only() {
    let h = harness();

    let seen = drain(h.client.watch(repo_request(), Some(CachePolicy::CacheThenFetch))).await;

    assert_eq!(seen, vec![Seen::Server(Repo::fresh())]);
    assert_eq!(h.memory.len(), 1, "server payload written back");
}

#[tokio::test]
async fn cache_else_fetch_returns_hit_without_network() {
    let h = warm_harness().await;

    let seen = drain(h.client.watch(repo_request(), Some(CachePolicy::CacheElseFetch))).await;

    assert_eq!(seen, vec![Seen::Cache(Repo::cached())]);
    assert_eq!(h.transport.attempts(), 0);
}

#[tokio::test]
async fn cache_else_fetch_fetches_on_miss() {
    let h = harness();

    let seen = drain(h.client.watch(repo_request(), Some(CachePolicy::CacheElseFetch))).await;

    assert_eq!(seen, vec![Seen::Server(Repo::fresh())]);
    assert_eq!(h.transport.attempts(), 1);
}

#[tokio::test]
async fn cache_only_returns_hit() {
    let h = warm_harness().await;

    let seen = drain(h.client.watch(repo_request(), Some(CachePolicy::CacheOnly))).await;

    assert_eq!(seen, vec![Seen::Cache(Repo::cached())]);
    assert_eq!(h.transport.attempts(), 0);
}

#[tokio::test]
async fn cache_only_cold_cache_is_fatal_without_network() {
    let h = harness();

    let result = h
        .client
        .perform_async(repo_request(), Some(CachePolicy::CacheOnly))
        .await;

    assert!(matches!(result, Err(courier::CallError::CacheMissFatal)));
    assert_eq!(h.transport.attempts(), 0);

    let seen = drain(h.client.watch(repo_request(), Some(CachePolicy::CacheOnly))).await;
    assert_eq!(seen.len(), 1);
    assert!(matches!(seen[0], Seen::Error(_)));
    assert_eq!(h.transport.attempts(), 0);
}

#[tokio::test]
async fn payload_written_under_cache_then_fetch_serves_later_cache_else_fetch() {
    let store: Arc<dyn Store> = Arc::new(MokaStore::builder().max_entries(128).build());

    let first_transport = Arc::new(FakeTransport::ok(Repo::fresh_json()));
    let first = Client::new(GitHubProvider::new(
        first_transport.clone(),
        store.clone(),
        MaxRetry::DEFAULT,
    ));
    let seen = drain(first.watch(repo_request(), Some(CachePolicy::CacheThenFetch))).await;
    assert_eq!(seen, vec![Seen::Server(Repo::fresh())]);

    let second_transport = Arc::new(FakeTransport::new([Outcome::Hang]));
    let second = Client::new(GitHubProvider::new(
        second_transport.clone(),
        store,
        MaxRetry::DEFAULT,
    ));
    let repo = second
        .perform_async(repo_request(), Some(CachePolicy::CacheElseFetch))
        .await
        .unwrap();

    assert_eq!(repo, Repo::fresh());
    assert_eq!(second_transport.attempts(), 0);
}
