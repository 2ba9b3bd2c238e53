//! Cancellation from every entry point.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use common::{
    FakeTransport, MemoryStore, Outcome, Repo, Seen, drain, eventually, repo_request, seed,
};
use courier::{CachePolicy, Client, GitHubProvider, MaxRetry};
use courier_store::Store;
use futures::StreamExt;

fn hanging() -> (Client<GitHubProvider>, Arc<FakeTransport>, Arc<dyn Store>) {
    let transport = Arc::new(FakeTransport::new([Outcome::Hang]));
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let client = Client::new(GitHubProvider::new(
        transport.clone(),
        store.clone(),
        MaxRetry::DEFAULT,
    ));
    (client, transport, store)
}

#[tokio::test]
async fn cancel_before_response_ends_stream_silently() {
    let (client, transport, _) = hanging();

    let watch = client.watch(repo_request(), Some(CachePolicy::IgnoreCacheCompletely));
    let handle = watch.cancel_handle();
    eventually(|| transport.attempts() == 1).await;

    handle.cancel();

    assert_eq!(drain(watch).await, Vec::<Seen>::new());
    eventually(|| transport.abandoned() == 1).await;
}

#[tokio::test]
async fn cancel_after_early_emission_drops_the_rest() {
    let (client, transport, store) = hanging();
    seed(&store, &Repo::cached()).await;

    let mut watch = client.watch(repo_request(), Some(CachePolicy::CacheThenFetch));
    let first = watch.next().await.map(common::seen);
    assert_eq!(first, Some(Seen::Cache(Repo::cached())));

    eventually(|| transport.attempts() == 1).await;
    watch.cancel();

    assert!(watch.next().await.is_none());
    assert!(watch.next().await.is_none());
    eventually(|| transport.abandoned() == 1).await;
}

#[tokio::test]
async fn queued_emission_is_dropped_after_handle_cancel() {
    let (client, transport, store) = hanging();
    seed(&store, &Repo::cached()).await;

    let mut watch = client.watch(repo_request(), Some(CachePolicy::CacheThenFetch));
    let handle = watch.cancel_handle();
    // The cache hit is queued before the network stage starts.
    eventually(|| transport.attempts() == 1).await;

    handle.cancel();

    assert!(watch.next().await.is_none());
    assert!(watch.next().await.is_none());
    eventually(|| transport.abandoned() == 1).await;
}

#[tokio::test]
async fn dropping_the_watch_cancels_the_call() {
    let (client, transport, _) = hanging();

    let watch = client.watch(repo_request(), Some(CachePolicy::IgnoreCacheCompletely));
    eventually(|| transport.attempts() == 1).await;
    drop(watch);

    eventually(|| transport.abandoned() == 1).await;
}

#[tokio::test]
async fn dropping_perform_async_cancels_the_call() {
    let (client, transport, _) = hanging();

    let result = tokio::time::timeout(
        Duration::from_millis(20),
        client.perform_async(repo_request(), Some(CachePolicy::IgnoreCacheCompletely)),
    )
    .await;

    assert!(result.is_err(), "call should still be pending");
    eventually(|| transport.abandoned() == 1).await;
}

#[tokio::test]
async fn cancelled_callback_is_never_invoked() {
    let (client, transport, _) = hanging();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let handle = client.perform(
        repo_request(),
        Some(CachePolicy::IgnoreCacheCompletely),
        move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        },
    );
    eventually(|| transport.attempts() == 1).await;
    handle.cancel();
    assert!(handle.is_cancelled());

    eventually(|| transport.abandoned() == 1).await;
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}
