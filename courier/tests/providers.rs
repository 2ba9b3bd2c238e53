//! Provider wiring: header injection and error-handler delegation.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use common::{FakeTransport, MemoryStore, Outcome, Repo, Seen, drain, repo_request};
use courier::provider::GITHUB_MEDIA_TYPE;
use courier::{
    AuthenticatedProvider, CachePolicy, CallError, Client, GitHubProvider, MaxRetry,
};
use courier_store::Store;
use http::StatusCode;
use http::header::{ACCEPT, AUTHORIZATION};

fn github(transport: &Arc<FakeTransport>) -> Client<GitHubProvider> {
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    Client::new(GitHubProvider::new(transport.clone(), store, MaxRetry::DEFAULT))
}

struct Auth {
    client: Client<AuthenticatedProvider>,
    transport: Arc<FakeTransport>,
    recoveries: Arc<AtomicUsize>,
}

fn authenticated(token: Option<&'static str>, outcome: Outcome) -> Auth {
    let transport = Arc::new(FakeTransport::new([outcome]));
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let recoveries = Arc::new(AtomicUsize::new(0));
    let counter = recoveries.clone();
    let provider = AuthenticatedProvider::new(
        transport.clone(),
        store,
        MaxRetry::DEFAULT,
        Arc::new(move || token.map(String::from)),
        Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }),
    );
    Auth {
        client: Client::new(provider),
        transport,
        recoveries,
    }
}

async fn github_error(code: StatusCode) -> CallError {
    let transport = Arc::new(FakeTransport::new([Outcome::status(code)]));
    github(&transport)
        .perform_async(repo_request(), Some(CachePolicy::IgnoreCacheCompletely))
        .await
        .unwrap_err()
}

#[tokio::test]
async fn github_sends_its_media_type() {
    let transport = Arc::new(FakeTransport::ok(Repo::fresh_json()));

    github(&transport)
        .perform_async(repo_request(), None)
        .await
        .unwrap();

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].headers[ACCEPT], GITHUB_MEDIA_TYPE);
    assert!(requests[0].headers.get(AUTHORIZATION).is_none());
}

#[tokio::test]
async fn github_statuses_become_domain_errors() {
    assert!(matches!(github_error(StatusCode::FORBIDDEN).await, CallError::RateLimited));
    assert!(matches!(github_error(StatusCode::NOT_FOUND).await, CallError::NotFound));
    assert!(matches!(github_error(StatusCode::NOT_MODIFIED).await, CallError::NotModified));
    assert!(matches!(
        github_error(StatusCode::BAD_GATEWAY).await,
        CallError::Status {
            code: StatusCode::BAD_GATEWAY
        }
    ));
}

#[tokio::test]
async fn token_is_attached_when_present() {
    let auth = authenticated(Some("secret-token"), Outcome::ok(Repo::fresh_json()));

    auth.client
        .perform_async(repo_request(), None)
        .await
        .unwrap();

    let requests = auth.transport.requests();
    assert_eq!(requests[0].headers[AUTHORIZATION], "secret-token");
    assert!(requests[0].headers[AUTHORIZATION].is_sensitive());
}

#[tokio::test]
async fn missing_token_sends_no_authorization() {
    let auth = authenticated(None, Outcome::ok(Repo::fresh_json()));

    auth.client
        .perform_async(repo_request(), None)
        .await
        .unwrap();

    assert!(auth.transport.requests()[0].headers.get(AUTHORIZATION).is_none());
}

#[tokio::test]
async fn unauthorized_runs_recovery_and_cancels() {
    let auth = authenticated(Some("stale"), Outcome::status(StatusCode::UNAUTHORIZED));

    let seen = drain(
        auth.client
            .watch(repo_request(), Some(CachePolicy::IgnoreCacheCompletely)),
    )
    .await;
    assert_eq!(seen, Vec::<Seen>::new());
    assert_eq!(auth.recoveries.load(Ordering::SeqCst), 1);

    let result = auth
        .client
        .perform_async(repo_request(), Some(CachePolicy::IgnoreCacheCompletely))
        .await;
    assert!(matches!(result, Err(CallError::Cancelled)));
    assert_eq!(auth.recoveries.load(Ordering::SeqCst), 2);
    assert_eq!(auth.transport.attempts(), 2, "401 is never retried");
}

#[tokio::test]
async fn other_statuses_pass_through_the_auth_handler() {
    let auth = authenticated(Some("token"), Outcome::status(StatusCode::NOT_FOUND));

    let error = auth
        .client
        .perform_async(repo_request(), Some(CachePolicy::IgnoreCacheCompletely))
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        CallError::Status {
            code: StatusCode::NOT_FOUND
        }
    ));
    assert_eq!(auth.recoveries.load(Ordering::SeqCst), 0);
}
