//! Scripted transport for engine tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use courier_core::{RawResponse, Transport, TransportError, TransportRequest};
use http::StatusCode;

/// What the transport does for one attempt.
#[derive(Debug, Clone)]
pub enum Outcome {
    Respond(StatusCode, Bytes),
    Fail,
    Hang,
}

impl Outcome {
    pub fn ok(body: &'static str) -> Self {
        Outcome::Respond(StatusCode::OK, Bytes::from_static(body.as_bytes()))
    }

    pub fn status(code: StatusCode) -> Self {
        Outcome::Respond(code, Bytes::new())
    }
}

/// Plays back scripted outcomes in order; the last one repeats.
pub struct FakeTransport {
    script: Mutex<VecDeque<Outcome>>,
    attempts: AtomicUsize,
    abandoned: AtomicUsize,
    requests: Mutex<Vec<TransportRequest>>,
}

/// Counts sends dropped before they resolved.
struct Abandon<'a> {
    counter: &'a AtomicUsize,
    armed: bool,
}

impl<'a> Abandon<'a> {
    fn new(counter: &'a AtomicUsize) -> Self {
        Self {
            counter,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for Abandon<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.counter.fetch_add(1, Ordering::SeqCst);
        }
    }
}

impl FakeTransport {
    pub fn new(script: impl IntoIterator<Item = Outcome>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            attempts: AtomicUsize::new(0),
            abandoned: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn ok(body: &'static str) -> Self {
        Self::new([Outcome::ok(body)])
    }

    /// Fails `failures` times, then responds with `body`.
    pub fn flaky(failures: usize, body: &'static str) -> Self {
        let mut script = vec![Outcome::Fail; failures];
        script.push(Outcome::ok(body));
        Self::new(script)
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Sends that were dropped while hanging.
    pub fn abandoned(&self) -> usize {
        self.abandoned.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next_outcome(&self) -> Outcome {
        let mut script = self.script.lock().unwrap();
        if script.len() > 1 {
            script.pop_front().unwrap()
        } else {
            script.front().cloned().unwrap_or(Outcome::Hang)
        }
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: TransportRequest) -> Result<RawResponse, TransportError> {
        // Armed before the attempt is visible, so a cancel right after
        // `attempts()` moves is always counted.
        let abandon = Abandon::new(&self.abandoned);
        self.requests.lock().unwrap().push(request);
        let outcome = self.next_outcome();
        self.attempts.fetch_add(1, Ordering::SeqCst);
        // Let the cache stage finish first, like a real network would.
        tokio::task::yield_now().await;
        match outcome {
            Outcome::Respond(status, body) => {
                abandon.disarm();
                Ok(RawResponse::new(status, body))
            }
            Outcome::Fail => {
                abandon.disarm();
                Err(TransportError::connection("connection reset"))
            }
            Outcome::Hang => std::future::pending().await,
        }
    }
}
