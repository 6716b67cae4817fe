//! Retry contract tests for the request executor
//!
//! A scripted transport replays a fixed list of outcomes, and tokio's paused
//! clock lets multi-second backoffs run instantly.

use assert_matches::assert_matches;
use async_trait::async_trait;
use bytes::Bytes;
use ramona_core::retry::{BackoffStrategy, ExponentialBackoff, SharedBackoff};
use ramona_transport::{
    CancellationToken, HttpRequest, HttpResponse, RequestError, RetryEvent, RetryExecutor,
    RetryObserver, Transport, TransportError,
};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

enum Step {
    Status(u16, &'static str),
    Refused,
}

/// Replays scripted steps; repeats the last one once the script runs out.
struct ScriptedTransport {
    steps: Mutex<VecDeque<Step>>,
    last: Step,
    calls: AtomicU32,
}

impl ScriptedTransport {
    fn new(mut steps: Vec<Step>) -> Arc<Self> {
        let last = match steps.pop() {
            Some(step) => step,
            None => Step::Status(200, "ok"),
        };
        Arc::new(Self {
            steps: Mutex::new(steps.into()),
            last,
            calls: AtomicU32::new(0),
        })
    }

    fn statuses(statuses: &[u16]) -> Arc<Self> {
        Self::new(
            statuses
                .iter()
                .map(|&status| Step::Status(status, "body"))
                .collect(),
        )
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send_http(&self, _request: &HttpRequest) -> ramona_transport::Result<HttpResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.steps.lock().unwrap().pop_front();
        let step = next.as_ref().unwrap_or(&self.last);
        match step {
            Step::Status(status, body) => {
                Ok(HttpResponse::new(*status, HashMap::new(), Bytes::from_static(body.as_bytes())))
            }
            Step::Refused => Err(TransportError::Connection("connection refused".to_string())),
        }
    }
}

#[derive(Default)]
struct RecordingObserver {
    retries: Mutex<Vec<RetryEvent>>,
    exhausted: Mutex<Vec<RetryEvent>>,
}

impl RecordingObserver {
    fn delays(&self) -> Vec<Duration> {
        self.retries.lock().unwrap().iter().map(|e| e.delay).collect()
    }
}

impl RetryObserver for RecordingObserver {
    fn on_retry(&self, event: &RetryEvent) {
        self.retries.lock().unwrap().push(event.clone());
    }

    fn on_exhausted(&self, event: &RetryEvent) {
        self.exhausted.lock().unwrap().push(event.clone());
    }
}

fn request() -> HttpRequest {
    HttpRequest::get("https://api.example.com/search?apikey=k&q=rust")
}

#[tokio::test(start_paused = true)]
async fn test_two_server_errors_then_success() {
    let transport = ScriptedTransport::new(vec![
        Step::Status(500, "down"),
        Step::Status(500, "still down"),
        Step::Status(200, "<twinglydata/>"),
    ]);
    let observer = Arc::new(RecordingObserver::default());
    let executor = RetryExecutor::new(transport.clone()).with_observer(observer.clone());
    let backoff = ExponentialBackoff::default();

    let start = Instant::now();
    let body = executor.execute(&request()).await.unwrap();

    assert_eq!(body, Bytes::from_static(b"<twinglydata/>"));
    assert_eq!(transport.calls(), 3);
    assert_eq!(
        observer.delays(),
        vec![backoff.delay_for(1), backoff.delay_for(2)]
    );
    assert_eq!(observer.delays(), vec![Duration::from_secs(1), Duration::from_secs(2)]);
    assert!(start.elapsed() >= Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn test_fifty_one_server_errors_exhaust_retries() {
    let transport = ScriptedTransport::statuses(&[500]);
    let observer = Arc::new(RecordingObserver::default());
    let executor = RetryExecutor::new(transport.clone())
        .with_strategy(
            ExponentialBackoff::builder()
                .slot(Duration::from_millis(1))
                .max_delay(Duration::from_millis(50))
                .build(),
        )
        .with_observer(observer.clone());

    let err = executor.execute(&request()).await.unwrap_err();

    assert_matches!(
        err,
        RequestError::ExhaustedRetries { last_status: 500, attempts: 51, .. }
    );
    assert_eq!(transport.calls(), 51);
    assert_eq!(observer.retries.lock().unwrap().len(), 50);

    let exhausted = observer.exhausted.lock().unwrap();
    assert_eq!(exhausted.len(), 1);
    assert_eq!(exhausted[0].collisions, 51);
    assert_eq!(exhausted[0].attempt, 51);
}

#[tokio::test(start_paused = true)]
async fn test_server_error_waits_never_decrease() {
    let transport = ScriptedTransport::statuses(&[503]);
    let observer = Arc::new(RecordingObserver::default());
    let executor = RetryExecutor::new(transport)
        .with_strategy(ExponentialBackoff::builder().max_retries(12).build())
        .with_observer(observer.clone());

    let _ = executor.execute(&request()).await;

    let delays = observer.delays();
    assert_eq!(delays.len(), 12);
    assert!(delays.windows(2).all(|pair| pair[0] <= pair[1]));
    let collisions: Vec<u32> = observer
        .retries
        .lock()
        .unwrap()
        .iter()
        .map(|e| e.collisions)
        .collect();
    assert_eq!(collisions, (1..=12).collect::<Vec<_>>());
}

#[tokio::test(start_paused = true)]
async fn test_client_error_is_not_retried() {
    let transport = ScriptedTransport::new(vec![Step::Status(404, "no such page")]);
    let observer = Arc::new(RecordingObserver::default());
    let executor = RetryExecutor::new(transport.clone()).with_observer(observer.clone());

    let err = executor.execute(&request()).await.unwrap_err();

    assert_matches!(
        err,
        RequestError::ClientError { status: 404, ref body } if body == "no such page"
    );
    assert_eq!(transport.calls(), 1);
    assert!(observer.delays().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_client_error_resets_shared_counter() {
    let shared = Arc::new(SharedBackoff::new());
    shared.set_collisions(7);
    let transport = ScriptedTransport::statuses(&[400]);
    let executor = RetryExecutor::new(transport.clone()).with_shared_backoff(shared.clone());

    let err = executor.execute(&request()).await.unwrap_err();

    assert_eq!(err.status(), Some(400));
    assert_eq!(shared.collisions(), 0);
    assert_eq!(transport.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_success_after_retries_resets_shared_counter() {
    let shared = Arc::new(SharedBackoff::new());
    let transport = ScriptedTransport::statuses(&[502, 502, 502, 200]);
    let observer = Arc::new(RecordingObserver::default());
    let executor = RetryExecutor::new(transport.clone())
        .with_shared_backoff(shared.clone())
        .with_observer(observer.clone());

    executor.execute(&request()).await.unwrap();

    assert_eq!(transport.calls(), 4);
    assert_eq!(observer.delays().len(), 3);
    assert_eq!(shared.collisions(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_shared_counter_carries_between_operations() {
    let shared = Arc::new(SharedBackoff::new());
    shared.set_collisions(3);
    let transport = ScriptedTransport::statuses(&[500, 200]);
    let observer = Arc::new(RecordingObserver::default());
    let executor = RetryExecutor::new(transport)
        .with_shared_backoff(shared)
        .with_observer(observer.clone());

    executor.execute(&request()).await.unwrap();

    // Started at 3 collisions, so the first failure is collision 4.
    let retries = observer.retries.lock().unwrap();
    assert_eq!(retries[0].collisions, 4);
    assert_eq!(retries[0].delay, Duration::from_secs(8));
}

#[tokio::test(start_paused = true)]
async fn test_shared_counter_near_ceiling_exhausts_early() {
    let shared = Arc::new(SharedBackoff::new());
    shared.set_collisions(50);
    let transport = ScriptedTransport::statuses(&[500]);
    let executor = RetryExecutor::new(transport.clone()).with_shared_backoff(shared.clone());

    let err = executor.execute(&request()).await.unwrap_err();

    assert_matches!(err, RequestError::ExhaustedRetries { attempts: 1, .. });
    assert_eq!(transport.calls(), 1);
    assert_eq!(shared.collisions(), 50);
}

#[tokio::test(start_paused = true)]
async fn test_shared_counter_stays_exhausted_for_next_operation() {
    let shared = Arc::new(SharedBackoff::new());
    let transport = ScriptedTransport::statuses(&[500]);
    let executor = RetryExecutor::new(transport.clone())
        .with_strategy(ExponentialBackoff::builder().max_retries(3).build())
        .with_shared_backoff(shared.clone());

    let first = executor.execute(&request()).await.unwrap_err();
    assert_matches!(first, RequestError::ExhaustedRetries { attempts: 4, .. });
    assert_eq!(shared.collisions(), 3);

    let second = executor.execute(&request()).await.unwrap_err();
    assert_matches!(second, RequestError::ExhaustedRetries { attempts: 1, .. });
    assert_eq!(transport.calls(), 5);
    assert_eq!(shared.collisions(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_per_operation_exhaustion_does_not_carry_over() {
    let transport = ScriptedTransport::statuses(&[500]);
    let executor = RetryExecutor::new(transport.clone())
        .with_strategy(ExponentialBackoff::builder().max_retries(2).build());

    for _ in 0..2 {
        let err = executor.execute(&request()).await.unwrap_err();
        assert_matches!(err, RequestError::ExhaustedRetries { attempts: 3, .. });
    }
    assert_eq!(transport.calls(), 6);
}

#[tokio::test(start_paused = true)]
async fn test_per_operation_counters_are_isolated() {
    let transport = ScriptedTransport::statuses(&[500, 500, 200, 500, 200]);
    let observer = Arc::new(RecordingObserver::default());
    let executor = RetryExecutor::new(transport).with_observer(observer.clone());

    executor.execute(&request()).await.unwrap();
    executor.execute(&request()).await.unwrap();

    let collisions: Vec<u32> = observer
        .retries
        .lock()
        .unwrap()
        .iter()
        .map(|e| e.collisions)
        .collect();
    assert_eq!(collisions, vec![1, 2, 1]);
}

#[tokio::test(start_paused = true)]
async fn test_transport_error_is_terminal() {
    let transport = ScriptedTransport::new(vec![Step::Refused]);
    let executor = RetryExecutor::new(transport.clone());

    let err = executor.execute(&request()).await.unwrap_err();

    assert_matches!(err, RequestError::Transport(TransportError::Connection(_)));
    assert_eq!(transport.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_transport_error_after_server_error_keeps_no_retry() {
    let transport = ScriptedTransport::new(vec![Step::Status(500, "down"), Step::Refused]);
    let executor = RetryExecutor::new(transport.clone());

    let err = executor.execute(&request()).await.unwrap_err();

    assert_matches!(err, RequestError::Transport(_));
    assert_eq!(transport.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_backoff_skips_next_attempt() {
    let transport = ScriptedTransport::statuses(&[500]);
    let executor = RetryExecutor::new(transport.clone());
    let cancel = CancellationToken::new();

    let task = {
        let cancel = cancel.clone();
        tokio::spawn(async move { executor.execute_with_cancel(&request(), &cancel).await })
    };

    // First attempt fails at t=0 and waits 1s; cancel halfway through.
    tokio::time::sleep(Duration::from_millis(500)).await;
    cancel.cancel();

    let err = task.await.unwrap().unwrap_err();
    assert_matches!(err, RequestError::Cancelled { attempts: 1 });
    assert_eq!(transport.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_before_start_sends_nothing() {
    let transport = ScriptedTransport::statuses(&[200]);
    let executor = RetryExecutor::new(transport.clone());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = executor
        .execute_with_cancel(&request(), &cancel)
        .await
        .unwrap_err();

    assert_matches!(err, RequestError::Cancelled { attempts: 0 });
    assert_eq!(transport.calls(), 0);
}
