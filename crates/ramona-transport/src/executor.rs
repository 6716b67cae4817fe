//! Resilient request executor
//!
//! Drives one [`HttpRequest`] through a [`Transport`] until it succeeds, the
//! server rejects it, no response can be obtained, or server errors outlast
//! the retry ceiling.
//!
//! # Retry Contract
//!
//! | Outcome of an attempt | Collision counter | Next step |
//! |-----------------------|-------------------|-----------|
//! | 2xx                   | reset to 0        | return the body |
//! | 4xx (any non-5xx)     | reset to 0        | return [`RequestError::ClientError`] |
//! | 5xx, `c + 1 <= max`   | set to `c + 1`    | wait `delay_for(c + 1)`, resend |
//! | 5xx, `c + 1 > max`    | unchanged         | return [`RequestError::ExhaustedRetries`] |
//! | no response           | unchanged         | return [`RequestError::Transport`] |
//!
//! With the default ceiling of 50 an operation that only ever sees server
//! errors is attempted 51 times. In [`BackoffScope::Shared`] the counter is
//! left at the ceiling, so the next operation gives up after one server
//! error unless something succeeds in between.

use crate::error::RequestError;
use crate::outcome::RequestOutcome;
use crate::traits::{HttpRequest, Transport};
use bytes::Bytes;
use ramona_core::retry::{BackoffState, BackoffStrategy, ExponentialBackoff, SharedBackoff};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Where an operation keeps its collision count.
#[derive(Debug, Clone, Default)]
pub enum BackoffScope {
    /// Every operation starts from zero collisions
    #[default]
    PerOperation,

    /// All operations read and write one counter
    ///
    /// An operation starts from whatever the counter holds, and concurrent
    /// operations race on it.
    Shared(Arc<SharedBackoff>),
}

/// A scheduled retry or the end of the retry budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryEvent {
    /// Attempt that failed, starting at 1
    pub attempt: u32,
    /// Status of the failed attempt
    pub status: u16,
    /// Collision count after the failure
    pub collisions: u32,
    /// Wait before the next attempt; zero when retries are exhausted
    pub delay: Duration,
}

/// Diagnostic hook for retry activity.
///
/// Observers see every intermediate server error that the caller never
/// does. Both methods default to doing nothing.
pub trait RetryObserver: Send + Sync {
    /// A server error occurred and a retry is scheduled.
    fn on_retry(&self, event: &RetryEvent) {
        let _ = event;
    }

    /// A server error occurred and no retries remain.
    fn on_exhausted(&self, event: &RetryEvent) {
        let _ = event;
    }
}

enum Counter<'a> {
    Local(BackoffState),
    Shared(&'a SharedBackoff),
}

impl Counter<'_> {
    fn collisions(&self) -> u32 {
        match self {
            Self::Local(state) => state.collisions(),
            Self::Shared(shared) => shared.collisions(),
        }
    }

    fn record(&mut self, collisions: u32) {
        match self {
            Self::Local(state) => {
                state.set_collisions(collisions);
            }
            Self::Shared(shared) => shared.set_collisions(collisions),
        }
    }

    fn reset(&mut self) {
        match self {
            Self::Local(state) => state.reset(),
            Self::Shared(shared) => shared.reset(),
        }
    }
}

/// Executes requests with exponential backoff on server errors.
///
/// Cloning is cheap; clones share the transport, the strategy, the observer
/// and, in [`BackoffScope::Shared`], the collision counter.
///
/// # Examples
///
/// ```no_run
/// use ramona_core::retry::ExponentialBackoff;
/// use ramona_transport::{CancellationToken, HttpRequest, HttpTransport, RetryExecutor};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let executor = RetryExecutor::new(Arc::new(HttpTransport::new()?)).with_strategy(
///     ExponentialBackoff::builder()
///         .max_retries(10)
///         .max_delay(Duration::from_secs(120))
///         .build(),
/// );
///
/// let cancel = CancellationToken::new();
/// let request = HttpRequest::get("https://data.twingly.net/forum/a/search?q=rust");
/// let body = executor.execute_with_cancel(&request, &cancel).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RetryExecutor {
    transport: Arc<dyn Transport>,
    strategy: Arc<dyn BackoffStrategy>,
    scope: BackoffScope,
    observer: Option<Arc<dyn RetryObserver>>,
}

impl RetryExecutor {
    /// Create an executor with the default [`ExponentialBackoff`] and
    /// per-operation collision counting.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            strategy: Arc::new(ExponentialBackoff::default()),
            scope: BackoffScope::PerOperation,
            observer: None,
        }
    }

    /// Use a different backoff strategy.
    pub fn with_strategy(mut self, strategy: impl BackoffStrategy + 'static) -> Self {
        self.strategy = Arc::new(strategy);
        self
    }

    /// Set where collision counts live.
    pub fn with_scope(mut self, scope: BackoffScope) -> Self {
        self.scope = scope;
        self
    }

    /// Share one collision counter between every operation of this executor.
    pub fn with_shared_backoff(self, shared: Arc<SharedBackoff>) -> Self {
        self.with_scope(BackoffScope::Shared(shared))
    }

    /// Report retries to `observer`.
    pub fn with_observer(mut self, observer: Arc<dyn RetryObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// The backoff strategy in use.
    pub fn strategy(&self) -> &dyn BackoffStrategy {
        self.strategy.as_ref()
    }

    /// The collision scope in use.
    pub fn scope(&self) -> &BackoffScope {
        &self.scope
    }

    /// Execute `request`, retrying server errors.
    ///
    /// Resolves with the body of the first 2xx response.
    ///
    /// # Errors
    ///
    /// - [`RequestError::ClientError`] on any non-2xx, non-5xx response
    /// - [`RequestError::ExhaustedRetries`] when 5xx outlasts the ceiling
    /// - [`RequestError::Transport`] when no response is obtained
    pub async fn execute(&self, request: &HttpRequest) -> Result<Bytes, RequestError> {
        self.execute_with_cancel(request, &CancellationToken::new()).await
    }

    /// Execute `request`, stopping early once `cancel` fires.
    ///
    /// Cancelling interrupts the in-flight attempt or the pending backoff
    /// wait. An attempt whose wait was cancelled is never sent.
    ///
    /// # Errors
    ///
    /// As [`execute`](Self::execute), plus [`RequestError::Cancelled`].
    pub async fn execute_with_cancel(
        &self,
        request: &HttpRequest,
        cancel: &CancellationToken,
    ) -> Result<Bytes, RequestError> {
        let mut counter = match &self.scope {
            BackoffScope::PerOperation => Counter::Local(BackoffState::new()),
            BackoffScope::Shared(shared) => Counter::Shared(shared),
        };
        let url = request.redacted_url();
        let mut attempts = 0u32;

        loop {
            if cancel.is_cancelled() {
                return Err(RequestError::Cancelled { attempts });
            }

            attempts += 1;
            debug!(url = %url, attempt = attempts, "Sending request");

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(url = %url, attempt = attempts, "Request cancelled in flight");
                    return Err(RequestError::Cancelled { attempts });
                }
                result = self.transport.send_http(request) => result,
            };

            match RequestOutcome::from(result) {
                RequestOutcome::Success { body, .. } => {
                    counter.reset();
                    debug!(url = %url, attempts, body_size = body.len(), "Request succeeded");
                    return Ok(body);
                }
                RequestOutcome::ClientError { status, body } => {
                    counter.reset();
                    debug!(url = %url, status, attempts, "Request rejected by server");
                    return Err(RequestError::ClientError { status, body });
                }
                RequestOutcome::TransportError(err) => {
                    warn!(url = %url, attempts, error = %err, "No response from server");
                    return Err(err.into());
                }
                RequestOutcome::ServerError { status, body } => {
                    let collisions = counter.collisions().saturating_add(1);

                    if !self.strategy.allows_retry(collisions) {
                        let event = RetryEvent {
                            attempt: attempts,
                            status,
                            collisions,
                            delay: Duration::ZERO,
                        };
                        warn!(url = %url, status, attempts, "Retries exhausted");
                        if let Some(observer) = &self.observer {
                            observer.on_exhausted(&event);
                        }
                        return Err(RequestError::ExhaustedRetries {
                            last_status: status,
                            last_body: body,
                            attempts,
                        });
                    }

                    counter.record(collisions);
                    let delay = self.strategy.delay_for(collisions);
                    warn!(
                        url = %url,
                        status,
                        collisions,
                        delay_ms = delay.as_millis(),
                        "Server error, retrying after backoff"
                    );
                    if let Some(observer) = &self.observer {
                        observer.on_retry(&RetryEvent {
                            attempt: attempts,
                            status,
                            collisions,
                            delay,
                        });
                    }

                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => {
                            debug!(url = %url, attempts, "Retry cancelled during backoff");
                            return Err(RequestError::Cancelled { attempts });
                        }
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }
    }
}
