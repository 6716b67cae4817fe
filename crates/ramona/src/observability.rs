//! Structured logging for search calls
//!
//! Per-attempt and per-retry events come from the executor in the transport
//! crate; this module logs one line when a search starts and one when it
//! ends. URLs are logged without their query string, which holds the API
//! key.

use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Search request metadata for structured logging
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    /// Which endpoint is searched (blog, forum, social or custom)
    pub resource: &'static str,
    /// Request URL without query string or credentials
    pub url: String,
}

impl RequestMetadata {
    /// Create new request metadata
    pub fn new(resource: &'static str, url: impl Into<String>) -> Self {
        Self {
            resource,
            url: url.into(),
        }
    }

    /// Log search being started
    pub fn log_request(&self) {
        debug!(resource = self.resource, url = %self.url, "Starting search");
    }
}

/// Search outcome metadata for structured logging
#[derive(Debug, Clone)]
pub struct ResponseMetadata {
    /// Response body size in bytes (optional)
    pub body_size: Option<usize>,
    /// Time elapsed for the whole operation, retries included
    pub elapsed: Duration,
}

impl ResponseMetadata {
    /// Create new response metadata
    pub fn new(elapsed: Duration) -> Self {
        Self {
            body_size: None,
            elapsed,
        }
    }

    /// Set the response body size
    pub fn with_body_size(mut self, size: usize) -> Self {
        self.body_size = Some(size);
        self
    }

    /// Log successful search
    pub fn log_success(&self, request: &RequestMetadata) {
        info!(
            resource = request.resource,
            url = %request.url,
            elapsed_ms = self.elapsed.as_millis(),
            body_size = self.body_size,
            "Search succeeded"
        );
    }

    /// Log failed search
    pub fn log_error(&self, request: &RequestMetadata, error: &str) {
        warn!(
            resource = request.resource,
            url = %request.url,
            elapsed_ms = self.elapsed.as_millis(),
            error = %error,
            "Search failed"
        );
    }
}

/// Timer for measuring request duration
pub struct RequestTimer {
    start: Instant,
}

impl RequestTimer {
    /// Start a new timer
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Install a `fmt` subscriber filtered by `RUST_LOG`.
///
/// Falls back to `ramona=info,ramona_transport=warn` when `RUST_LOG` is
/// unset. Does nothing if a global subscriber is already installed.
#[cfg(feature = "trace")]
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ramona=info,ramona_transport=warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_metadata_creation() {
        let metadata = RequestMetadata::new("blog", "https://api.twingly.com/blog/search/api/v3/search");
        assert_eq!(metadata.resource, "blog");
        assert_eq!(
            metadata.url,
            "https://api.twingly.com/blog/search/api/v3/search"
        );
    }

    #[test]
    fn test_response_metadata() {
        let elapsed = Duration::from_millis(500);
        let metadata = ResponseMetadata::new(elapsed).with_body_size(1024);
        assert_eq!(metadata.elapsed, elapsed);
        assert_eq!(metadata.body_size, Some(1024));
    }

    #[test]
    fn test_request_timer() {
        let timer = RequestTimer::start();
        std::thread::sleep(Duration::from_millis(10));
        assert!(timer.elapsed().as_millis() >= 10);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn test_init_tracing_twice_is_harmless() {
        init_tracing();
        init_tracing();
        tracing::info!("still running");
    }
}
