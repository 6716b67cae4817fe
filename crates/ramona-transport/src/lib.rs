//! Transport layer for the Ramona search client
//!
//! Sends GET requests to the search endpoints and retries server errors
//! with exponential backoff.
//!
//! # Architecture
//!
//! - **Transport trait**: one attempt, at most one network request
//! - **HTTP transport**: [`HttpTransport`] over reqwest
//! - **Outcome**: [`RequestOutcome`] classifies each attempt as success,
//!   client error, server error or transport failure
//! - **Executor**: [`RetryExecutor`] repeats an attempt while the server
//!   keeps failing, waiting out the backoff between attempts
//! - **Error handling**: [`TransportError`] for single attempts,
//!   [`RequestError`] for the terminal result of a whole operation

#![deny(unsafe_code)]
#![warn(missing_docs)]
//!
//! # Usage
//!
//! ```no_run
//! use ramona_transport::{HttpRequest, HttpTransport, RetryExecutor};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = Arc::new(HttpTransport::new()?);
//! let executor = RetryExecutor::new(transport);
//!
//! let request = HttpRequest::get("https://api.twingly.com/blog/search/api/v3/search?q=rust")
//!     .with_header("Accept", "text/xml");
//! let body = executor.execute(&request).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod executor;
pub mod http;
pub mod outcome;
pub mod traits;

// Re-export commonly used types
pub use crate::error::{RequestError, Result, TransportError};
pub use crate::executor::{BackoffScope, RetryEvent, RetryExecutor, RetryObserver};
pub use crate::http::{HttpTransport, HttpTransportConfig};
pub use crate::outcome::RequestOutcome;
pub use crate::traits::{HttpRequest, HttpResponse, Transport};

pub use tokio_util::sync::CancellationToken;
