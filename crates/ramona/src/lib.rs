//! # Ramona
//!
//! Rust client for the Twingly search APIs:
//! - Blog search (XML)
//! - Forum search (JSON, with `next` pagination links)
//! - Social search (JSON, with `paging.next` URLs)
//! - Retries with truncated binary exponential backoff on server errors
//! - Cancellation of in-flight requests and pending backoff waits
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ramona::Client;
//! use ramona::query::{ForumQuery, ForumSort};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new("your-api-key")?;
//!
//!     let page = client
//!         .forum()
//!         .search(&ForumQuery::new().q("rust").language("english").sort(ForumSort::Relevancy))
//!         .await?;
//!
//!     println!("{}", page.text()?);
//!     Ok(())
//! }
//! ```
//!
//! ## Retries
//!
//! A 5xx response is retried after waiting the expected backoff for the
//! current collision count: `ceil((2^c - 1) / 2)` slots of one second by
//! default. Up to 50 retries are made, so a server that never recovers
//! sees 51 attempts. Any other non-2xx status ends the call immediately
//! with [`Error::ClientError`].

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Re-export commonly used types
pub use client::{Client, ClientBuilder};
pub use config::{BackoffConfig, ClientConfig, ClientConfigBuilder};
pub use error::{Error, Result};
pub use crate::http::{SearchRequest, SearchResponse};

// Module declarations
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod observability;
pub mod query;
pub mod resources;

// Re-export the retry layer for custom strategies and observers
pub use ramona_core::retry::{BackoffStrategy, ExponentialBackoff, SharedBackoff, WaitMode};
pub use ramona_transport::{
    BackoffScope, CancellationToken, HttpRequest, RetryEvent, RetryObserver, Transport,
};

#[cfg(feature = "trace")]
#[cfg_attr(docsrs, doc(cfg(feature = "trace")))]
pub use observability::init_tracing;

/// Prelude module for common imports
///
/// # Examples
///
/// ```rust
/// use ramona::prelude::*;
/// ```
pub mod prelude {

    pub use crate::{
        CancellationToken, Client, ClientConfig, Error, Result, SearchResponse,
        query::{
            BlogQuery, BlogSort, ForumQuery, ForumSort, Match, PostType, SearchQuery,
            SocialQuery, SortOrder, TimeBase, TimeSpan,
        },
    };
}

/// Crate version, automatically updated from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default blog search endpoint
pub const DEFAULT_BLOG_URL: &str = "https://api.twingly.com/blog/search/api/v3/search";

/// Default forum search endpoint
pub const DEFAULT_FORUM_URL: &str = "https://data.twingly.net/forum/a/search";

/// Origin that relative forum `next` links resolve against
pub const FORUM_SITE_URL: &str = "https://data.twingly.net";

/// Default social search endpoint
pub const DEFAULT_SOCIAL_URL: &str = "https://data.twingly.net/socialfeed/a/api/v1.5/search";

/// Default `User-Agent` header value
pub const DEFAULT_USER_AGENT: &str = concat!("Ramona/", env!("CARGO_PKG_VERSION"));
