#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Core retry primitives for the Ramona search client.
//!
//! This crate holds the parts of the request layer that do no I/O:
//!
//! - **Backoff calculator** via [`BackoffState`](retry::BackoffState), a
//!   truncated binary exponential backoff over a collision count
//! - **Shared collision counter** via [`SharedBackoff`](retry::SharedBackoff)
//!   for clients that opt into correlating retries across requests
//! - **Retry strategies** via the [`BackoffStrategy`](retry::BackoffStrategy)
//!   trait and its [`ExponentialBackoff`](retry::ExponentialBackoff)
//!   implementation
//!
//! The transport crate drives these from its request executor.
//!
//! # Examples
//!
//! ```rust
//! use ramona_core::prelude::*;
//! use std::time::Duration;
//!
//! let backoff = ExponentialBackoff::builder()
//!     .max_retries(10)
//!     .slot(Duration::from_millis(250))
//!     .build();
//!
//! // Three collisions: N = 7 slots, expected wait ceil(7 / 2) = 4 slots.
//! assert_eq!(backoff.delay_for(3), Duration::from_secs(1));
//! ```

pub mod retry;

/// Convenient re-exports of commonly used items.
///
/// ```rust
/// use ramona_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::retry::{
        BackoffState, BackoffStrategy, DEFAULT_MAX_RETRIES, ExponentialBackoff,
        ExponentialBackoffBuilder, SharedBackoff, WaitMode,
    };
}
