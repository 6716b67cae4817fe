//! Backoff calculation and retry strategies.
//!
//! # Key Types
//!
//! - [`BackoffState`] - collision counter with the expected-wait formula
//! - [`SharedBackoff`] - collision counter shared between operations
//! - [`BackoffStrategy`] - turns a collision count into a delay and a ceiling
//! - [`ExponentialBackoff`] - the default strategy
//!
//! # Examples
//!
//! ```rust
//! use ramona_core::retry::BackoffState;
//!
//! let mut state = BackoffState::new();
//! state.set_collisions(4);
//!
//! assert_eq!(state.slot_count(), 15);
//! assert_eq!(state.expected_wait_seconds(), 8);
//! ```

mod backoff;
mod exponential;
mod strategy;

pub use backoff::{BackoffState, SharedBackoff, expected_wait_seconds, slot_count};
pub use exponential::{DEFAULT_MAX_RETRIES, ExponentialBackoff, ExponentialBackoffBuilder, WaitMode};
pub use strategy::BackoffStrategy;
