//! Truncated binary exponential backoff over a collision count.

use std::sync::atomic::{AtomicU32, Ordering};

/// Number of backoff slots after `collisions` consecutive failures.
///
/// After `c` collisions a retry may land in any slot of `[0, N]` where
/// `N = 2^c - 1`. Saturates at `u64::MAX` once `c` reaches 64.
///
/// ```rust
/// use ramona_core::retry::slot_count;
///
/// assert_eq!(slot_count(0), 0);
/// assert_eq!(slot_count(3), 7);
/// ```
pub fn slot_count(collisions: u32) -> u64 {
    1u64.checked_shl(collisions)
        .map_or(u64::MAX, |slots| slots - 1)
}

/// Expected wait, in whole slots, after `collisions` consecutive failures.
///
/// The mean of a uniform distribution over `{0, 1, ..., N}` is
/// `(1 / (N + 1)) * (N * (N + 1) / 2)`, rounded up. That reduces to
/// `ceil(N / 2)`, which is computed in integers so large counts stay exact.
///
/// ```rust
/// use ramona_core::retry::expected_wait_seconds;
///
/// let waits: Vec<u64> = (0..5).map(expected_wait_seconds).collect();
/// assert_eq!(waits, [0, 1, 2, 4, 8]);
/// ```
pub fn expected_wait_seconds(collisions: u32) -> u64 {
    slot_count(collisions).div_ceil(2)
}

/// Collision counter for one retry sequence.
///
/// The count is unsigned, so a negative collision count cannot be recorded.
/// A fresh state starts at zero collisions.
///
/// # Examples
///
/// ```rust
/// use ramona_core::retry::BackoffState;
///
/// let mut state = BackoffState::new();
/// assert_eq!(state.expected_wait_seconds(), 0);
///
/// let wait = state.set_collisions(2).expected_wait_seconds();
/// assert_eq!(wait, 2);
///
/// state.reset();
/// assert_eq!(state.collisions(), 0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackoffState {
    collisions: u32,
}

impl BackoffState {
    /// Create a state with no recorded collisions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a state with `collisions` already recorded.
    pub fn with_collisions(collisions: u32) -> Self {
        Self { collisions }
    }

    /// Record the current collision count.
    pub fn set_collisions(&mut self, collisions: u32) -> &mut Self {
        self.collisions = collisions;
        self
    }

    /// The last recorded collision count.
    pub fn collisions(&self) -> u32 {
        self.collisions
    }

    /// Forget all collisions.
    pub fn reset(&mut self) {
        self.collisions = 0;
    }

    /// `2^c - 1` for the recorded count.
    pub fn slot_count(&self) -> u64 {
        slot_count(self.collisions)
    }

    /// `ceil(N / 2)` for the recorded count.
    pub fn expected_wait_seconds(&self) -> u64 {
        expected_wait_seconds(self.collisions)
    }
}

/// A collision counter shared by every operation that holds it.
///
/// Operations running through the same `SharedBackoff` see each other's
/// failures: a server error on one raises the starting point of the next.
/// Interleaved operations race on the counter.
#[derive(Debug, Default)]
pub struct SharedBackoff {
    collisions: AtomicU32,
}

impl SharedBackoff {
    /// Create a counter at zero collisions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current collision count.
    pub fn collisions(&self) -> u32 {
        self.collisions.load(Ordering::SeqCst)
    }

    /// Record a collision count.
    pub fn set_collisions(&self, collisions: u32) {
        self.collisions.store(collisions, Ordering::SeqCst);
    }

    /// Reset to zero collisions.
    pub fn reset(&self) {
        self.set_collisions(0);
    }

    /// Snapshot of the counter as a [`BackoffState`].
    pub fn state(&self) -> BackoffState {
        BackoffState::with_collisions(self.collisions())
    }
}
