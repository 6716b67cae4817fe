//! The strategy seam between the backoff calculator and the executor.

use std::time::Duration;

/// A policy that decides how long to wait after a collision and when to stop.
///
/// The executor owns the collision counter; a strategy only maps a count to
/// a delay and names the retry ceiling. Implementations must be pure so the
/// same count always yields a delay from the same distribution.
///
/// # Examples
///
/// A fixed-delay strategy for tests or very forgiving endpoints:
///
/// ```rust
/// use ramona_core::retry::BackoffStrategy;
/// use std::time::Duration;
///
/// struct Fixed(Duration);
///
/// impl BackoffStrategy for Fixed {
///     fn delay_for(&self, _collisions: u32) -> Duration {
///         self.0
///     }
///
///     fn max_retries(&self) -> u32 {
///         3
///     }
/// }
///
/// let fixed = Fixed(Duration::from_millis(10));
/// assert!(fixed.allows_retry(3));
/// assert!(!fixed.allows_retry(4));
/// assert_eq!(fixed.worst_case_total_delay(), Duration::from_millis(30));
/// ```
pub trait BackoffStrategy: Send + Sync {
    /// Delay to wait before the retry that follows collision number
    /// `collisions` (1 for the first failure).
    fn delay_for(&self, collisions: u32) -> Duration;

    /// Maximum number of retries after the initial attempt.
    ///
    /// With `max_retries() == 50` an operation that keeps failing is
    /// attempted 51 times.
    fn max_retries(&self) -> u32;

    /// Whether a retry may follow collision number `collisions`.
    fn allows_retry(&self, collisions: u32) -> bool {
        collisions <= self.max_retries()
    }

    /// Total time spent waiting if every attempt fails.
    ///
    /// Saturates at `Duration::MAX`.
    fn worst_case_total_delay(&self) -> Duration {
        (1..=self.max_retries())
            .map(|collisions| self.delay_for(collisions))
            .fold(Duration::ZERO, Duration::saturating_add)
    }
}
