//! Truncated binary exponential backoff strategy.

use super::backoff::{expected_wait_seconds, slot_count};
use super::strategy::BackoffStrategy;
use rand::Rng;
use std::time::Duration;

/// Retry ceiling used when none is configured.
pub const DEFAULT_MAX_RETRIES: u32 = 50;

const DEFAULT_SLOT: Duration = Duration::from_secs(1);

/// How a wait is chosen from the `[0, N]` slot range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WaitMode {
    /// Always wait the expected value, `ceil(N / 2)` slots.
    #[default]
    Expected,
    /// Wait a uniformly sampled slot in `[0, N]`.
    RandomSlot,
}

/// Exponential backoff driven by the collision count.
///
/// After `c` collisions the wait is drawn from `N + 1` slots where
/// `N = 2^c - 1`, each slot lasting [`slot`](ExponentialBackoffBuilder::slot).
///
/// # Delay Formula
///
/// ```text
/// N          = 2^c - 1
/// slots      = ceil(N / 2)             (WaitMode::Expected)
///            | uniform(0..=N)          (WaitMode::RandomSlot)
/// delay      = min(slots * slot, max_delay)
/// ```
///
/// With the defaults (1 second slots, 50 retries, no cap) the waits are
/// 1s, 2s, 4s, 8s, ... and the fiftieth wait alone is `2^49` seconds. Set
/// [`max_delay`](ExponentialBackoffBuilder::max_delay) for anything that
/// must finish within a working day.
///
/// # Examples
///
/// ```rust
/// use ramona_core::retry::{BackoffStrategy, ExponentialBackoff};
/// use std::time::Duration;
///
/// let backoff = ExponentialBackoff::default();
/// assert_eq!(backoff.max_retries(), 50);
/// assert_eq!(backoff.delay_for(1), Duration::from_secs(1));
/// assert_eq!(backoff.delay_for(4), Duration::from_secs(8));
///
/// let capped = ExponentialBackoff::builder()
///     .max_delay(Duration::from_secs(60))
///     .build();
/// assert_eq!(capped.delay_for(20), Duration::from_secs(60));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExponentialBackoff {
    max_retries: u32,
    slot: Duration,
    max_delay: Option<Duration>,
    wait_mode: WaitMode,
}

impl ExponentialBackoff {
    /// Create a new builder for configuring exponential backoff.
    pub fn builder() -> ExponentialBackoffBuilder {
        ExponentialBackoffBuilder::default()
    }

    /// Duration of one backoff slot.
    pub fn slot(&self) -> Duration {
        self.slot
    }

    /// Upper bound applied to every delay, if any.
    pub fn max_delay(&self) -> Option<Duration> {
        self.max_delay
    }

    /// How waits are picked from the slot range.
    pub fn wait_mode(&self) -> WaitMode {
        self.wait_mode
    }

    /// The longest delay `delay_for(collisions)` can return.
    pub fn max_delay_for(&self, collisions: u32) -> Duration {
        let slots = match self.wait_mode {
            WaitMode::Expected => expected_wait_seconds(collisions),
            WaitMode::RandomSlot => slot_count(collisions),
        };
        self.cap(scale(self.slot, slots))
    }

    fn cap(&self, delay: Duration) -> Duration {
        match self.max_delay {
            Some(max) => delay.min(max),
            None => delay,
        }
    }
}

impl Default for ExponentialBackoff {
    /// Defaults:
    /// - `max_retries`: 50
    /// - `slot`: 1s
    /// - `max_delay`: none
    /// - `wait_mode`: [`WaitMode::Expected`]
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            slot: DEFAULT_SLOT,
            max_delay: None,
            wait_mode: WaitMode::Expected,
        }
    }
}

impl BackoffStrategy for ExponentialBackoff {
    fn delay_for(&self, collisions: u32) -> Duration {
        let slots = match self.wait_mode {
            WaitMode::Expected => expected_wait_seconds(collisions),
            WaitMode::RandomSlot => rand::thread_rng().gen_range(0..=slot_count(collisions)),
        };
        self.cap(scale(self.slot, slots))
    }

    fn max_retries(&self) -> u32 {
        self.max_retries
    }

    fn worst_case_total_delay(&self) -> Duration {
        (1..=self.max_retries)
            .map(|collisions| self.max_delay_for(collisions))
            .fold(Duration::ZERO, Duration::saturating_add)
    }
}

/// `slot * slots` without overflowing into a panic.
fn scale(slot: Duration, slots: u64) -> Duration {
    let nanos = slot.as_nanos().saturating_mul(u128::from(slots));
    match u64::try_from(nanos / 1_000_000_000) {
        Ok(secs) => Duration::new(secs, (nanos % 1_000_000_000) as u32),
        Err(_) => Duration::MAX,
    }
}

/// Builder for configuring [`ExponentialBackoff`].
///
/// # Examples
///
/// ```rust
/// use ramona_core::retry::{ExponentialBackoff, WaitMode};
/// use std::time::Duration;
///
/// let backoff = ExponentialBackoff::builder()
///     .max_retries(8)
///     .slot(Duration::from_millis(500))
///     .max_delay(Duration::from_secs(30))
///     .wait_mode(WaitMode::RandomSlot)
///     .build();
/// ```
#[derive(Debug, Default)]
pub struct ExponentialBackoffBuilder {
    max_retries: Option<u32>,
    slot: Option<Duration>,
    max_delay: Option<Duration>,
    wait_mode: Option<WaitMode>,
}

impl ExponentialBackoffBuilder {
    /// Set the maximum number of retries.
    ///
    /// Default: 50
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Set the duration of one backoff slot.
    ///
    /// Default: 1s
    pub fn slot(mut self, slot: Duration) -> Self {
        self.slot = Some(slot);
        self
    }

    /// Cap every delay at `delay`.
    ///
    /// Default: uncapped
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = Some(delay);
        self
    }

    /// Set how waits are picked from the slot range.
    ///
    /// Default: [`WaitMode::Expected`]
    pub fn wait_mode(mut self, mode: WaitMode) -> Self {
        self.wait_mode = Some(mode);
        self
    }

    /// Build the `ExponentialBackoff` instance.
    ///
    /// Uses default values for any unset parameters.
    pub fn build(self) -> ExponentialBackoff {
        let backoff = ExponentialBackoff {
            max_retries: self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            slot: self.slot.unwrap_or(DEFAULT_SLOT),
            max_delay: self.max_delay,
            wait_mode: self.wait_mode.unwrap_or_default(),
        };

        #[cfg(feature = "tracing")]
        log_uncapped(&backoff);

        backoff
    }
}

#[cfg(feature = "tracing")]
fn log_uncapped(backoff: &ExponentialBackoff) {
    if backoff.max_delay.is_none() && backoff.max_retries > 20 {
        tracing::debug!(
            max_retries = backoff.max_retries,
            worst_case_secs = backoff.worst_case_total_delay().as_secs(),
            "exponential backoff has no delay cap"
        );
    }
}
