//! Retry with exponential backoff for failed downloads.
//!
//! Every failure kind is retryable here: the public mirrors this tool talks
//! to return transient 5xx responses and drop connections mid-transfer often
//! enough that even "permanent-looking" statuses are worth a second attempt.
//!
//! # Delay Calculation
//!
//! ```text
//! delay = min(base_delay * multiplier^(attempt - 1), max_delay) + jitter
//! ```
//!
//! With defaults, delays are approximately: 5s, 25s (before hitting max
//! attempts).

use std::time::Duration;

use rand::Rng;
use tracing::debug;

/// Default maximum attempts, including the initial one.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default base delay for the first retry (5 seconds).
const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(5);

/// Default maximum delay cap (60 seconds).
const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);

/// Default backoff multiplier.
const DEFAULT_BACKOFF_MULTIPLIER: f64 = 5.0;

/// Maximum jitter added to delays (500ms).
const MAX_JITTER: Duration = Duration::from_millis(500);

/// Configuration for retry behavior with exponential backoff.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial attempt).
    max_attempts: u32,

    /// Base delay for the first retry.
    base_delay: Duration,

    /// Maximum delay cap.
    max_delay: Duration,

    /// Multiplier applied each attempt.
    backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
        }
    }
}

impl RetryPolicy {
    /// Creates a new retry policy with custom settings.
    ///
    /// `max_attempts` is clamped to at least 1.
    #[must_use]
    pub fn new(
        max_attempts: u32,
        base_delay: Duration,
        max_delay: Duration,
        backoff_multiplier: f64,
    ) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
            backoff_multiplier,
        }
    }

    /// Creates a policy with a custom `max_attempts`, defaults elsewhere.
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Returns the maximum number of attempts configured.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the delay before the next attempt, or `None` when `attempt`
    /// (1-indexed, the attempt that just failed) exhausted the budget.
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts {
            debug!(attempt, max = self.max_attempts, "max attempts reached");
            return None;
        }

        let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
        let raw = self.base_delay.as_secs_f64() * self.backoff_multiplier.powi(exponent);
        let capped = raw.min(self.max_delay.as_secs_f64());
        let jitter = rand::thread_rng().gen_range(0.0..MAX_JITTER.as_secs_f64());

        Some(Duration::from_secs_f64(capped + jitter))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_values() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 3);
    }

    #[test]
    fn test_backoff_sequence_grows_and_caps() {
        let policy = RetryPolicy::new(
            5,
            Duration::from_secs(5),
            Duration::from_secs(60),
            5.0,
        );

        let first = policy.backoff(1).unwrap();
        assert!(first >= Duration::from_secs(5), "first delay too short: {first:?}");
        assert!(first < Duration::from_secs(6), "first delay too long: {first:?}");

        let second = policy.backoff(2).unwrap();
        assert!(second >= Duration::from_secs(25), "second delay too short: {second:?}");
        assert!(second < Duration::from_secs(26), "second delay too long: {second:?}");

        // 5 * 5^2 = 125s, capped at 60s (plus jitter).
        let third = policy.backoff(3).unwrap();
        assert!(third >= Duration::from_secs(60), "third delay below cap: {third:?}");
        assert!(third < Duration::from_secs(61), "third delay above cap: {third:?}");
    }

    #[test]
    fn test_backoff_exhaustion() {
        let policy = RetryPolicy::default();
        assert!(policy.backoff(3).is_none());
        assert!(policy.backoff(4).is_none());
    }

    #[test]
    fn test_single_attempt_policy_never_retries() {
        let policy = RetryPolicy::with_max_attempts(1);
        assert!(policy.backoff(1).is_none());
    }

    #[test]
    fn test_zero_attempts_clamped_to_one() {
        let policy = RetryPolicy::with_max_attempts(0);
        assert_eq!(policy.max_attempts(), 1);
    }
}
