//! Retry policy.
//!
//! # Responsibilities
//! - Bound the number of attempts
//! - Decide whether another attempt is allowed
//! - Produce the delay before the next attempt

use std::time::Duration;

use crate::config::{BackoffStrategy, RetryConfig};
use crate::resilience::backoff::calculate_backoff;

/// Bounded sequential retry policy.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay_ms: u64,
    max_delay_ms: u64,
    strategy: BackoffStrategy,
    jitter: bool,
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay_ms: config.base_delay_ms,
            max_delay_ms: config.max_delay_ms,
            strategy: config.strategy,
            jitter: config.jitter,
        }
    }

    /// Total attempts, including the first.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Whether a failure on `attempt` (1-based) may be followed by another try.
    pub fn should_retry(&self, attempt: u32, retryable: bool) -> bool {
        retryable && attempt < self.max_attempts
    }

    /// Wait before the attempt following `attempt`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        calculate_backoff(
            attempt,
            self.base_delay_ms,
            self.max_delay_ms,
            self.strategy,
            self.jitter,
        )
    }

    /// Longest a full run of attempts can take when each attempt runs up to
    /// `attempt_timeout` and every delay carries its maximum jitter.
    pub fn worst_case_duration(&self, attempt_timeout: Duration) -> Duration {
        let delays: Duration = (1..self.max_attempts)
            .map(|attempt| {
                let delay = calculate_backoff(
                    attempt,
                    self.base_delay_ms,
                    self.max_delay_ms,
                    self.strategy,
                    false,
                );
                if self.jitter {
                    delay + delay / 10
                } else {
                    delay
                }
            })
            .sum();
        attempt_timeout * self.max_attempts + delays
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_matches_three_linear_attempts() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 3);
        assert!(policy.should_retry(1, true));
        assert!(policy.should_retry(2, true));
        assert!(!policy.should_retry(3, true));
        assert!(!policy.should_retry(1, false));
        assert_eq!(policy.delay_after(1), Duration::from_secs(1));
        assert_eq!(policy.delay_after(2), Duration::from_secs(2));
    }

    #[test]
    fn test_worst_case_duration_covers_attempts_and_delays() {
        let policy = RetryPolicy::default();
        assert_eq!(
            policy.worst_case_duration(Duration::from_secs(30)),
            Duration::from_secs(93)
        );

        let jittered = RetryPolicy::from_config(&RetryConfig {
            jitter: true,
            ..RetryConfig::default()
        });
        assert_eq!(
            jittered.worst_case_duration(Duration::from_secs(30)),
            Duration::from_millis(93_300)
        );

        let single = RetryPolicy::from_config(&RetryConfig {
            max_attempts: 1,
            ..RetryConfig::default()
        });
        assert_eq!(
            single.worst_case_duration(Duration::from_secs(5)),
            Duration::from_secs(5)
        );
    }

    #[test]
    fn test_zero_attempts_still_tries_once() {
        let policy = RetryPolicy::from_config(&RetryConfig {
            max_attempts: 0,
            ..RetryConfig::default()
        });
        assert_eq!(policy.max_attempts(), 1);
        assert!(!policy.should_retry(1, true));
    }
}
