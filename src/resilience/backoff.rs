//! Retry delay calculation with optional jitter.

use rand::Rng;
use std::time::Duration;

use crate::config::BackoffStrategy;

/// Delay to wait after failed attempt number `attempt` (1-based).
///
/// Linear grows as `base × attempt`, exponential as `base × 2^(attempt-1)`;
/// both are capped at `max_ms`.
pub fn calculate_backoff(
    attempt: u32,
    base_ms: u64,
    max_ms: u64,
    strategy: BackoffStrategy,
    jitter: bool,
) -> Duration {
    if attempt == 0 {
        return Duration::from_millis(0);
    }

    let factor = match strategy {
        BackoffStrategy::Linear => u64::from(attempt),
        BackoffStrategy::Exponential => 2u64.saturating_pow(attempt - 1),
    };
    let capped_delay = base_ms.saturating_mul(factor).min(max_ms);

    // Jitter: 0 to 10% of the delay
    let jitter_range = capped_delay / 10;
    let jitter_ms = if jitter && jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped_delay + jitter_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_backoff() {
        let d = |n| calculate_backoff(n, 1000, 10_000, BackoffStrategy::Linear, false);
        assert_eq!(d(0), Duration::ZERO);
        assert_eq!(d(1), Duration::from_millis(1000));
        assert_eq!(d(2), Duration::from_millis(2000));
        assert_eq!(d(20), Duration::from_millis(10_000));
    }

    #[test]
    fn test_exponential_backoff() {
        let b1 = calculate_backoff(1, 100, 2000, BackoffStrategy::Exponential, false);
        assert_eq!(b1.as_millis(), 100);

        let b3 = calculate_backoff(3, 100, 2000, BackoffStrategy::Exponential, false);
        assert_eq!(b3.as_millis(), 400);

        let max = calculate_backoff(10, 100, 1000, BackoffStrategy::Exponential, false);
        assert_eq!(max.as_millis(), 1000);
    }

    #[test]
    fn test_jitter_stays_within_ten_percent() {
        for _ in 0..50 {
            let d = calculate_backoff(2, 1000, 10_000, BackoffStrategy::Linear, true);
            assert!(d.as_millis() >= 2000 && d.as_millis() < 2200);
        }
    }
}
