// src/resilience/retry.rs

use std::time::Duration;

/// Bounded retry with exponential backoff.
///
/// Attempt `n` (1-based) waits `backoff_base * 2^n` before running again,
/// so the reference base of one second gives 2s, 4s, 8s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff_base: Duration) -> Self {
        Self {
            max_retries,
            backoff_base,
        }
    }

    /// Delay before retry number `attempt` (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.backoff_base.saturating_mul(factor)
    }

    /// Total executions allowed, first call included
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_backoff() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
        assert_eq!(policy.delay_for(3), Duration::from_secs(8));
        assert_eq!(policy.max_attempts(), 4);
    }

    #[test]
    fn test_huge_attempt_saturates() {
        let policy = RetryPolicy::new(100, Duration::from_millis(10));
        assert_eq!(policy.delay_for(64), Duration::from_millis(10).saturating_mul(u32::MAX));
    }
}
