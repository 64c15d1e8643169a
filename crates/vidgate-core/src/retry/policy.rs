use std::time::Duration;

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Schedule an automatic retry after the given delay.
    RetryAfter(Duration),
    /// Ceiling reached; only a manual retry may re-enter loading.
    GiveUp,
}

/// Exponential backoff with a fixed automatic-retry ceiling.
///
/// Retry `n` (0-based) waits `base_delay * 2^n`, capped at `max_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Automatic retries allowed before a manual retry is required.
    pub max_auto_retries: u32,
    /// Delay before the first automatic retry.
    pub base_delay: Duration,
    /// Upper bound on backoff delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_auto_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry `n` (0-based), ignoring the ceiling.
    pub fn delay_for(&self, n: u32) -> Duration {
        let exp = 1u32 << n.min(16);
        self.base_delay.saturating_mul(exp).min(self.max_delay)
    }

    /// Decide what happens after a failed attempt, given how many automatic
    /// retries have already been scheduled for this identifier.
    pub fn decide(&self, retries_used: u32) -> RetryDecision {
        if retries_used >= self.max_auto_retries {
            return RetryDecision::GiveUp;
        }
        RetryDecision::RetryAfter(self.delay_for(retries_used))
    }
}
