//! Backoff for Telegram Bot API calls and the polling loop

use std::time::Duration;

use rand::Rng;

/// Retry policy for Telegram Bot API calls
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Base delay between retries (doubles each attempt)
    pub base_delay: Duration,
    /// Maximum delay cap
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Policy for `getUpdates`: retried forever, so only the delay matters
    #[must_use]
    pub const fn polling() -> Self {
        Self {
            max_retries: u32::MAX,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
        }
    }
}

/// Whether an HTTP status is worth retrying: flood control or a server error
#[must_use]
pub fn is_recoverable(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}

/// Compute the delay before the next retry attempt
///
/// A server-supplied `retry_after` wins, capped at `max_delay`. Otherwise
/// `base_delay * 2^attempt` plus up to 25% jitter, capped at `max_delay`.
#[must_use]
pub fn delay_for_attempt(
    policy: &RetryPolicy,
    attempt: u32,
    retry_after: Option<Duration>,
) -> Duration {
    if let Some(ra) = retry_after {
        return ra.min(policy.max_delay);
    }

    let base = policy
        .base_delay
        .saturating_mul(2u32.saturating_pow(attempt))
        .min(policy.max_delay);
    let jitter = base.mul_f64(rand::thread_rng().gen_range(0.0..0.25));

    (base + jitter).min(policy.max_delay)
}

/// Consecutive-failure counter for a long-running loop
#[derive(Debug)]
pub struct Backoff {
    policy: RetryPolicy,
    failures: u32,
}

impl Backoff {
    #[must_use]
    pub const fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            failures: 0,
        }
    }

    /// Record a failure and return how long to wait before trying again
    pub fn next_delay(&mut self, retry_after: Option<Duration>) -> Duration {
        let delay = delay_for_attempt(&self.policy, self.failures, retry_after);
        self.failures = self.failures.saturating_add(1);
        delay
    }

    /// Number of failures since the last success
    #[must_use]
    pub const fn failures(&self) -> u32 {
        self.failures
    }

    pub fn reset(&mut self) {
        self.failures = 0;
    }
}
