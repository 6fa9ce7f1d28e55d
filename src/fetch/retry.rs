//! Fixed-cap retry wrapper shared by every request.
//!
//! A failing operation is re-invoked after a fixed or jittered delay until it
//! succeeds or the attempt cap is reached. Exhaustion is not an error: the
//! wrapper logs and returns `None`, and the caller treats the page or record
//! as unavailable.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

use crate::config::{
    PACING_MAX, PACING_MIN, RETRY_FIXED_DELAY, RETRY_MAX_ATTEMPTS, RETRY_PACED_DELAY,
};

/// How long to wait between two attempts (or before a paced attempt).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DelayPolicy {
    /// Always the same delay.
    Fixed(Duration),
    /// A uniformly random delay in `[min, max]`.
    Jittered { min: Duration, max: Duration },
}

impl DelayPolicy {
    /// Draws the next delay.
    pub fn next_delay(&self) -> Duration {
        match *self {
            DelayPolicy::Fixed(delay) => delay,
            DelayPolicy::Jittered { min, max } => {
                if max <= min {
                    return min;
                }
                let min_ms = u64::try_from(min.as_millis()).unwrap_or(u64::MAX);
                let max_ms = u64::try_from(max.as_millis()).unwrap_or(u64::MAX);
                Duration::from_millis(rand::rng().random_range(min_ms..=max_ms))
            }
        }
    }
}

/// Retry parameters for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total invocations allowed, including the first. Zero is treated as one.
    pub max_attempts: usize,
    /// Wait after a failed attempt.
    pub delay: DelayPolicy,
    /// Optional wait before every attempt, failed or not.
    pub pacing: Option<DelayPolicy>,
}

impl RetryPolicy {
    /// Fixed delay after failures, no pacing.
    pub fn fixed(max_attempts: usize, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay: DelayPolicy::Fixed(delay),
            pacing: None,
        }
    }

    /// Jittered pause before every attempt plus a fixed delay after failures.
    pub fn paced(max_attempts: usize, delay: Duration, min: Duration, max: Duration) -> Self {
        Self {
            max_attempts,
            delay: DelayPolicy::Fixed(delay),
            pacing: Some(DelayPolicy::Jittered { min, max }),
        }
    }

    /// Policy used by the paced sites (Dongchedi, BSE).
    pub fn paced_default() -> Self {
        Self::paced(RETRY_MAX_ATTEMPTS, RETRY_PACED_DELAY, PACING_MIN, PACING_MAX)
    }

    /// Replaces the post-failure delay, keeping everything else.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = DelayPolicy::Fixed(delay);
        self
    }

    /// Replaces the attempt cap, keeping everything else.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    fn attempt_cap(&self) -> usize {
        self.max_attempts.max(1)
    }

    /// Delays between attempts, as consumed by `tokio_retry`.
    ///
    /// Yields `attempt_cap - 1` delays, so the operation runs at most
    /// `attempt_cap` times.
    pub fn strategy(&self) -> impl Iterator<Item = Duration> {
        let delay = self.delay.clone();
        std::iter::repeat_with(move || delay.next_delay()).take(self.attempt_cap() - 1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(RETRY_MAX_ATTEMPTS, RETRY_FIXED_DELAY)
    }
}

/// Runs `op` until it succeeds or `policy` gives up.
///
/// # Arguments
///
/// * `policy` - Attempt cap and delays
/// * `label` - What is being attempted (usually the URL), for log lines
/// * `op` - Zero-argument async operation, called once per attempt
///
/// # Returns
///
/// `Some(value)` from the first successful attempt, or `None` once every
/// attempt failed. Errors never cross this boundary.
pub async fn retry_on_failure<T, E, F, Fut>(policy: &RetryPolicy, label: &str, mut op: F) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let max_attempts = policy.attempt_cap();
    let pacing = policy.pacing.clone();
    let mut attempt = 0usize;

    #[allow(deprecated)]
    let result = tokio_retry::Retry::spawn(policy.strategy(), || {
        attempt += 1;
        let current = attempt;
        let pause = pacing.as_ref().map(DelayPolicy::next_delay);
        let pending = op();

        async move {
            if let Some(pause) = pause {
                tokio::time::sleep(pause).await;
            }
            pending.await.map_err(|e| {
                log::error!(
                    "Request failed ({label}): {e}. Retrying {current}/{max_attempts} attempts."
                );
                e
            })
        }
    })
    .await;

    match result {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("All attempts failed. Unable to make successful request. URL: {label}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn instant_policy(max_attempts: usize) -> RetryPolicy {
        RetryPolicy::fixed(max_attempts, Duration::ZERO)
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let calls = AtomicUsize::new(0);
        let result = retry_on_failure(&instant_policy(3), "first", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, String>("body") }
        })
        .await;

        assert_eq!(result, Some("body"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_recovers_after_failures_below_cap() {
        let calls = AtomicUsize::new(0);
        let result = retry_on_failure(&instant_policy(3), "flaky", || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n < 3 {
                    Err(format!("failure {n}"))
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result, Some(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_always_failing_exhausts_cap_and_returns_none() {
        let calls = AtomicUsize::new(0);
        let result: Option<()> = retry_on_failure(&instant_policy(3), "down", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err("503") }
        })
        .await;

        assert!(result.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_zero_attempts_still_tries_once() {
        let calls = AtomicUsize::new(0);
        let result: Option<()> = retry_on_failure(&instant_policy(0), "zero", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err("nope") }
        })
        .await;

        assert!(result.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_pacing_applies_before_each_attempt() {
        let policy = RetryPolicy::paced(
            2,
            Duration::ZERO,
            Duration::from_millis(5),
            Duration::from_millis(10),
        );
        let start = std::time::Instant::now();
        let result: Option<()> = retry_on_failure(&policy, "paced", || async { Err("x") }).await;

        assert!(result.is_none());
        assert!(start.elapsed() >= Duration::from_millis(10));
    }

    #[test]
    fn test_strategy_yields_cap_minus_one_delays() {
        let policy = RetryPolicy::fixed(3, Duration::from_secs(10));
        let delays: Vec<_> = policy.strategy().collect();
        assert_eq!(delays, vec![Duration::from_secs(10); 2]);
        assert_eq!(instant_policy(1).strategy().count(), 0);
    }

    #[test]
    fn test_jittered_delay_stays_in_bounds() {
        let policy = DelayPolicy::Jittered {
            min: Duration::from_millis(1500),
            max: Duration::from_millis(2500),
        };
        for _ in 0..100 {
            let d = policy.next_delay();
            assert!(d >= Duration::from_millis(1500) && d <= Duration::from_millis(2500));
        }
    }

    #[test]
    fn test_jittered_with_inverted_bounds_uses_min() {
        let policy = DelayPolicy::Jittered {
            min: Duration::from_secs(2),
            max: Duration::from_secs(1),
        };
        assert_eq!(policy.next_delay(), Duration::from_secs(2));
    }

    #[test]
    fn test_default_policies_match_constants() {
        let fixed = RetryPolicy::default();
        assert_eq!(fixed.max_attempts, RETRY_MAX_ATTEMPTS);
        assert_eq!(fixed.delay, DelayPolicy::Fixed(RETRY_FIXED_DELAY));
        assert!(fixed.pacing.is_none());

        let paced = RetryPolicy::paced_default().with_delay(Duration::from_secs(1));
        assert_eq!(paced.delay, DelayPolicy::Fixed(Duration::from_secs(1)));
        assert!(paced.pacing.is_some());
    }
}
