//! Fixed-delay retry for transport failures
//!
//! The legacy portal sheds load by dropping connections, not by answering
//! with error statuses, so every transport-level failure is treated as
//! transient: the operation is simply retried after a fixed delay until the
//! attempt budget runs out. The policy is injected as a value object so
//! callers and tests can supply their own budgets and delays.

use crate::config::RetryPolicy;
use std::future::Future;

/// Execute an async operation under a fixed-delay retry policy
///
/// Every error is considered retryable. The operation is attempted up to
/// `policy.max_attempts` times in total, sleeping `policy.delay` between
/// attempts; a budget of zero or one makes a single attempt. On exhaustion
/// the last error is returned.
pub async fn with_retry<F, Fut, T, E>(policy: &RetryPolicy, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt: u32 = 1;
    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::debug!(attempts = attempt, "operation succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) if attempt < policy.max_attempts => {
                tracing::warn!(
                    error = %e,
                    attempt,
                    max_attempts = policy.max_attempts,
                    delay_ms = policy.delay.as_millis() as u64,
                    "transport failure, retrying"
                );
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
            Err(e) => {
                tracing::error!(error = %e, attempts = attempt, "retry budget exhausted");
                return Err(e);
            }
        }
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn zero_delay(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            delay: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn success_on_first_attempt_calls_once() {
        let policy = RetryPolicy::default();
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = with_retry(&policy, || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, std::io::Error>(42)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(counter.load(Ordering::SeqCst), 1, "should only call once");
    }

    #[tokio::test]
    async fn four_failures_then_success_on_fifth_returns_the_payload() {
        let policy = RetryPolicy {
            max_attempts: 5,
            delay: Duration::from_millis(10),
        };
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let start = std::time::Instant::now();
        let result = with_retry(&policy, || {
            let counter = counter_clone.clone();
            async move {
                let calls = counter.fetch_add(1, Ordering::SeqCst);
                if calls < 4 {
                    Err(std::io::Error::other("connection reset"))
                } else {
                    Ok("payload")
                }
            }
        })
        .await;
        let elapsed = start.elapsed();

        assert_eq!(result.unwrap(), "payload");
        assert_eq!(counter.load(Ordering::SeqCst), 5, "4 failures + 1 success");
        // Four sleeps of 10ms happened between the five attempts
        assert!(
            elapsed >= Duration::from_millis(40),
            "should have slept between each failed attempt, elapsed {elapsed:?}"
        );
    }

    #[tokio::test]
    async fn exhausted_budget_returns_the_last_error() {
        let policy = zero_delay(3);
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result: Result<(), _> = with_retry(&policy, || {
            let counter = counter_clone.clone();
            async move {
                let calls = counter.fetch_add(1, Ordering::SeqCst);
                Err(std::io::Error::other(format!("failure #{}", calls + 1)))
            }
        })
        .await;

        assert_eq!(counter.load(Ordering::SeqCst), 3, "budget is total attempts");
        assert_eq!(result.unwrap_err().to_string(), "failure #3");
    }

    #[tokio::test]
    async fn zero_budget_still_makes_a_single_attempt() {
        let policy = zero_delay(0);
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result: Result<(), _> = with_retry(&policy, || {
            let counter = counter_clone.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(std::io::Error::other("boom"))
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn delay_is_fixed_not_growing() {
        let policy = RetryPolicy {
            max_attempts: 4,
            delay: Duration::from_millis(20),
        };
        let timestamps = Arc::new(tokio::sync::Mutex::new(Vec::new()));
        let ts_clone = timestamps.clone();

        let _result: Result<(), _> = with_retry(&policy, || {
            let ts = ts_clone.clone();
            async move {
                ts.lock().await.push(std::time::Instant::now());
                Err(std::io::Error::other("down"))
            }
        })
        .await;

        let ts = timestamps.lock().await;
        assert_eq!(ts.len(), 4);
        for window in ts.windows(2) {
            let gap = window[1].duration_since(window[0]);
            assert!(
                gap >= Duration::from_millis(15) && gap < Duration::from_millis(500),
                "every gap should be ~20ms (fixed delay), was {gap:?}"
            );
        }
    }
}
