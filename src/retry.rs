// Retry wrapper for async operations
// Bounded attempts with exponential backoff; the wait is non-blocking so other
// tasks keep running between attempts

use std::future::Future;
use std::time::Duration;

use tracing::warn;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    // Total number of attempts, not extra retries; clamped to at least 1
    pub attempts: u32,
    // Delay before the second attempt; doubles after every further failure
    pub base_delay: Duration,
    pub max_delay: Duration,
    // 0.0 keeps the exact exponential schedule
    pub jitter_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_secs(30),
            jitter_factor: 0.0,
        }
    }
}

impl RetryPolicy {
    // Delay applied after attempt `attempt` (1-based) fails
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(31);
        let base_ms = (self.base_delay.as_millis() as f64 * 2f64.powi(exp as i32))
            .min(self.max_delay.as_millis() as f64);

        let jitter_ms = if self.jitter_factor > 0.0 {
            rand::random::<f64>() * self.jitter_factor * base_ms
        } else {
            0.0
        };

        Duration::from_millis((base_ms + jitter_ms) as u64)
    }
}

// What to return once every attempt has failed
pub enum Fallback<T, E> {
    Value(T),
    Derive(Box<dyn FnOnce(E) -> T + Send>),
}

pub struct RetryOptions<T, E> {
    pub policy: RetryPolicy,
    pub context: &'static str,
    // Observation hook, invoked once per failed attempt; must not alter retry flow
    pub on_error: Option<Box<dyn FnMut(&E, u32) + Send>>,
    pub fallback: Option<Fallback<T, E>>,
}

impl<T, E> RetryOptions<T, E> {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            context: "operation",
            on_error: None,
            fallback: None,
        }
    }

    pub fn context(mut self, context: &'static str) -> Self {
        self.context = context;
        self
    }

    pub fn on_error(mut self, hook: impl FnMut(&E, u32) + Send + 'static) -> Self {
        self.on_error = Some(Box::new(hook));
        self
    }

    pub fn fallback_value(mut self, value: T) -> Self {
        self.fallback = Some(Fallback::Value(value));
        self
    }

    pub fn fallback_with(mut self, derive: impl FnOnce(E) -> T + Send + 'static) -> Self {
        self.fallback = Some(Fallback::Derive(Box::new(derive)));
        self
    }
}

impl<T, E> Default for RetryOptions<T, E> {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}

// Run `operation` up to the policy's attempt count. On exhaustion the final
// error is returned as-is unless a fallback was configured.
pub async fn with_retry<T, E, F, Fut>(
    mut operation: F,
    mut options: RetryOptions<T, E>,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let attempts = options.policy.attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;

        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                warn!(
                    "{} failed (attempt {}/{}): {}",
                    options.context, attempt, attempts, error
                );

                if let Some(hook) = options.on_error.as_mut() {
                    hook(&error, attempt);
                }

                if attempt < attempts {
                    tokio::time::sleep(options.policy.backoff(attempt)).await;
                    continue;
                }

                return match options.fallback.take() {
                    Some(Fallback::Value(value)) => {
                        warn!(
                            "{} failed after {} attempts, using fallback",
                            options.context, attempts
                        );
                        Ok(value)
                    }
                    Some(Fallback::Derive(derive)) => {
                        warn!(
                            "{} failed after {} attempts, using fallback",
                            options.context, attempts
                        );
                        Ok(derive(error))
                    }
                    None => Err(error),
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Instant;

    fn quick_policy(attempts: u32, base_ms: u64) -> RetryPolicy {
        RetryPolicy {
            attempts,
            base_delay: Duration::from_millis(base_ms),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_succeeds_on_third_attempt_after_backoff() {
        let calls = Arc::new(AtomicU32::new(0));
        let seen_attempts = Arc::new(Mutex::new(Vec::new()));

        let calls_op = calls.clone();
        let seen = seen_attempts.clone();

        let start = Instant::now();
        let result = with_retry(
            move || {
                let calls = calls_op.clone();
                async move {
                    if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(anyhow!("transient"))
                    } else {
                        Ok("done")
                    }
                }
            },
            RetryOptions::new(quick_policy(3, 100))
                .context("flaky operation")
                .on_error(move |_, attempt| seen.lock().push(attempt)),
        )
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(
            *seen_attempts.lock(),
            vec![1, 2],
            "hook fires once per failed attempt"
        );
        // 100ms after the first failure plus 200ms after the second
        assert!(
            start.elapsed() >= Duration::from_millis(300),
            "expected at least 300ms of backoff, got {:?}",
            start.elapsed()
        );
    }

    #[tokio::test]
    async fn test_first_success_returns_immediately() {
        let start = Instant::now();
        let result: Result<u32, anyhow::Error> = with_retry(
            || async { Ok(7) },
            RetryOptions::new(quick_policy(3, 200)),
        )
        .await;

        assert_eq!(result.unwrap(), 7);
        assert!(start.elapsed() < Duration::from_millis(100), "no backoff on success");
    }

    #[tokio::test]
    async fn test_fallback_value_on_exhaustion() {
        let result = with_retry(
            || async { Err::<&str, _>(anyhow!("always down")) },
            RetryOptions::new(quick_policy(2, 1)).fallback_value("X"),
        )
        .await;

        assert_eq!(result.unwrap(), "X");
    }

    #[tokio::test]
    async fn test_fallback_closure_receives_final_error() {
        let result = with_retry(
            || async { Err::<String, _>(anyhow!("service unavailable")) },
            RetryOptions::new(quick_policy(2, 1))
                .fallback_with(|error| format!("fell back after: {}", error)),
        )
        .await;

        assert_eq!(result.unwrap(), "fell back after: service unavailable");
    }

    #[tokio::test]
    async fn test_last_error_propagates_unchanged() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_op = calls.clone();

        let result = with_retry(
            move || {
                let n = calls_op.fetch_add(1, Ordering::SeqCst) + 1;
                async move { Err::<(), _>(anyhow!("failure #{}", n)) }
            },
            RetryOptions::new(quick_policy(3, 1)),
        )
        .await;

        let error = result.unwrap_err();
        assert_eq!(error.to_string(), "failure #3", "the final attempt's error surfaces");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_zero_attempts_still_runs_once() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_op = calls.clone();

        let result: Result<(), anyhow::Error> = with_retry(
            move || {
                calls_op.fetch_add(1, Ordering::SeqCst);
                async { Err(anyhow!("nope")) }
            },
            RetryOptions::new(quick_policy(0, 1)),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            attempts: 5,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(250),
            jitter_factor: 0.0,
        };

        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_millis(200));
        assert_eq!(policy.backoff(3), Duration::from_millis(250), "capped at max_delay");
        assert_eq!(policy.backoff(4), Duration::from_millis(250));
    }

    #[test]
    fn test_backoff_jitter_stays_in_range() {
        let policy = RetryPolicy {
            attempts: 3,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(30),
            jitter_factor: 0.5,
        };

        for _ in 0..50 {
            let delay = policy.backoff(1);
            assert!(delay >= Duration::from_millis(100));
            assert!(delay <= Duration::from_millis(150));
        }
    }
}
