use std::future::Future;
use std::time::Duration;

use crate::shared::error::{AppError, Result};

/// リトライ設定。固定間隔で再試行する（指数バックオフではない）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay_ms: u64) -> Self {
        Self {
            attempts,
            delay: Duration::from_millis(delay_ms),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, 1000)
    }
}

/// Invokes `operation` up to `policy.attempts` times, sleeping
/// `policy.delay` between attempts. Returns the first success, or the
/// failure from the last attempt once all attempts are exhausted.
///
/// No classification happens here: every failure is retried, including
/// ones that can never succeed on retry (e.g. permission denials).
/// Callers that want transient-only retries must classify first.
pub async fn with_retry<T, F, Fut>(policy: RetryPolicy, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = policy.attempts.max(1);
    let mut last_error = None;

    for attempt in 1..=attempts {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                tracing::debug!("attempt {attempt}/{attempts} failed: {err}");
                last_error = Some(err);
                if attempt < attempts {
                    tokio::time::sleep(policy.delay).await;
                }
            }
        }
    }

    Err(last_error
        .unwrap_or_else(|| AppError::Internal("retry finished without an attempt".to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn quick_policy(attempts: u32) -> RetryPolicy {
        RetryPolicy::new(attempts, 5)
    }

    #[tokio::test]
    async fn test_succeeds_without_retry() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result = with_retry(quick_policy(3), move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(42u32)
            }
        })
        .await
        .unwrap();

        assert_eq!(result, 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_succeeds_on_final_attempt_and_stops() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result = with_retry(quick_policy(3), move || {
            let counter = counter.clone();
            async move {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 3 {
                    Err(AppError::unavailable(format!("failure {n}")))
                } else {
                    Ok("recovered")
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(result, "recovered");
        // Exactly N invocations, none after the success.
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhaustion_returns_last_failure() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<()> = with_retry(quick_policy(4), move || {
            let counter = counter.clone();
            async move {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                Err(AppError::Internal(format!("failure {n}")))
            }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        match result {
            Err(AppError::Internal(message)) => assert_eq!(message, "failure 4"),
            other => panic!("expected last failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_retries_permission_failures_unconditionally() {
        // Deliberate tradeoff: no classification inside the executor.
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<()> = with_retry(quick_policy(2), move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(AppError::permission_denied("never succeeds"))
            }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_zero_attempts_clamped_to_one() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let _ = with_retry::<(), _, _>(quick_policy(0), move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(AppError::Internal("nope".to_string()))
            }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
