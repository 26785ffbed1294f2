use std::future::Future;
use std::time::Duration;

use crate::shared::error::{AppError, Result};

/// Races `operation` against a deadline in milliseconds. The operation's
/// outcome wins if it settles first (its own failure passes through
/// unchanged); the deadline elapsing yields `AppError::Timeout` with the
/// caller-supplied message. The underlying timer is dropped on both
/// paths, so nothing fires afterwards.
pub async fn with_timeout<T, Fut>(
    deadline_ms: u64,
    message: Option<&str>,
    operation: Fut,
) -> Result<T>
where
    Fut: Future<Output = Result<T>>,
{
    match tokio::time::timeout(Duration::from_millis(deadline_ms), operation).await {
        Ok(outcome) => outcome,
        Err(_) => Err(AppError::Timeout(
            message.unwrap_or("operation timed out").to_string(),
        )),
    }
}
